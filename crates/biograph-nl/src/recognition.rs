//! Entity sampling, recognition orchestration, and query annotation.
//!
//! Three stateless passes over short lists:
//! - [`sample_dcids_by_type`] bounds a span's candidate identifiers while
//!   preserving type diversity,
//! - [`recognize_entities_from_query`] turns a raw query into resolved
//!   [`GraphEntity`] values via the two remote collaborators,
//! - [`annotate_query_with_types`] rewrites the query with bracketed type
//!   hints for each recognized name.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::services::{EntityRecognizer, RecognitionError, TypeFetcher, TYPE_OF};
use crate::{GraphEntity, TypeRecord};

/// Type labels for one identifier: the `name` field of each fetched
/// record, in fetch order. Absent identifiers yield an empty list.
fn type_labels(records: Option<&Vec<TypeRecord>>) -> Vec<String> {
    records
        .map(|rs| rs.iter().map(|r| r.name.clone()).collect())
        .unwrap_or_default()
}

/// Sample a span's candidate identifiers by type diversity.
///
/// Resolves all `dcids` with a single batched `typeOf` fetch, then walks
/// them in input order. The first pass keeps every identifier that
/// contributes at least one type label not seen so far; the rest are
/// skipped. Skipped identifiers are then appended, in their original
/// relative order and reusing the already-fetched type data, only while
/// the total stays below `sample_size`.
///
/// So the kept prefix always covers every distinct type label observed
/// in the input, even when that exceeds `sample_size`, while skipped
/// identifiers only ride along when there is room left under the cap.
pub fn sample_dcids_by_type(
    fetcher: &dyn TypeFetcher,
    name: &str,
    dcids: &[String],
    sample_size: usize,
) -> Result<Vec<GraphEntity>, RecognitionError> {
    let records = fetcher.raw_property_values(dcids, TYPE_OF)?;

    let mut seen_labels: HashSet<String> = HashSet::new();
    let mut sampled = Vec::new();
    let mut skipped = Vec::new();

    for dcid in dcids {
        let types = type_labels(records.get(dcid));
        if types.iter().any(|label| !seen_labels.contains(label)) {
            seen_labels.extend(types.iter().cloned());
            sampled.push(GraphEntity::new(name, dcid, types));
        } else {
            skipped.push((dcid, types));
        }
    }

    for (dcid, types) in skipped {
        if sampled.len() >= sample_size {
            break;
        }
        sampled.push(GraphEntity::new(name, dcid, types));
    }

    debug!(
        name,
        candidates = dcids.len(),
        sampled = sampled.len(),
        "sampled dcids by type"
    );
    Ok(sampled)
}

/// Recognize entity spans in `query` and resolve every candidate
/// identifier to a typed [`GraphEntity`].
///
/// The recognizer is called exactly once with the full query. Candidate
/// identifiers are grouped by distinct span text (duplicate span texts
/// merge into the first occurrence's group), and each group gets one
/// batched `typeOf` fetch. The result flattens groups in span order with
/// identifiers in recognizer order; nothing is deduplicated across spans.
pub fn recognize_entities_from_query(
    recognizer: &dyn EntityRecognizer,
    fetcher: &dyn TypeFetcher,
    query: &str,
) -> Result<Vec<GraphEntity>, RecognitionError> {
    let spans = recognizer.recognize_entities(query)?;

    let mut span_order: Vec<String> = Vec::new();
    let mut dcids_by_span: HashMap<String, Vec<String>> = HashMap::new();
    for group in spans {
        let dcids = dcids_by_span.entry(group.span.clone()).or_insert_with(|| {
            span_order.push(group.span.clone());
            Vec::new()
        });
        dcids.extend(group.entities.into_iter().map(|e| e.dcid));
    }

    let mut entities = Vec::new();
    for span in &span_order {
        let dcids = &dcids_by_span[span];
        let records = fetcher.raw_property_values(dcids, TYPE_OF)?;
        for dcid in dcids {
            entities.push(GraphEntity::new(span, dcid, type_labels(records.get(dcid))));
        }
    }

    debug!(
        query,
        spans = span_order.len(),
        entities = entities.len(),
        "recognized entities from query"
    );
    Ok(entities)
}

/// Rewrite `query` with a bracketed type hint for each entity name.
///
/// Pairs are applied in order; every verbatim occurrence of a name is
/// replaced with `[name (typeOf: label1, label2)]`. A name that does not
/// occur in the query is silently skipped. The input is not mutated.
pub fn annotate_query_with_types(query: &str, entities_to_types: &[(String, Vec<String>)]) -> String {
    let mut annotated = query.to_string();
    for (name, types) in entities_to_types {
        let replacement = format!("[{} (typeOf: {})]", name, types.join(", "));
        annotated = annotated.replace(name.as_str(), &replacement);
    }
    annotated
}

/// Group resolved entities into the ordered `(name, types)` pairs that
/// [`annotate_query_with_types`] takes.
///
/// Names keep first-appearance order; a name's labels concatenate its
/// entities' type lists in entity order, deduplicated on first
/// occurrence.
pub fn types_by_entity_name(entities: &[GraphEntity]) -> Vec<(String, Vec<String>)> {
    let mut order: Vec<String> = Vec::new();
    let mut types_by_name: HashMap<String, Vec<String>> = HashMap::new();

    for entity in entities {
        let types = types_by_name.entry(entity.name.clone()).or_insert_with(|| {
            order.push(entity.name.clone());
            Vec::new()
        });
        for label in &entity.types {
            if !types.contains(label) {
                types.push(label.clone());
            }
        }
    }

    order
        .into_iter()
        .map(|name| {
            let types = types_by_name.remove(&name).unwrap_or_default();
            (name, types)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        raw.iter()
            .map(|(name, types)| {
                (
                    name.to_string(),
                    types.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn annotate_rewrites_every_mapped_name() {
        let query = "query containing entity1 and second entity";
        let mapping = pairs(&[
            ("entity1", &["TypeA", "TypeB"]),
            ("second entity", &["TypeB", "TypeC"]),
        ]);

        assert_eq!(
            annotate_query_with_types(query, &mapping),
            "query containing [entity1 (typeOf: TypeA, TypeB)] and \
             [second entity (typeOf: TypeB, TypeC)]"
        );
    }

    #[test]
    fn annotate_with_empty_mapping_is_identity() {
        let query = "query containing entity1 and second entity";
        assert_eq!(annotate_query_with_types(query, &[]), query);
    }

    #[test]
    fn annotate_skips_names_absent_from_query() {
        let query = "no entities here";
        let mapping = pairs(&[("entity1", &["TypeA"])]);
        assert_eq!(annotate_query_with_types(query, &mapping), query);
    }

    #[test]
    fn annotate_replaces_repeated_occurrences() {
        let query = "entity1 links to entity1";
        let mapping = pairs(&[("entity1", &["TypeA"])]);
        assert_eq!(
            annotate_query_with_types(query, &mapping),
            "[entity1 (typeOf: TypeA)] links to [entity1 (typeOf: TypeA)]"
        );
    }

    #[test]
    fn types_by_entity_name_groups_in_first_appearance_order() {
        let entities = vec![
            GraphEntity::new("second entity", "dc/2", vec!["TypeB".into()]),
            GraphEntity::new("entity1", "dc/1", vec!["TypeA".into(), "TypeB".into()]),
            GraphEntity::new(
                "second entity",
                "dc/3",
                vec!["TypeB".into(), "TypeC".into()],
            ),
        ];

        assert_eq!(
            types_by_entity_name(&entities),
            pairs(&[
                ("second entity", &["TypeB", "TypeC"]),
                ("entity1", &["TypeA", "TypeB"]),
            ])
        );
    }

    #[test]
    fn types_by_entity_name_on_empty_input_is_empty() {
        assert!(types_by_entity_name(&[]).is_empty());
    }
}
