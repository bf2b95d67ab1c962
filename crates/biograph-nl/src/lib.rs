//! Biograph NL: knowledge-graph entity recognition for natural-language queries
//!
//! Thin glue between two remote collaborators and a caller building an
//! annotated prompt:
//!
//! ```text
//! query ──► EntityRecognizer ──► spans + candidate dcids
//!                 │
//!                 ▼
//!          TypeFetcher ("typeOf") ──► type labels per dcid
//!                 │
//!                 ▼
//!   GraphEntity list ──► annotate_query_with_types ──► "q [name (typeOf: ...)] ..."
//! ```
//!
//! The collaborators are plain traits (see [`services`]) so tests inject
//! deterministic fakes and production wires in the REST client behind the
//! `api-client` feature. All operations are synchronous single-pass
//! transformations; remote failures propagate unchanged to the caller.

pub mod recognition;
pub mod services;

#[cfg(feature = "api-client")]
pub mod api;

use serde::{Deserialize, Serialize};

pub use recognition::{
    annotate_query_with_types, recognize_entities_from_query, sample_dcids_by_type,
    types_by_entity_name,
};
pub use services::{EntityRecognizer, RecognitionError, TypeFetcher, TYPE_OF};

// ============================================================================
// Core Types
// ============================================================================

/// A knowledge-graph entity resolved from a query span.
///
/// Equality is structural and order-sensitive on `types`: two entities
/// with the same name and dcid but differently ordered type labels are
/// distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEntity {
    /// Display name (the query span the entity was recognized from).
    pub name: String,
    /// Opaque knowledge-graph identifier.
    pub dcid: String,
    /// Type labels in the order the graph returned them.
    pub types: Vec<String>,
}

impl GraphEntity {
    pub fn new(name: impl Into<String>, dcid: impl Into<String>, types: Vec<String>) -> Self {
        Self {
            name: name.into(),
            dcid: dcid.into(),
            types,
        }
    }
}

/// A node record returned by the type fetcher for the `typeOf` relation.
///
/// The record's `name` is the type label consumed by the sampler; `dcid`
/// and `types` are carried through for callers that need the full node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRecord {
    pub dcid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// One candidate identifier inside a recognized span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEntity {
    pub dcid: String,
}

/// A contiguous query substring together with its candidate identifiers,
/// in recognizer output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedSpan {
    pub span: String,
    #[serde(default)]
    pub entities: Vec<SpanEntity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_entity_equality_is_order_sensitive_on_types() {
        let a = GraphEntity::new("e", "dc/1", vec!["TypeA".into(), "TypeB".into()]);
        let b = GraphEntity::new("e", "dc/1", vec!["TypeB".into(), "TypeA".into()]);
        let c = GraphEntity::new("e", "dc/1", vec!["TypeA".into(), "TypeB".into()]);

        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn recognized_span_deserializes_without_entities() {
        let span: RecognizedSpan = serde_json::from_str(r#"{"span": "entity1"}"#).unwrap();
        assert_eq!(span.span, "entity1");
        assert!(span.entities.is_empty());
    }
}
