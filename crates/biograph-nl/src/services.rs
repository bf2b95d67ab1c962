//! Collaborator interfaces for the remote recognition and graph-fetch services.
//!
//! Both services are external; this crate only fixes their call/return
//! contracts. Implementations are injected into the operations in
//! [`crate::recognition`], so tests substitute deterministic fakes
//! without any patching machinery. The REST-backed implementation lives
//! in [`crate::api`] behind the `api-client` feature.

use std::collections::HashMap;

use crate::{RecognizedSpan, TypeRecord};

/// Relation used to resolve an identifier to its type nodes.
pub const TYPE_OF: &str = "typeOf";

/// Errors surfaced by the remote collaborators.
///
/// The operations in this crate never handle these; they propagate
/// unchanged to the caller.
#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Batched property-value lookup against the knowledge graph.
pub trait TypeFetcher {
    /// Fetch the out-arc values of `relation` for every identifier in
    /// `dcids`, in one call.
    ///
    /// The returned map may cover any subset of the requested
    /// identifiers; absent identifiers mean "no values", not an error.
    fn raw_property_values(
        &self,
        dcids: &[String],
        relation: &str,
    ) -> Result<HashMap<String, Vec<TypeRecord>>, RecognitionError>;
}

/// Span-level entity recognition over free text.
pub trait EntityRecognizer {
    /// Recognize entity spans in `query`, returning span groups in
    /// recognizer order with per-span candidate identifiers in
    /// recognizer order.
    fn recognize_entities(&self, query: &str) -> Result<Vec<RecognizedSpan>, RecognitionError>;
}
