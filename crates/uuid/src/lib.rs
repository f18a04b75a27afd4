//! Deterministic identifier derivation.
//!
//! Every identity the RxNorm loader creates (concepts, description semantics, identifier
//! semantics, axiom semantics) is *re-derived* rather than stored. Re-running the pipeline
//! against the same export must therefore produce bit-identical identifiers on any host.
//!
//! This crate provides:
//! - [`Namespace`], a non-nil UUID that partitions the identifier space.
//! - [`generate`], the name-based derivation (RFC 4122 version 5: SHA-1 over the namespace
//!   bytes followed by the UTF-8 name bytes, version/variant bits fixed).
//! - [`CompositeKey`], the single canonical way to build semantic keys of the form
//!   `{concept-uuid}{value}{TAG}`.
//!
//! ## Token form
//! Identifiers are rendered in the hyphenated lowercase form, e.g.
//! `886313e1-3b8a-5372-9b90-0c9aee199e5d`. This is the form embedded in rewritten axioms and
//! in composite keys; changing it would change every downstream identity.

mod service;

pub use service::{generate, CompositeKey, Namespace, PurposeTag, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// The namespace was the nil UUID.
    #[error("namespace must not be the nil UUID")]
    NilNamespace,
    /// The name to hash was empty.
    #[error("name must not be empty")]
    EmptyName,
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
