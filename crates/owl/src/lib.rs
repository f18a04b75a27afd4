//! OWL functional-syntax boundary support.
//!
//! This crate is responsible for reading the RxNorm OWL export as text and turning it into
//! [`rxnorm_types::EntityRecord`]s, plus rewriting axiom expressions so that external
//! references become namespace-derived identifiers.
//!
//! The export is not parsed as a full OWL document. Each `# Class: ` section is treated as an
//! independent block and read with fixed textual patterns:
//! - [`blocks`] splits the document into class blocks.
//! - [`attributes`] extracts annotations into an `EntityRecord`.
//! - [`axiom`] recovers the balanced `EquivalentClasses(...)` span.
//! - [`rewrite`] replaces known references inside an axiom with `:[uuid]` tokens.
//!
//! Nothing here performs I/O; callers supply the document text.

pub mod attributes;
pub mod axiom;
pub mod blocks;
pub mod rewrite;

pub use attributes::AttributeExtractor;
pub use axiom::{extract_axiom, EQUIVALENT_CLASSES_KEYWORD};
pub use blocks::{split_blocks, CLASS_MARKER};
pub use rewrite::AxiomRewriter;

use thiserror::Error;

/// Errors returned by the `owl` boundary crate.
#[derive(Debug, Error)]
pub enum OwlError {
    #[error("class block has no <subject-uri>")]
    MissingSubjectUri,

    #[error("EquivalentClasses at byte {start} is unbalanced ({open} unclosed parentheses)")]
    UnbalancedAxiom { start: usize, open: usize },

    #[error("identifier derivation failed: {0}")]
    Identifier(#[from] rxnorm_uuid::UuidError),
}

pub type OwlResult<T> = Result<T, OwlError>;
