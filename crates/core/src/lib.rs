//! # RxNorm Core
//!
//! Extraction and identity engine for the RxNorm OWL export.
//!
//! This crate drives the `owl` boundary crate over a whole document and turns each class
//! block into a [`ProcessedEntity`]: the attribute record, its concept identifier, the
//! rewritten axiom, and the [`StatementPlan`] a graph loader needs to create or merge nodes.
//!
//! **No I/O**: the caller supplies the document text and a [`DocumentTimestamp`]. File
//! discovery, archive extraction and the datastore session belong to the host.

pub mod batch;
pub mod config;
pub mod constants;
mod error;
pub mod plan;
pub mod timestamp;

pub use batch::{
    BatchProcessor, BatchReport, BatchSummary, BlockOutcome, EntityLoader, ProcessedEntity,
    SkipReason, SkippedBlock,
};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult, LoaderError};
pub use plan::{FieldOutcome, StatementPlan};
pub use timestamp::{DocumentTimestamp, TimestampSource};

pub use rxnorm_types::{EntityRecord, NonEmptyText};
pub use rxnorm_uuid::{Namespace, Uuid};
