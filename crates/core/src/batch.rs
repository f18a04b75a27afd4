//! Batch processing of one OWL document.
//!
//! [`BatchProcessor`] drives the pipeline once per document: split into class blocks, extract
//! attributes, extract and rewrite the axiom, derive the concept identifier, then plan the
//! loader statements. Blocks are independent. A failure in one block is recorded as that
//! block's [`BlockOutcome`] and never affects another block.

use crate::config::CoreConfig;
use crate::constants::{AUTHOR_NAME, MODULE_NAME};
use crate::plan::{FieldOutcome, Planner, Stamp, StatementPlan};
use crate::timestamp::DocumentTimestamp;
use crate::{CoreResult, LoaderError};
use chrono::{DateTime, Utc};
use owl::{extract_axiom, split_blocks, AttributeExtractor, AxiomRewriter, OwlError};
use rxnorm_types::EntityRecord;
use rxnorm_uuid::{Namespace, Uuid};
use serde::Serialize;

/// Receives processed entities, typically to write them to a graph datastore.
pub trait EntityLoader {
    fn load(&mut self, entity: &ProcessedEntity) -> Result<(), LoaderError>;
}

impl<F> EntityLoader for F
where
    F: FnMut(&ProcessedEntity) -> Result<(), LoaderError>,
{
    fn load(&mut self, entity: &ProcessedEntity) -> Result<(), LoaderError> {
        self(entity)
    }
}

/// A block that produced a usable record.
#[derive(Clone, Debug, Serialize)]
pub struct ProcessedEntity {
    /// Zero-based position of the block in the document.
    pub index: usize,
    pub record: EntityRecord,
    /// `generate(namespace, external_id)`.
    pub concept: Uuid,
    /// Empty when the block has no axiom or it could not be extracted or rewritten.
    pub rewritten_axiom: String,
    pub plan: StatementPlan,
    pub fields: Vec<FieldOutcome>,
}

impl ProcessedEntity {
    pub fn warnings(&self) -> impl Iterator<Item = &FieldOutcome> {
        self.fields.iter().filter(|f| !f.is_planned())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    MissingSubjectUri,
    /// The subject is not under the RxNorm base URI.
    MissingExternalId,
    Identifier(String),
    LoaderFailed(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedBlock {
    pub index: usize,
    pub source_uri: Option<String>,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Clone, Debug)]
pub enum BlockOutcome {
    Processed(Box<ProcessedEntity>),
    Skipped(SkippedBlock),
}

/// Everything produced for one document.
#[derive(Clone, Debug, Serialize)]
pub struct BatchReport {
    pub document_time: DateTime<Utc>,
    pub entities: Vec<ProcessedEntity>,
    pub skipped: Vec<SkippedBlock>,
}

impl BatchReport {
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn warning_count(&self) -> usize {
        self.entities.iter().map(|e| e.warnings().count()).sum()
    }
}

/// Counts and skips for one document, without the entities themselves.
#[derive(Clone, Debug, Serialize)]
pub struct BatchSummary {
    pub document_time: DateTime<Utc>,
    pub entity_count: usize,
    pub warning_count: usize,
    pub skipped: Vec<SkippedBlock>,
}

impl BatchSummary {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Processes OWL documents under one namespace.
///
/// Construction compiles the extraction patterns once; reuse a processor across documents.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    namespace: Namespace,
    extractor: AttributeExtractor,
    rewriter: AxiomRewriter,
    author: Uuid,
    module: Uuid,
}

impl BatchProcessor {
    pub fn new(config: &CoreConfig) -> CoreResult<Self> {
        let namespace = *config.namespace();
        Ok(Self {
            namespace,
            extractor: AttributeExtractor::new(),
            rewriter: AxiomRewriter::with_prefixes(
                namespace,
                config.reference_prefixes().iter().cloned(),
            ),
            author: namespace.generate(AUTHOR_NAME)?,
            module: namespace.generate(MODULE_NAME)?,
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn rewriter(&self) -> &AxiomRewriter {
        &self.rewriter
    }

    /// Processes every block of `document`, lazily and in source order.
    pub fn blocks<'a>(
        &'a self,
        document: &'a str,
        timestamp: &DocumentTimestamp,
    ) -> impl Iterator<Item = BlockOutcome> + 'a {
        let timestamp = *timestamp;
        split_blocks(document)
            .into_iter()
            .enumerate()
            .map(move |(index, block)| self.process_block(index, block, &timestamp))
    }

    /// Processes one class block.
    pub fn process_block(
        &self,
        index: usize,
        block: &str,
        timestamp: &DocumentTimestamp,
    ) -> BlockOutcome {
        let mut record = match self.extractor.extract(block) {
            Ok(record) => record,
            Err(_) => {
                return skip(index, None, SkipReason::MissingSubjectUri);
            }
        };

        if !record.has_external_id() {
            return skip(
                index,
                Some(record.source_uri().to_string()),
                SkipReason::MissingExternalId,
            );
        }

        let concept = match self.namespace.generate(record.external_id()) {
            Ok(concept) => concept,
            Err(err) => {
                return skip(
                    index,
                    Some(record.source_uri().to_string()),
                    SkipReason::Identifier(err.to_string()),
                );
            }
        };

        let mut fields = Vec::new();
        let rewritten = match extract_axiom(block) {
            Ok(Some(raw)) => {
                record.set_axiom_expression_once(raw);
                match self.rewriter.rewrite(raw) {
                    Ok(rewritten) => Some(rewritten),
                    Err(err) => {
                        fields.push(axiom_skipped(err));
                        None
                    }
                }
            }
            Ok(None) => None,
            Err(err) => {
                fields.push(axiom_skipped(err));
                None
            }
        };

        let planner = Planner {
            namespace: &self.namespace,
            rewriter: &self.rewriter,
            stamp: Stamp {
                author: self.author,
                module: self.module,
                time: timestamp.instant(),
            },
            month: timestamp.month(),
        };
        let (plan, planned) = planner.plan(&record, concept, rewritten.as_deref());
        fields.extend(planned);

        for field in fields.iter().filter(|f| !f.is_planned()) {
            tracing::warn!(
                source_uri = record.source_uri(),
                outcome = ?field,
                "field not fully planned"
            );
        }
        tracing::debug!(
            index,
            external_id = record.external_id(),
            %concept,
            semantics = plan.semantic_count(),
            "processed class block"
        );

        BlockOutcome::Processed(Box::new(ProcessedEntity {
            index,
            record,
            concept,
            rewritten_axiom: rewritten.unwrap_or_default(),
            plan,
            fields,
        }))
    }

    /// Processes `document` and collects every outcome.
    pub fn process(&self, document: &str, timestamp: &DocumentTimestamp) -> BatchReport {
        let mut entities = Vec::new();
        let summary = self.run(document, timestamp, |entity| {
            entities.push(*entity);
            Ok(())
        });

        BatchReport {
            document_time: summary.document_time,
            entities,
            skipped: summary.skipped,
        }
    }

    /// Processes `document`, handing each entity to `loader` as it is produced.
    ///
    /// Entities are not retained, so memory stays flat however many classes the document
    /// holds. A loader failure is recorded as a skipped block and processing continues.
    pub fn process_into<L>(
        &self,
        document: &str,
        timestamp: &DocumentTimestamp,
        loader: &mut L,
    ) -> BatchSummary
    where
        L: EntityLoader + ?Sized,
    {
        self.run(document, timestamp, |entity| loader.load(&entity))
    }

    fn run<F>(&self, document: &str, timestamp: &DocumentTimestamp, mut accept: F) -> BatchSummary
    where
        F: FnMut(Box<ProcessedEntity>) -> Result<(), LoaderError>,
    {
        tracing::info!(
            namespace = %self.namespace,
            document_time = %timestamp.instant(),
            source = ?timestamp.source(),
            "processing RxNorm document"
        );

        let mut summary = BatchSummary {
            document_time: timestamp.instant(),
            entity_count: 0,
            warning_count: 0,
            skipped: Vec::new(),
        };

        for outcome in self.blocks(document, timestamp) {
            let entity = match outcome {
                BlockOutcome::Processed(entity) => entity,
                BlockOutcome::Skipped(skipped) => {
                    summary.skipped.push(skipped);
                    continue;
                }
            };

            let index = entity.index;
            let source_uri = entity.record.source_uri().to_string();
            let warnings = entity.warnings().count();

            match accept(entity) {
                Ok(()) => {
                    summary.entity_count += 1;
                    summary.warning_count += warnings;
                }
                Err(err) => {
                    tracing::warn!(index, source_uri = %source_uri, error = %err, "loader rejected entity");
                    summary.skipped.push(SkippedBlock {
                        index,
                        source_uri: Some(source_uri),
                        reason: SkipReason::LoaderFailed(err.to_string()),
                    });
                }
            }
        }

        tracing::info!(
            entities = summary.entity_count,
            skipped = summary.skipped_count(),
            warnings = summary.warning_count,
            "finished RxNorm document"
        );

        summary
    }
}

fn skip(index: usize, source_uri: Option<String>, reason: SkipReason) -> BlockOutcome {
    tracing::warn!(index, source_uri = ?source_uri, reason = ?reason, "skipping class block");
    BlockOutcome::Skipped(SkippedBlock {
        index,
        source_uri,
        reason,
    })
}

fn axiom_skipped(err: OwlError) -> FieldOutcome {
    FieldOutcome::Skipped {
        field: "axiom".into(),
        reason: err.to_string(),
    }
}
