use anyhow::Context;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rxnorm_core::config::{extra_prefixes_from_env_value, namespace_from_env_value, CoreConfig};
use rxnorm_core::constants::{EXTRA_PREFIXES_ENV, NAMESPACE_ENV, OWL_FILE_ENV};
use rxnorm_core::{BatchProcessor, DocumentTimestamp, EntityLoader, LoaderError, ProcessedEntity};

/// One JSON line per processed entity.
#[derive(Serialize)]
struct EntityLine<'a> {
    concept: String,
    external_id: &'a str,
    record: &'a rxnorm_core::EntityRecord,
    rewritten_axiom: &'a str,
    plan: &'a rxnorm_core::StatementPlan,
}

/// Writes each entity to stdout as it is produced.
struct JsonLinesLoader<W: Write> {
    out: W,
}

impl<W: Write> EntityLoader for JsonLinesLoader<W> {
    fn load(&mut self, entity: &ProcessedEntity) -> Result<(), LoaderError> {
        let line = EntityLine {
            concept: entity.concept.hyphenated().to_string(),
            external_id: entity.record.external_id(),
            record: &entity.record,
            rewritten_axiom: &entity.rewritten_axiom,
            plan: &entity.plan,
        };
        serde_json::to_writer(&mut self.out, &line).map_err(LoaderError::new)?;
        self.out.write_all(b"\n").map_err(LoaderError::new)
    }
}

/// Main entry point for the RxNorm batch runner
///
/// Reads one OWL export, processes every class block and writes one JSON line per entity to
/// stdout. Logs go to stderr so stdout stays machine-readable.
///
/// # Environment Variables
/// - `RXNORM_OWL_FILE`: path of the OWL functional-syntax export (required)
/// - `RXNORM_NAMESPACE`: identifier namespace UUID (required)
/// - `RXNORM_EXTRA_PREFIXES`: extra comma-separated reference prefixes to rewrite
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("rxnorm=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Resolve configuration once at startup.
    let namespace = namespace_from_env_value(std::env::var(NAMESPACE_ENV).ok())?;
    let extra_prefixes = extra_prefixes_from_env_value(std::env::var(EXTRA_PREFIXES_ENV).ok());
    let config = CoreConfig::new(namespace, extra_prefixes)?;

    let owl_file = std::env::var(OWL_FILE_ENV)
        .with_context(|| format!("{OWL_FILE_ENV} must be set"))?;
    let path = Path::new(&owl_file);
    let document =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let timestamp = DocumentTimestamp::from_file_name_or_now(&file_name);

    tracing::info!("++ Processing {} under namespace {}", path.display(), namespace);

    let processor = BatchProcessor::new(&config)?;
    let mut loader = JsonLinesLoader {
        out: BufWriter::new(std::io::stdout().lock()),
    };
    let summary = processor.process_into(&document, &timestamp, &mut loader);
    loader.out.flush()?;

    tracing::info!(
        "++ Done: {} entities, {} skipped, {} field warnings",
        summary.entity_count,
        summary.skipped_count(),
        summary.warning_count
    );

    Ok(())
}
