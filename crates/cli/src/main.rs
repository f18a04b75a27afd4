use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use owl::AxiomRewriter;
use rxnorm_core::config::{extra_prefixes_from_env_value, CoreConfig};
use rxnorm_core::{BatchProcessor, DocumentTimestamp};
use rxnorm_uuid::Namespace;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rxnorm")]
#[command(about = "RxNorm OWL extraction and identity CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every class block of an OWL export and print the batch report
    Extract {
        /// OWL functional-syntax file, conventionally named with its release date
        file: PathBuf,
        /// Identifier namespace UUID
        #[arg(long)]
        namespace: Namespace,
        /// Additional reference prefixes to rewrite (comma-separated)
        #[arg(long)]
        prefixes: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: Format,
    },
    /// Derive the identifier for a name
    Uuid {
        /// Identifier namespace UUID
        #[arg(long)]
        namespace: Namespace,
        /// Name to hash, e.g. an RxCUI
        name: String,
    },
    /// Rewrite the references of an axiom expression
    Rewrite {
        /// Identifier namespace UUID
        #[arg(long)]
        namespace: Namespace,
        /// Axiom text, e.g. EquivalentClasses(...)
        axiom: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("rxnorm=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Extract {
            file,
            namespace,
            prefixes,
            format,
        }) => {
            let config = CoreConfig::new(namespace, extra_prefixes_from_env_value(prefixes))?;
            let processor = BatchProcessor::new(&config)?;

            let document = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let timestamp = DocumentTimestamp::from_file_name_or_now(&file_name);

            let report = processor.process(&document, &timestamp);
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                Format::Yaml => print!("{}", serde_yaml::to_string(&report)?),
            }
        }
        Some(Commands::Uuid { namespace, name }) => {
            println!("{}", namespace.generate(&name)?);
        }
        Some(Commands::Rewrite { namespace, axiom }) => {
            println!("{}", AxiomRewriter::new(namespace).rewrite(&axiom)?);
        }
        None => {
            println!("Use 'rxnorm --help' for commands");
        }
    }

    Ok(())
}
