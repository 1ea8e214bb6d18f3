use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

mod config;
mod consolidate;
mod constants;
mod dates;
mod error;
mod extractors;
mod fetch;
mod logging;
mod pipeline;
mod schema;
mod table;

use crate::config::Config;
use crate::extractors::docs::gemini::GeminiNormalizer;
use crate::extractors::docs::DocumentExtractor;
use crate::pipeline::{print_report, Pipeline, RunContext};
use crate::table::SourceTable;

#[derive(Parser)]
#[command(name = "sanctions_pipeline")]
#[command(about = "Multi-source sanctions watchlist extraction and consolidation")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory for output artifacts
    #[arg(long, default_value = "output", global = true)]
    output_dir: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the OFAC delta feed into a canonical table
    Ofac {
        /// Process a local delta XML file instead of fetching
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Extract recent listings from the UN consolidated list
    Un {
        /// Process a local consolidated XML file instead of fetching
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Normalize document text files via the text-processing collaborator
    Documents {
        /// Markdown files to process (comma-separated)
        #[arg(long)]
        files: String,
    },
    /// Run the full pipeline: documents, OFAC, UN, then consolidation
    Run {
        /// Markdown files to process (comma-separated)
        #[arg(long)]
        documents: Option<String>,
        /// Local OFAC delta XML instead of fetching
        #[arg(long)]
        ofac_input: Option<PathBuf>,
        /// Local UN consolidated XML instead of fetching
        #[arg(long)]
        un_input: Option<PathBuf>,
    },
}

fn parse_file_list(list: &str) -> Vec<PathBuf> {
    list.split(',')
        .map(|part| PathBuf::from(part.trim()))
        .filter(|path| !path.as_os_str().is_empty())
        .collect()
}

fn read_optional(path: Option<PathBuf>) -> Result<Option<String>, std::io::Error> {
    match path {
        Some(path) => Ok(Some(std::fs::read_to_string(path)?)),
        None => Ok(None),
    }
}

/// Builds the collaborator-backed document extractor, when an API key is
/// available.
fn document_extractor(config: &Config) -> Option<Arc<DocumentExtractor>> {
    let api_key = Config::gemini_api_key()?;
    match GeminiNormalizer::new(api_key, &config.gemini) {
        Ok(normalizer) => Some(Arc::new(DocumentExtractor::new(Box::new(normalizer)))),
        Err(e) => {
            warn!("Cannot construct Gemini client: {}", e);
            None
        }
    }
}

/// Writes every table gathered so far as its own CSV artifact.
fn write_tables(ctx: &RunContext, output_dir: &str) -> error::Result<()> {
    std::fs::create_dir_all(output_dir)?;
    for source_table in &ctx.tables {
        let path =
            std::path::Path::new(output_dir).join(format!("{}.csv", source_table.origin()));
        match source_table {
            SourceTable::Canonical(t) => table::write_canonical_csv(&path, &t.records)?,
            SourceTable::Un(t) => table::write_un_csv(&path, &t.listings)?,
        }
        println!("💾 Saved {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load_or_default();
    let pipeline = Pipeline::new(config);
    let output_dir = cli.output_dir;

    match cli.command {
        Commands::Ofac { input } => {
            let mut ctx = RunContext::new();
            let xml = read_optional(input)?;
            pipeline.run_ofac(&mut ctx, xml).await;
            write_tables(&ctx, &output_dir)?;
        }
        Commands::Un { input } => {
            let mut ctx = RunContext::new();
            let xml = read_optional(input)?;
            pipeline.run_un(&mut ctx, xml).await;
            write_tables(&ctx, &output_dir)?;
        }
        Commands::Documents { files } => {
            let Some(extractor) = document_extractor(pipeline.config()) else {
                eprintln!("❌ GEMINI_API_KEY is not set; cannot process documents");
                std::process::exit(1);
            };
            let mut ctx = RunContext::new();
            let files = parse_file_list(&files);
            pipeline.run_documents(&mut ctx, extractor, &files).await;
            write_tables(&ctx, &output_dir)?;
        }
        Commands::Run {
            documents,
            ofac_input,
            un_input,
        } => {
            println!("🚀 Starting full pipeline run...");
            let mut ctx = RunContext::new();
            info!("Pipeline run {} started", ctx.run_id);

            if let Some(documents) = documents {
                match document_extractor(pipeline.config()) {
                    Some(extractor) => {
                        let files = parse_file_list(&documents);
                        pipeline.run_documents(&mut ctx, extractor, &files).await;
                    }
                    None => {
                        warn!("GEMINI_API_KEY not set; skipping document processing");
                        println!("⚠️  GEMINI_API_KEY not set; skipping document processing");
                    }
                }
            }

            pipeline.run_ofac(&mut ctx, read_optional(ofac_input)?).await;
            pipeline.run_un(&mut ctx, read_optional(un_input)?).await;

            match pipeline.consolidate_and_write(&mut ctx, &output_dir) {
                Ok(report) => {
                    print_report(&report);
                    println!("\n🎉 Pipeline run complete");
                }
                Err(e) => {
                    eprintln!("❌ Consolidation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
