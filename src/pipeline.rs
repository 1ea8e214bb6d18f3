use crate::config::Config;
use crate::consolidate::{self, ConsolidationSummary};
use crate::constants::{DOCUMENT_SOURCE, OFAC_SOURCE, UN_SOURCE};
use crate::error::Result;
use crate::extractors::docs::{DocumentExtractor, DocumentPayload};
use crate::extractors::ofac::OfacExtractor;
use crate::extractors::un::UnExtractor;
use crate::fetch::Fetcher;
use crate::table::{self, SourceTable};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Per-document outcome of the delegated extraction stage.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentStatus {
    pub name: String,
    pub success: bool,
    pub records: usize,
    pub header_valid: bool,
    pub error: Option<String>,
}

/// Per-source outcome of an extraction stage.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub source: String,
    pub success: bool,
    pub records: usize,
    pub skipped: usize,
    pub error: Option<String>,
}

/// Mutable state of one pipeline run, threaded explicitly through the
/// stages: the gathered tables plus every degraded outcome on the way.
#[derive(Debug)]
pub struct RunContext {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub tables: Vec<SourceTable>,
    pub source_outcomes: Vec<SourceOutcome>,
    pub document_statuses: Vec<DocumentStatus>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            tables: Vec::new(),
            source_outcomes: Vec::new(),
            document_statuses: Vec::new(),
        }
    }

    /// Timestamp used in artifact names for this run.
    pub fn timestamp(&self) -> String {
        self.started_at.format("%Y%m%d_%H%M%S").to_string()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a complete pipeline run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub summary: ConsolidationSummary,
    pub source_outcomes: Vec<SourceOutcome>,
    pub document_statuses: Vec<DocumentStatus>,
    pub output_file: String,
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the delegated extraction over a batch of document files. Each
    /// document is independent: extractions fan out and a failure on one
    /// never blocks the others.
    #[instrument(skip(self, ctx, extractor, files))]
    pub async fn run_documents(
        &self,
        ctx: &mut RunContext,
        extractor: Arc<DocumentExtractor>,
        files: &[PathBuf],
    ) {
        info!("🔄 Normalizing {} documents...", files.len());
        println!("🔄 Normalizing {} documents...", files.len());
        let timestamp = ctx.timestamp();

        let mut join_set = JoinSet::new();
        for (index, file) in files.iter().enumerate() {
            let name = file
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("document_{index}"));

            let content = match fs::read_to_string(file) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Cannot read {}: {}", file.display(), e);
                    ctx.document_statuses.push(DocumentStatus {
                        name,
                        success: false,
                        records: 0,
                        header_valid: false,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };

            let payload = DocumentPayload {
                name: name.clone(),
                content: base64::engine::general_purpose::STANDARD.encode(content),
                is_base64: true,
            };
            let extractor = Arc::clone(&extractor);
            let timestamp = timestamp.clone();
            join_set.spawn(async move {
                let result = extractor.extract(&payload, &timestamp).await;
                (index, name, result)
            });
        }

        // Join barrier: collect every document before consolidation, in
        // input order so table order stays deterministic.
        let mut completed = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(entry) => completed.push(entry),
                Err(e) => error!("Document task panicked: {}", e),
            }
        }
        completed.sort_by_key(|(index, _, _)| *index);

        for (_, name, result) in completed {
            match result {
                Ok(extraction) => {
                    let records = extraction.table.records.len();
                    println!("   ✅ {name}: {records} records");
                    ctx.document_statuses.push(DocumentStatus {
                        name,
                        success: true,
                        records,
                        header_valid: extraction.header_valid,
                        error: None,
                    });
                    ctx.tables.push(SourceTable::Canonical(extraction.table));
                }
                Err(e) => {
                    warn!("Document {} failed: {}", name, e);
                    println!("   ❌ {name}: {e}");
                    ctx.document_statuses.push(DocumentStatus {
                        name,
                        success: false,
                        records: 0,
                        header_valid: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
    }

    /// Runs the OFAC stage: fetch (unless raw XML is supplied) and extract.
    /// A failure degrades to a recorded outcome.
    #[instrument(skip(self, ctx, xml_override))]
    pub async fn run_ofac(&self, ctx: &mut RunContext, xml_override: Option<String>) {
        info!("🇺🇸 Extracting OFAC delta feed...");
        println!("🇺🇸 Extracting OFAC delta feed...");
        let outcome = match self.ofac_stage(xml_override).await {
            Ok((table, skipped)) => {
                let records = table.records.len();
                println!("   ✅ OFAC: {records} records ({skipped} skipped)");
                ctx.tables.push(SourceTable::Canonical(table));
                SourceOutcome {
                    source: OFAC_SOURCE.to_string(),
                    success: true,
                    records,
                    skipped,
                    error: None,
                }
            }
            Err(e) => {
                error!("OFAC extraction failed: {}", e);
                println!("   ❌ OFAC: {e}");
                SourceOutcome {
                    source: OFAC_SOURCE.to_string(),
                    success: false,
                    records: 0,
                    skipped: 0,
                    error: Some(e.to_string()),
                }
            }
        };
        ctx.source_outcomes.push(outcome);
    }

    async fn ofac_stage(
        &self,
        xml_override: Option<String>,
    ) -> Result<(table::RecordTable, usize)> {
        let xml = match xml_override {
            Some(xml) => xml,
            None => {
                let fetcher = Fetcher::new(&self.config.fetch)?;
                fetcher.fetch_ofac_delta().await?
            }
        };
        let extraction = OfacExtractor::new().extract(&xml)?;
        Ok((extraction.table, extraction.skipped))
    }

    /// Runs the UN stage: fetch (unless raw XML is supplied) and extract
    /// both section tables.
    #[instrument(skip(self, ctx, xml_override))]
    pub async fn run_un(&self, ctx: &mut RunContext, xml_override: Option<String>) {
        info!("🌍 Extracting UN consolidated list...");
        println!("🌍 Extracting UN consolidated list...");
        let outcome = match self.un_stage(xml_override).await {
            Ok(extraction) => {
                let records =
                    extraction.individuals.listings.len() + extraction.entities.listings.len();
                println!(
                    "   ✅ UN: {} individuals, {} entities",
                    extraction.individuals.listings.len(),
                    extraction.entities.listings.len()
                );
                ctx.tables.push(SourceTable::Un(extraction.individuals));
                ctx.tables.push(SourceTable::Un(extraction.entities));
                SourceOutcome {
                    source: UN_SOURCE.to_string(),
                    success: true,
                    records,
                    skipped: extraction.total_parties - records,
                    error: None,
                }
            }
            Err(e) => {
                error!("UN extraction failed: {}", e);
                println!("   ❌ UN: {e}");
                SourceOutcome {
                    source: UN_SOURCE.to_string(),
                    success: false,
                    records: 0,
                    skipped: 0,
                    error: Some(e.to_string()),
                }
            }
        };
        ctx.source_outcomes.push(outcome);
    }

    async fn un_stage(
        &self,
        xml_override: Option<String>,
    ) -> Result<crate::extractors::un::UnExtraction> {
        let xml = match xml_override {
            Some(xml) => xml,
            None => {
                let fetcher = Fetcher::new(&self.config.fetch)?;
                fetcher.fetch_un_consolidated().await?
            }
        };
        UnExtractor::new().extract(&xml)
    }

    /// Final stage: merge everything gathered so far and write the
    /// consolidated table plus the summary artifact. Zero usable tables is
    /// the one terminal condition of a run.
    #[instrument(skip(self, ctx))]
    pub fn consolidate_and_write(&self, ctx: &mut RunContext, output_dir: &str) -> Result<RunReport> {
        info!("🔧 Consolidating {} source tables...", ctx.tables.len());
        println!("🔧 Consolidating {} source tables...", ctx.tables.len());

        let consolidation = consolidate::consolidate(&ctx.tables)?;

        fs::create_dir_all(output_dir)?;
        let filename = format!("sanctions_cleaned_{}.csv", ctx.timestamp());
        let output_path = Path::new(output_dir).join(&filename);
        table::write_canonical_csv(&output_path, &consolidation.records)?;
        info!("💾 Saved consolidated table to {}", output_path.display());

        // Document-stage statuses fold into the outcome list so every
        // degraded item is visible in one place.
        if !ctx.document_statuses.is_empty() {
            let records: usize = ctx.document_statuses.iter().map(|s| s.records).sum();
            let failures = ctx
                .document_statuses
                .iter()
                .filter(|s| !s.success)
                .count();
            ctx.source_outcomes.push(SourceOutcome {
                source: DOCUMENT_SOURCE.to_string(),
                success: failures < ctx.document_statuses.len(),
                records,
                skipped: failures,
                error: None,
            });
        }

        let report = RunReport {
            run_id: ctx.run_id,
            summary: consolidation.summary,
            source_outcomes: ctx.source_outcomes.clone(),
            document_statuses: ctx.document_statuses.clone(),
            output_file: output_path.to_string_lossy().to_string(),
        };

        let summary_path =
            Path::new(output_dir).join(format!("sanctions_summary_{}.json", ctx.timestamp()));
        fs::write(&summary_path, serde_json::to_string_pretty(&report)?)?;
        info!("💾 Saved run summary to {}", summary_path.display());

        Ok(report)
    }
}

/// Render the run report the way the operator sees it.
pub fn print_report(report: &RunReport) {
    println!("\n📊 Consolidation results:");
    println!("   Total records: {}", report.summary.total_records);
    println!("   Duplicates removed: {}", report.summary.duplicate_removed);
    println!(
        "   From documents: {}, OFAC: {}, UN: {}, other: {}",
        report.summary.breakdown.document_records,
        report.summary.breakdown.ofac_records,
        report.summary.breakdown.un_records,
        report.summary.breakdown.other_records
    );

    println!("\n📈 Watchlist distribution:");
    for (watchlist, count) in &report.summary.watchlist_distribution {
        let share = (*count as f64 / report.summary.total_records.max(1) as f64) * 100.0;
        println!("   {watchlist}: {count} ({share:.1}%)");
    }

    println!("\n📈 Type distribution:");
    for (entity_type, count) in &report.summary.type_distribution {
        let share = (*count as f64 / report.summary.total_records.max(1) as f64) * 100.0;
        println!("   {entity_type}: {count} ({share:.1}%)");
    }

    let failed: Vec<&SourceOutcome> = report
        .source_outcomes
        .iter()
        .filter(|outcome| !outcome.success)
        .collect();
    if !failed.is_empty() {
        println!("\n⚠️  Degraded sources:");
        for outcome in failed {
            println!(
                "   - {}: {}",
                outcome.source,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    println!("\n📁 Output file: {}", report.output_file);
}
