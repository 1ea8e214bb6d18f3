//! Consolidation engine: the single point where source tables meet. Merges
//! any number of tagged tables, resolves Watchlist provenance, normalizes
//! date display forms, deduplicates by name and emits one canonical table
//! plus a structured summary.

use crate::dates;
use crate::error::{PipelineError, Result};
use crate::schema::{map_un_listing, CanonicalRecord};
use crate::table::{SourceCategory, SourceTable};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{info, instrument};

/// Per-category record counts, tallied before deduplication.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SourceBreakdown {
    pub document_records: usize,
    pub ofac_records: usize,
    pub un_records: usize,
    pub other_records: usize,
}

/// First-class deliverable alongside the table itself; downstream consumers
/// read it to assess extraction quality.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationSummary {
    pub total_records: usize,
    pub duplicate_removed: usize,
    pub breakdown: SourceBreakdown,
    pub watchlist_distribution: BTreeMap<String, usize>,
    pub type_distribution: BTreeMap<String, usize>,
}

#[derive(Debug)]
pub struct Consolidation {
    pub records: Vec<CanonicalRecord>,
    pub summary: ConsolidationSummary,
}

static EU_CODE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}/\d+").unwrap());
static DOCUMENT_ORIGIN_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sanctions_from_(\d+)_").unwrap());

/// Merges source tables into one canonical table.
#[instrument(skip(tables))]
pub fn consolidate(tables: &[SourceTable]) -> Result<Consolidation> {
    let usable: Vec<&SourceTable> = tables.iter().filter(|table| !table.is_empty()).collect();
    if usable.is_empty() {
        return Err(PipelineError::NoUsableInput);
    }

    // Step 1: concatenate row-wise in table order, remapping UN
    // intermediates down to canonical form as they are ingested.
    let mut breakdown = SourceBreakdown::default();
    let mut rows: Vec<CanonicalRecord> = Vec::new();
    for table in &usable {
        let category = SourceCategory::classify(table.origin());
        match category {
            SourceCategory::Document => breakdown.document_records += table.len(),
            SourceCategory::Ofac => breakdown.ofac_records += table.len(),
            SourceCategory::Un => breakdown.un_records += table.len(),
            SourceCategory::Other => breakdown.other_records += table.len(),
        }
        match table {
            SourceTable::Canonical(table) => {
                for record in &table.records {
                    let mut record = record.clone();
                    record.watchlist = resolve_watchlist(&record.watchlist, &table.origin);
                    rows.push(record);
                }
            }
            SourceTable::Un(table) => {
                // map_un_listing already forces UN provenance.
                rows.extend(table.listings.iter().map(map_un_listing));
            }
        }
    }
    info!("Merged {} rows from {} tables", rows.len(), usable.len());

    // Canonicalize remaining free-form Watchlist text and rewrite DOB
    // display dates.
    for record in &mut rows {
        record.watchlist = canonicalize_watchlist(&record.watchlist);
        record.dob_dj = dates::to_display_date(&record.dob_dj);
    }

    // Step 5: deduplicate by name, first occurrence wins.
    let before = rows.len();
    let mut seen: HashSet<String> = HashSet::new();
    rows.retain(|record| seen.insert(record.name.clone()));
    let duplicate_removed = before - rows.len();
    if duplicate_removed > 0 {
        info!("Removed {} duplicate records", duplicate_removed);
    }

    // Step 6: final ascending sort by name.
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    let mut watchlist_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut type_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for record in &rows {
        *watchlist_distribution
            .entry(record.watchlist.clone())
            .or_default() += 1;
        *type_distribution
            .entry(record.entity_type.to_string())
            .or_default() += 1;
    }

    let summary = ConsolidationSummary {
        total_records: rows.len(),
        duplicate_removed,
        breakdown,
        watchlist_distribution,
        type_distribution,
    };

    Ok(Consolidation {
        records: rows,
        summary,
    })
}

/// Step 2: per-row Watchlist precedence. UN provenance is resolved earlier
/// during UN-table remapping; this handles rows from canonical tables.
fn resolve_watchlist(current: &str, origin: &str) -> String {
    let trimmed = current.trim();
    let lower = trimmed.to_lowercase();
    if lower.contains("ofac") || lower.contains("specially designated") {
        return "OFAC".to_string();
    }
    // "None" is the document extractor's missing-value sentinel, "nan" a
    // spreadsheet artifact; neither counts as a real Watchlist value.
    if !trimmed.is_empty() && !["nan", "none", "unknown"].contains(&lower.as_str()) {
        return trimmed.to_string();
    }
    if let Some(caps) = DOCUMENT_ORIGIN_CODE.captures(origin) {
        return derive_eu_code(&caps[1]);
    }
    "Unknown".to_string()
}

/// Derives an EU regulation code from the numeric code embedded in a
/// document-derived origin name, e.g. `202501578` → `2025/1578`. Codes that
/// are too short, or whose remainder strips to nothing, fall back to `EU`.
pub fn derive_eu_code(code: &str) -> String {
    if code.len() >= 8 && code.chars().all(|c| c.is_ascii_digit()) {
        let year = &code[..4];
        let number = code[4..].trim_start_matches('0');
        if !number.is_empty() {
            return format!("{year}/{number}");
        }
    }
    "EU".to_string()
}

/// Second normalization pass: canonicalizes free-form Watchlist text by
/// keyword. Canonical values are fixed points, so running this twice is the
/// same as once. The `Unknown` placeholder is checked first; the `un`
/// keyword would otherwise swallow it.
pub fn canonicalize_watchlist(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") {
        return "Unknown".to_string();
    }

    let lower = trimmed.to_lowercase();
    if ["un", "united nations", "security council"]
        .iter()
        .any(|keyword| lower.contains(keyword))
    {
        return "UN".to_string();
    }
    if ["ofac", "specially designated", "treasury"]
        .iter()
        .any(|keyword| lower.contains(keyword))
    {
        return "OFAC".to_string();
    }
    if EU_CODE_SHAPE.is_match(trimmed) {
        return trimmed.to_string();
    }
    if lower.contains("eu") {
        return "EU".to_string();
    }
    trimmed.to_string()
}
