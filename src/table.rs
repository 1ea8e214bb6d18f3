use crate::constants::CANONICAL_COLUMNS;
use crate::error::Result;
use crate::schema::{CanonicalRecord, UnListing, UN_COLUMNS};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// UTF-8 byte-order mark. Output files lead with it so spreadsheet tools
/// round-trip East Asian and Vietnamese text correctly.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// A table of canonical records plus the origin name it was produced under.
/// The origin is what consolidation keys provenance decisions on.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    pub origin: String,
    pub records: Vec<CanonicalRecord>,
}

/// A UN intermediate table, remapped to canonical form only when the
/// consolidation engine ingests it.
#[derive(Debug, Clone, Default)]
pub struct UnTable {
    pub origin: String,
    pub listings: Vec<UnListing>,
}

/// Tagged source table: each extractor emits its own shape and a single
/// explicit mapping converts it during consolidation.
#[derive(Debug, Clone)]
pub enum SourceTable {
    Canonical(RecordTable),
    Un(UnTable),
}

impl SourceTable {
    pub fn origin(&self) -> &str {
        match self {
            SourceTable::Canonical(table) => &table.origin,
            SourceTable::Un(table) => &table.origin,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SourceTable::Canonical(table) => table.records.len(),
            SourceTable::Un(table) => table.listings.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Provenance category of a source table, by origin name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCategory {
    Document,
    Ofac,
    Un,
    Other,
}

impl SourceCategory {
    pub fn classify(origin: &str) -> Self {
        let lower = origin.to_lowercase();
        if lower.contains("sanctions_from_") {
            SourceCategory::Document
        } else if lower.contains("ofac") {
            SourceCategory::Ofac
        } else if lower.contains("un") {
            SourceCategory::Un
        } else {
            SourceCategory::Other
        }
    }
}

/// Result of parsing delegated-extraction output into canonical records.
#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub records: Vec<CanonicalRecord>,
    /// False when the header row's column count differs from the canonical
    /// schema; rows are still returned best-effort.
    pub header_valid: bool,
}

/// Parses tabular CSV text whose header should be the canonical 17 columns.
/// A header-count mismatch is reported, not fatal.
pub fn parse_canonical_table(text: &str, origin: &str) -> Result<ParsedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let header_len = reader.headers()?.len();
    let header_valid = header_len == CANONICAL_COLUMNS.len();
    if !header_valid {
        warn!(
            "Table {} header has {} columns, expected {}",
            origin,
            header_len,
            CANONICAL_COLUMNS.len()
        );
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping malformed row in {}: {}", origin, e);
                continue;
            }
        };
        let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
        let record = CanonicalRecord::from_row(&cells);
        if !record.name.trim().is_empty() {
            records.push(record);
        }
    }

    Ok(ParsedTable {
        records,
        header_valid,
    })
}

/// Writes a canonical table as UTF-8-with-BOM CSV.
pub fn write_canonical_csv(path: &Path, records: &[CanonicalRecord]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(CANONICAL_COLUMNS)?;
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a UN intermediate table as UTF-8-with-BOM CSV.
pub fn write_un_csv(path: &Path, listings: &[UnListing]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(UN_COLUMNS)?;
    for listing in listings {
        writer.write_record(listing.to_row())?;
    }
    writer.flush()?;
    Ok(())
}
