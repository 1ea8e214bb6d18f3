//! Document-derived extractor. The hard part, turning free text into
//! structured rows, is delegated to a text-processing collaborator behind
//! the `TextNormalizer` trait; this module only formats the request and
//! validates the shape of what comes back.

pub mod gemini;
pub mod prompt;

use crate::constants::document_table_origin;
use crate::error::Result;
use crate::table::{parse_canonical_table, RecordTable};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, instrument, warn};

/// Normalized document text on its way to the collaborator.
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    /// Stem the output table is named after, e.g. `202501578`.
    pub name: String,
    pub content: String,
    /// True when `content` is base64-encoded markdown bytes.
    pub is_base64: bool,
}

/// The one operation the collaborator exposes. Implementations must not
/// retry internally; retries are the caller's concern.
#[async_trait]
pub trait TextNormalizer: Send + Sync {
    async fn normalize(&self, document: &DocumentPayload, schema_spec: &str) -> Result<String>;
}

/// Outcome of normalizing one document.
#[derive(Debug)]
pub struct DocumentExtraction {
    pub table: RecordTable,
    /// False when the returned header didn't have the canonical column
    /// count. The rows are still included, best effort.
    pub header_valid: bool,
}

pub struct DocumentExtractor {
    normalizer: Box<dyn TextNormalizer>,
}

impl DocumentExtractor {
    pub fn new(normalizer: Box<dyn TextNormalizer>) -> Self {
        Self { normalizer }
    }

    /// Sends one document through the collaborator and validates the
    /// tabular response. `timestamp` disambiguates the table origin across
    /// runs.
    #[instrument(skip(self, document), fields(document = %document.name))]
    pub async fn extract(
        &self,
        document: &DocumentPayload,
        timestamp: &str,
    ) -> Result<DocumentExtraction> {
        info!("Normalizing document {} via collaborator", document.name);
        let raw = self
            .normalizer
            .normalize(document, prompt::SCHEMA_PROMPT)
            .await?;

        let cleaned = clean_tabular_response(&raw);
        let origin = document_table_origin(&document.name, timestamp);
        let parsed = parse_canonical_table(&cleaned, &origin)?;
        if !parsed.header_valid {
            warn!(
                "Response for {} does not match the expected column layout",
                document.name
            );
        }
        info!(
            "Document {} yielded {} records",
            document.name,
            parsed.records.len()
        );

        Ok(DocumentExtraction {
            table: RecordTable {
                origin,
                records: parsed.records,
            },
            header_valid: parsed.header_valid,
        })
    }
}

static FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"```csv\s*\n?").unwrap());
static FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```\s*$").unwrap());

/// Strips markdown code-fence markers around a tabular block.
pub fn clean_tabular_response(text: &str) -> String {
    let text = FENCE_OPEN.replace_all(text, "");
    let text = FENCE_CLOSE.replace_all(&text, "");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CANONICAL_COLUMNS;
    use crate::error::PipelineError;

    struct ScriptedNormalizer {
        response: String,
    }

    #[async_trait]
    impl TextNormalizer for ScriptedNormalizer {
        async fn normalize(
            &self,
            _document: &DocumentPayload,
            _schema_spec: &str,
        ) -> Result<String> {
            Ok(self.response.clone())
        }
    }

    struct FailingNormalizer;

    #[async_trait]
    impl TextNormalizer for FailingNormalizer {
        async fn normalize(
            &self,
            _document: &DocumentPayload,
            _schema_spec: &str,
        ) -> Result<String> {
            Err(PipelineError::Normalizer("service unavailable".to_string()))
        }
    }

    fn canonical_csv() -> String {
        format!(
            "{}\nACME CO,None,Entity,None,None,None,None,Panama,123,IMO,None,None,20.7.2025,2025/1578,None,None,None\n",
            CANONICAL_COLUMNS.join(",")
        )
    }

    fn payload() -> DocumentPayload {
        DocumentPayload {
            name: "202501578".to_string(),
            content: "# Annex".to_string(),
            is_base64: false,
        }
    }

    #[test]
    fn strips_code_fences() {
        let fenced = format!("```csv\n{}```", canonical_csv());
        assert_eq!(clean_tabular_response(&fenced), canonical_csv().trim());
        // Unfenced text is untouched
        assert_eq!(
            clean_tabular_response(canonical_csv().trim()),
            canonical_csv().trim()
        );
    }

    #[tokio::test]
    async fn fenced_response_parses_into_table() {
        let extractor = DocumentExtractor::new(Box::new(ScriptedNormalizer {
            response: format!("```csv\n{}```", canonical_csv()),
        }));
        let extraction = extractor.extract(&payload(), "20250806_101500").await.unwrap();
        assert!(extraction.header_valid);
        assert_eq!(extraction.table.records.len(), 1);
        assert_eq!(
            extraction.table.origin,
            "sanctions_from_202501578_20250806_101500"
        );
        // The "None" sentinel passes through untouched.
        assert_eq!(extraction.table.records[0].date_of_birth, "None");
    }

    #[tokio::test]
    async fn header_mismatch_warns_but_returns_rows() {
        let extractor = DocumentExtractor::new(Box::new(ScriptedNormalizer {
            response: "Name,Type\nACME CO,Entity\n".to_string(),
        }));
        let extraction = extractor.extract(&payload(), "t").await.unwrap();
        assert!(!extraction.header_valid);
        assert_eq!(extraction.table.records.len(), 1);
    }

    #[tokio::test]
    async fn collaborator_failure_propagates_as_single_error() {
        let extractor = DocumentExtractor::new(Box::new(FailingNormalizer));
        let err = extractor.extract(&payload(), "t").await.unwrap_err();
        assert!(matches!(err, PipelineError::Normalizer(_)));
    }
}
