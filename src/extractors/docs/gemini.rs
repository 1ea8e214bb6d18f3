//! Gemini-backed implementation of the text-processing collaborator.
//! Requests go to the `generateContent` REST endpoint; the document rides
//! as an inline part, the schema instruction as a second text part.

use super::{DocumentPayload, TextNormalizer};
use crate::config::GeminiConfig;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiNormalizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiNormalizer {
    pub fn new(api_key: String, config: &GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
        })
    }

    fn document_part(document: &DocumentPayload) -> serde_json::Value {
        if document.is_base64 {
            json!({
                "inline_data": {
                    "mime_type": "text/markdown",
                    "data": document.content,
                }
            })
        } else {
            json!({ "text": document.content })
        }
    }
}

#[async_trait]
impl TextNormalizer for GeminiNormalizer {
    #[instrument(skip(self, document, schema_spec), fields(document = %document.name))]
    async fn normalize(&self, document: &DocumentPayload, schema_spec: &str) -> Result<String> {
        let url = format!(
            "{GEMINI_API_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [
                        Self::document_part(document),
                        { "text": schema_spec },
                    ],
                }
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Normalizer(format!("Gemini API call failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PipelineError::Normalizer(format!(
                "Gemini API returned {status}: {detail}"
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PipelineError::Normalizer(format!("Failed to parse Gemini response: {e}")))?;

        let parts = response_json["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| {
                PipelineError::Normalizer("No content parts in Gemini response".to_string())
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect();
        if text.is_empty() {
            return Err(PipelineError::Normalizer(
                "Empty text in Gemini response".to_string(),
            ));
        }

        debug!("Received {} characters from Gemini", text.len());
        Ok(text)
    }
}
