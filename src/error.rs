use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parsing failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("CSV processing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source unavailable: {source_name}: {message}")]
    SourceUnavailable { source_name: String, message: String },

    #[error("Text normalizer error: {0}")]
    Normalizer(String),

    #[error("No usable source tables to consolidate")]
    NoUsableInput,
}

pub type Result<T> = std::result::Result<T, PipelineError>;
