//! Structured error types for the report engine.
//!
//! Oversized content is never an error: truncation handles it silently.
//! Everything here aborts the whole generation.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum DossierError {
    /// The canvas could not measure a piece of text.
    #[error("Measurement failed: {0}")]
    Measurement(String),

    /// Writing the document bytes failed.
    #[error("Stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// Drawing was redirected to a page that was never created.
    #[error("Page {index} is out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    /// An input or configuration file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadInput {
        path: String,
        source: std::io::Error,
    },

    /// A second pass over the buffered pages added or dropped a page.
    #[error("Canvas page count changed from {before} to {after} while stamping footers")]
    PageCountChanged { before: usize, after: usize },

    /// Page geometry or theme values that cannot produce a document.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Request or configuration JSON failed to parse.
    #[error("{}", parse_message(.source, .hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },
}

fn parse_message(source: &serde_json::Error, hint: &str) -> String {
    if hint.is_empty() {
        format!("Failed to parse input: {}", source)
    } else {
        format!("Failed to parse input: {}\n  Hint: {}", source, hint)
    }
}

impl From<serde_json::Error> for DossierError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the report request schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        DossierError::Parse { source: e, hint }
    }
}
