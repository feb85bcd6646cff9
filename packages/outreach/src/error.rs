//! Typed errors for the outreach library.
//!
//! Only [`LoadError`] is fatal to a batch. Fetch, generation and export
//! errors are scoped to a single record and reported alongside it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading prospect records.
#[derive(Debug, Error)]
pub enum LoadError {
    /// One or more required columns are absent from the header row
    #[error("missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// File extension is neither CSV nor a spreadsheet
    #[error("unsupported file format: {extension:?} (expected csv, xlsx, xls, xlsm or ods)")]
    UnsupportedFormat { extension: String },

    /// Spreadsheet has no worksheet to read
    #[error("workbook contains no worksheets")]
    EmptyWorkbook,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Workbook(#[from] calamine::Error),
}

/// Errors that make a website's context unavailable.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    /// Connection, DNS, TLS, redirect-limit or body read failure
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response with nothing to parse
    #[error("{url} returned HTTP {status} with an empty body")]
    Status { url: String, status: u16 },

    #[error("{url} returned non-text content ({content_type})")]
    UnsupportedContent { url: String, content_type: String },

    #[error("could not parse {url}: {reason}")]
    Parse { url: String, reason: String },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// Errors from the text-generation step.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation service error: {0}")]
    Service(#[from] openai_client::OpenAIError),

    /// Service answered but produced no usable text
    #[error("generation service returned an empty response")]
    Empty,

    /// Follow-ups are drafted from the initial email, which must exist first
    #[error("record {index} has no cold email yet; generate it before a follow-up")]
    MissingInitialEmail { index: usize },
}

/// Errors writing an export file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Any error the outreach library can produce.
#[derive(Debug, Error)]
pub enum OutreachError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type Result<T> = std::result::Result<T, OutreachError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_every_column() {
        let err = LoadError::MissingColumns {
            missing: vec!["head_email".into(), "linkedin_url".into()],
        };
        assert_eq!(
            err.to_string(),
            "missing required columns: head_email, linkedin_url"
        );
    }

    #[test]
    fn test_umbrella_is_transparent() {
        let err: OutreachError = GenerationError::Empty.into();
        assert_eq!(
            err.to_string(),
            "generation service returned an empty response"
        );
    }
}
