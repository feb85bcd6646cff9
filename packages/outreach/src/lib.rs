//! Prospect outreach drafting
//!
//! Loads prospect records, extracts a bounded summary of each prospect's
//! website, composes deterministic prompts and asks a text-generation
//! service for a cold email and follow-ups. Results are exported as JSON
//! documents for workflow automation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use outreach::{
//!     load_records, BatchOptions, ExportWriter, HttpContextExtractor, OpenAIGenerator,
//!     Outreach, DEFAULT_FETCH_TIMEOUT,
//! };
//!
//! let records = load_records("prospects.csv".as_ref())?;
//! let outreach = Outreach::new(
//!     Arc::new(HttpContextExtractor::new(DEFAULT_FETCH_TIMEOUT)?),
//!     Arc::new(OpenAIGenerator::new(openai_client::OpenAIClient::from_env()?, "gpt-4")),
//!     ExportWriter::new("n8n_exports"),
//! );
//! let reports = outreach.run_batch(&records, &BatchOptions::default()).await;
//! ```
//!
//! # Modules
//!
//! - [`loader`] - CSV / spreadsheet input and column validation
//! - [`extractor`] - Website fetch and HTML summarization
//! - [`prompts`] - Pure prompt composition
//! - [`generation`] - Generation service seam and OpenAI implementation
//! - [`session`] - Memoized per-record email store
//! - [`export`] - JSON export files
//! - [`pipeline`] - Batch orchestration
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod export;
pub mod extractor;
pub mod generation;
pub mod loader;
pub mod pipeline;
pub mod prompts;
pub mod session;
pub mod testing;
pub mod types;

pub use error::{ExportError, FetchError, GenerationError, LoadError, OutreachError, Result};
pub use export::{export_file_name, sanitize_company_name, ExportWriter, DEFAULT_EXPORT_DIR};
pub use extractor::{summarize_html, ContextSource, HttpContextExtractor, DEFAULT_FETCH_TIMEOUT};
pub use generation::{Generator, OpenAIGenerator, DEFAULT_MODEL};
pub use loader::{load_csv_reader, load_records, missing_columns};
pub use pipeline::{BatchOptions, Outreach, RecordReport};
pub use prompts::{format_cold_email_prompt, format_follow_up_prompt};
pub use session::{OutreachSession, RecordEmails};
pub use types::{
    context::{ContextSummary, SiteContext, MAX_EXCERPT_CHARS},
    email::{EmailKind, GeneratedEmail},
    export::{ExportRecord, NO_COLD_EMAIL, NO_FOLLOW_UP},
    record::{ProspectRecord, REQUIRED_COLUMNS},
};

pub use testing::{MockGenerator, StaticContextSource, StubSite};
