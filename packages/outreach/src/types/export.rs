//! Export artifact handed to downstream workflow automation.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::context::ContextSummary;
use super::email::GeneratedEmail;
use super::record::ProspectRecord;

pub const NO_COLD_EMAIL: &str = "No email generated";
pub const NO_FOLLOW_UP: &str = "No follow-up generated";

/// A record plus whatever was generated for it, frozen at export time.
///
/// Serializes to the `company_data` / `cold_email` / `follow_up_email` /
/// `timestamp` document that workflow tools import.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRecord {
    pub record: ProspectRecord,
    pub website_data: Option<ContextSummary>,
    pub cold_email: Option<GeneratedEmail>,
    pub follow_up: Option<GeneratedEmail>,
    pub exported_at: DateTime<Utc>,
}

impl ExportRecord {
    pub fn new(record: ProspectRecord, website_data: Option<ContextSummary>) -> Self {
        Self {
            record,
            website_data,
            cold_email: None,
            follow_up: None,
            exported_at: Utc::now(),
        }
    }

    pub fn with_cold_email(mut self, email: Option<GeneratedEmail>) -> Self {
        self.cold_email = email;
        self
    }

    pub fn with_follow_up(mut self, email: Option<GeneratedEmail>) -> Self {
        self.follow_up = email;
        self
    }

    pub fn with_exported_at(mut self, at: DateTime<Utc>) -> Self {
        self.exported_at = at;
        self
    }
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    company_data: CompanyData<'a>,
    cold_email: &'a str,
    follow_up_email: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct CompanyData<'a> {
    #[serde(flatten)]
    record: &'a ProspectRecord,
    website_data: Option<&'a ContextSummary>,
}

impl Serialize for ExportRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ExportDocument {
            company_data: CompanyData {
                record: &self.record,
                website_data: self.website_data.as_ref(),
            },
            cold_email: self
                .cold_email
                .as_ref()
                .map_or(NO_COLD_EMAIL, |e| e.body.as_str()),
            follow_up_email: self
                .follow_up
                .as_ref()
                .map_or(NO_FOLLOW_UP, |e| e.body.as_str()),
            timestamp: self.exported_at.to_rfc3339(),
        }
        .serialize(serializer)
    }
}
