//! Prospect records loaded from tabular input.

use serde::{Deserialize, Serialize};

/// Column names every input file must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "company_name",
    "head_name",
    "head_email",
    "website",
    "linkedin_url",
];

/// One row of prospect data.
///
/// Email and LinkedIn values are opaque strings; nothing here validates
/// their shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProspectRecord {
    pub company_name: String,
    pub head_name: String,
    pub head_email: String,
    pub website: String,
    pub linkedin_url: String,
}

impl ProspectRecord {
    pub fn new(
        company_name: impl Into<String>,
        head_name: impl Into<String>,
        head_email: impl Into<String>,
        website: impl Into<String>,
        linkedin_url: impl Into<String>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            head_name: head_name.into(),
            head_email: head_email.into(),
            website: website.into(),
            linkedin_url: linkedin_url.into(),
        }
    }
}
