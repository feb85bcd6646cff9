//! Generated outreach emails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    Initial,
    FollowUp,
}

impl std::fmt::Display for EmailKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailKind::Initial => write!(f, "cold email"),
            EmailKind::FollowUp => write!(f, "follow-up"),
        }
    }
}

/// Text produced by the generation service for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedEmail {
    pub body: String,
    pub kind: EmailKind,
    pub produced_at: DateTime<Utc>,
}

impl GeneratedEmail {
    pub fn new(body: impl Into<String>, kind: EmailKind) -> Self {
        Self {
            body: body.into(),
            kind,
            produced_at: Utc::now(),
        }
    }
}
