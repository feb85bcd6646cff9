//! Website context extracted for a single prospect.

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Maximum number of characters kept in [`ContextSummary::excerpt`].
pub const MAX_EXCERPT_CHARS: usize = 1500;

pub const NO_TITLE: &str = "No title found";
pub const NO_DESCRIPTION: &str = "No description found";
pub const NO_CONTENT: &str = "No main content found";

/// Bounded summary of a prospect's website.
///
/// Every field is always populated; absent data is replaced by the
/// fallback strings above rather than left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub title: String,
    pub description: String,
    #[serde(rename = "main_content")]
    pub excerpt: String,
}

impl ContextSummary {
    /// Build a summary, applying fallbacks and the excerpt bound.
    pub fn new(
        title: Option<String>,
        description: Option<String>,
        excerpt: Option<String>,
    ) -> Self {
        Self {
            title: title.unwrap_or_else(|| NO_TITLE.to_string()),
            description: description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            excerpt: excerpt
                .map(|text| truncate_chars(&text, MAX_EXCERPT_CHARS))
                .unwrap_or_else(|| NO_CONTENT.to_string()),
        }
    }
}

/// Result of extracting context for one record.
///
/// `Unavailable` carries the reason so it can be shown to the user; the
/// record is still processed from its own fields.
#[derive(Debug)]
pub enum SiteContext {
    Available(ContextSummary),
    Unavailable(FetchError),
}

impl SiteContext {
    pub fn summary(&self) -> Option<&ContextSummary> {
        match self {
            SiteContext::Available(summary) => Some(summary),
            SiteContext::Unavailable(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            SiteContext::Available(_) => None,
            SiteContext::Unavailable(err) => Some(err),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SiteContext::Available(_))
    }

    pub fn into_summary(self) -> Option<ContextSummary> {
        match self {
            SiteContext::Available(summary) => Some(summary),
            SiteContext::Unavailable(_) => None,
        }
    }
}

/// Keep at most `max` characters, never splitting a UTF-8 sequence.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_apply_to_missing_fields() {
        let summary = ContextSummary::new(None, None, None);
        assert_eq!(summary.title, NO_TITLE);
        assert_eq!(summary.description, NO_DESCRIPTION);
        assert_eq!(summary.excerpt, NO_CONTENT);
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let long = "a".repeat(MAX_EXCERPT_CHARS * 3);
        let summary = ContextSummary::new(None, None, Some(long));
        assert_eq!(summary.excerpt.chars().count(), MAX_EXCERPT_CHARS);
    }

    #[test]
    fn test_truncate_respects_multibyte_chars() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("日本語", 2), "日本");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn test_summary_serializes_excerpt_as_main_content() {
        let summary = ContextSummary::new(
            Some("Acme".into()),
            Some("Widgets".into()),
            Some("We make widgets".into()),
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["title"], "Acme");
        assert_eq!(json["description"], "Widgets");
        assert_eq!(json["main_content"], "We make widgets");
        assert!(json.get("excerpt").is_none());
    }
}
