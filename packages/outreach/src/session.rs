//! Per-batch store of generated emails.
//!
//! The orchestrating caller owns an [`OutreachSession`] and passes it
//! explicitly; nothing here is process-wide.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::GenerationError;
use crate::generation::Generator;
use crate::prompts::{format_cold_email_prompt, format_follow_up_prompt};
use crate::types::context::ContextSummary;
use crate::types::email::{EmailKind, GeneratedEmail};
use crate::types::export::ExportRecord;
use crate::types::record::ProspectRecord;

/// Emails generated for one record.
#[derive(Debug, Clone, Default)]
pub struct RecordEmails {
    pub initial: Option<GeneratedEmail>,
    /// Follow-up attempts, oldest first
    pub follow_ups: Vec<GeneratedEmail>,
}

impl RecordEmails {
    pub fn latest_follow_up(&self) -> Option<&GeneratedEmail> {
        self.follow_ups.last()
    }
}

/// Mapping from record index to its generated emails.
#[derive(Debug, Default)]
pub struct OutreachSession {
    emails: BTreeMap<usize, RecordEmails>,
}

impl OutreachSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emails(&self, index: usize) -> Option<&RecordEmails> {
        self.emails.get(&index)
    }

    pub fn cold_email(&self, index: usize) -> Option<&GeneratedEmail> {
        self.emails.get(&index).and_then(|e| e.initial.as_ref())
    }

    pub fn latest_follow_up(&self, index: usize) -> Option<&GeneratedEmail> {
        self.emails.get(&index).and_then(RecordEmails::latest_follow_up)
    }

    /// Return the cold email for `index`, generating it on first use.
    ///
    /// Once stored, repeated calls return the same email without touching
    /// the generator. A failed generation stores nothing, so a later call
    /// tries again.
    pub async fn get_or_generate(
        &mut self,
        index: usize,
        record: &ProspectRecord,
        context: Option<&ContextSummary>,
        generator: &dyn Generator,
    ) -> Result<&GeneratedEmail, GenerationError> {
        let entry = self.emails.entry(index).or_default();

        let email = match entry.initial.take() {
            Some(existing) => {
                debug!(index, "Reusing generated cold email");
                existing
            }
            None => {
                let prompt = format_cold_email_prompt(record, context);
                let body = generator.cold_email(&prompt).await?;
                info!(index, company = %record.company_name, "Cold email generated");
                GeneratedEmail::new(body, EmailKind::Initial)
            }
        };

        Ok(&*entry.initial.insert(email))
    }

    /// Generate a new follow-up attempt from the stored cold email.
    pub async fn generate_follow_up(
        &mut self,
        index: usize,
        record: &ProspectRecord,
        days_since: NonZeroU32,
        generator: &dyn Generator,
    ) -> Result<&GeneratedEmail, GenerationError> {
        let entry = self
            .emails
            .get_mut(&index)
            .filter(|e| e.initial.is_some())
            .ok_or(GenerationError::MissingInitialEmail { index })?;

        let previous = entry
            .initial
            .as_ref()
            .map(|e| e.body.clone())
            .unwrap_or_default();

        let prompt = format_follow_up_prompt(record, &previous, days_since);
        let body = generator.follow_up(&prompt).await?;
        info!(
            index,
            company = %record.company_name,
            days_since = days_since.get(),
            attempt = entry.follow_ups.len() + 1,
            "Follow-up generated"
        );

        entry
            .follow_ups
            .push(GeneratedEmail::new(body, EmailKind::FollowUp));
        let last = entry.follow_ups.len() - 1;
        Ok(&entry.follow_ups[last])
    }

    /// Snapshot a record and its emails for export.
    pub fn export_record(
        &self,
        index: usize,
        record: &ProspectRecord,
        context: Option<&ContextSummary>,
        exported_at: DateTime<Utc>,
    ) -> ExportRecord {
        ExportRecord::new(record.clone(), context.cloned())
            .with_cold_email(self.cold_email(index).cloned())
            .with_follow_up(self.latest_follow_up(index).cloned())
            .with_exported_at(exported_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGenerator, MockGeneratorCall};

    fn record() -> ProspectRecord {
        ProspectRecord::new(
            "Acme",
            "Jo",
            "jo@acme.com",
            "https://acme.example",
            "https://linkedin.com/in/jo",
        )
    }

    fn days(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_get_or_generate_is_memoized() {
        let generator = MockGenerator::new("Hello Jo");
        let mut session = OutreachSession::new();

        let first = session
            .get_or_generate(0, &record(), None, &generator)
            .await
            .unwrap()
            .clone();
        let second = session
            .get_or_generate(0, &record(), None, &generator)
            .await
            .unwrap()
            .clone();

        assert_eq!(first, second);
        assert_eq!(first.body, "Hello Jo");
        assert_eq!(first.kind, EmailKind::Initial);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_indexes_are_independent() {
        let generator = MockGenerator::new("Hello");
        let mut session = OutreachSession::new();

        session.get_or_generate(0, &record(), None, &generator).await.unwrap();
        session.get_or_generate(1, &record(), None, &generator).await.unwrap();

        assert_eq!(generator.call_count(), 2);
        assert!(session.cold_email(2).is_none());
    }

    #[tokio::test]
    async fn test_failed_generation_is_not_memoized() {
        let mut session = OutreachSession::new();

        let err = session
            .get_or_generate(0, &record(), None, &MockGenerator::failing())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Empty));
        assert!(session.cold_email(0).is_none());

        let retry = MockGenerator::new("Second try");
        let email = session.get_or_generate(0, &record(), None, &retry).await.unwrap();
        assert_eq!(email.body, "Second try");
    }

    #[tokio::test]
    async fn test_follow_up_requires_cold_email() {
        let mut session = OutreachSession::new();
        let generator = MockGenerator::new("Hello");

        let err = session
            .generate_follow_up(4, &record(), days(7), &generator)
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::MissingInitialEmail { index: 4 }));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_follow_up_uses_cold_email_and_days() {
        let generator = MockGenerator::new("Hello Jo").with_follow_up("Just checking in");
        let mut session = OutreachSession::new();

        session.get_or_generate(0, &record(), None, &generator).await.unwrap();
        let follow_up = session
            .generate_follow_up(0, &record(), days(5), &generator)
            .await
            .unwrap();
        assert_eq!(follow_up.body, "Just checking in");
        assert_eq!(follow_up.kind, EmailKind::FollowUp);

        let calls = generator.calls();
        match &calls[1] {
            MockGeneratorCall::FollowUp { prompt } => {
                assert!(prompt.contains("Hello Jo"));
                assert!(prompt.contains("It has been 5 days"));
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_follow_up_attempts_accumulate() {
        let generator = MockGenerator::new("Hello");
        let mut session = OutreachSession::new();

        session.get_or_generate(0, &record(), None, &generator).await.unwrap();
        session.generate_follow_up(0, &record(), days(3), &generator).await.unwrap();
        session.generate_follow_up(0, &record(), days(10), &generator).await.unwrap();

        assert_eq!(session.emails(0).unwrap().follow_ups.len(), 2);
    }

    #[tokio::test]
    async fn test_export_record_snapshot() {
        let generator = MockGenerator::new("Hello Jo");
        let mut session = OutreachSession::new();
        session.get_or_generate(0, &record(), None, &generator).await.unwrap();

        let export = session.export_record(0, &record(), None, Utc::now());
        assert_eq!(export.cold_email.map(|e| e.body), Some("Hello Jo".to_string()));
        assert!(export.follow_up.is_none());
        assert!(export.website_data.is_none());
    }
}
