//! Batch orchestration.
//!
//! Records are processed independently: context → cold email → optional
//! follow-up → optional export. Only loading can fail a whole batch; every
//! later error is kept on the record it belongs to.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::{ExportError, GenerationError};
use crate::export::ExportWriter;
use crate::extractor::ContextSource;
use crate::generation::Generator;
use crate::session::OutreachSession;
use crate::types::context::SiteContext;
use crate::types::email::GeneratedEmail;
use crate::types::record::ProspectRecord;

/// Options for [`Outreach::run_batch`].
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Generate one follow-up per record with this elapsed-days value
    pub follow_up_days: Option<NonZeroU32>,
    /// Write an export file per record
    pub export: bool,
    /// Maximum context fetches in flight at once
    pub concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            follow_up_days: None,
            export: false,
            concurrency: 1,
        }
    }
}

/// Outcome of processing one record.
#[derive(Debug)]
pub struct RecordReport {
    pub index: usize,
    pub record: ProspectRecord,
    pub context: SiteContext,
    pub cold_email: Result<GeneratedEmail, GenerationError>,
    /// `None` when no follow-up was requested
    pub follow_up: Option<Result<GeneratedEmail, GenerationError>>,
    /// `None` when no export was requested
    pub export: Option<Result<PathBuf, ExportError>>,
}

impl RecordReport {
    /// True when every requested stage succeeded.
    pub fn is_clean(&self) -> bool {
        self.context.is_available()
            && self.cold_email.is_ok()
            && self.follow_up.as_ref().map_or(true, Result::is_ok)
            && self.export.as_ref().map_or(true, Result::is_ok)
    }
}

/// Context source, generator and export writer wired together.
pub struct Outreach {
    source: Arc<dyn ContextSource>,
    generator: Arc<dyn Generator>,
    writer: ExportWriter,
}

impl Outreach {
    pub fn new(
        source: Arc<dyn ContextSource>,
        generator: Arc<dyn Generator>,
        writer: ExportWriter,
    ) -> Self {
        Self {
            source,
            generator,
            writer,
        }
    }

    pub fn writer(&self) -> &ExportWriter {
        &self.writer
    }

    /// Extract context for every record.
    ///
    /// Up to `concurrency` fetches run at once; results come back in record
    /// order regardless of completion order.
    pub async fn gather_contexts(
        &self,
        records: &[ProspectRecord],
        concurrency: usize,
    ) -> Vec<SiteContext> {
        info!(
            source = self.source.name(),
            count = records.len(),
            concurrency,
            "Gathering website context"
        );

        stream::iter(records)
            .map(|record| self.source.extract(&record.website))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// Cold email for record `index`, generated at most once per session.
    pub async fn draft(
        &self,
        session: &mut OutreachSession,
        index: usize,
        record: &ProspectRecord,
        context: &SiteContext,
    ) -> Result<GeneratedEmail, GenerationError> {
        session
            .get_or_generate(index, record, context.summary(), self.generator.as_ref())
            .await
            .cloned()
            .inspect_err(|e| {
                warn!(index, company = %record.company_name, error = %e, "Cold email not generated");
            })
    }

    /// New follow-up attempt for record `index`.
    pub async fn follow_up(
        &self,
        session: &mut OutreachSession,
        index: usize,
        record: &ProspectRecord,
        days_since: NonZeroU32,
    ) -> Result<GeneratedEmail, GenerationError> {
        session
            .generate_follow_up(index, record, days_since, self.generator.as_ref())
            .await
            .cloned()
            .inspect_err(|e| {
                warn!(index, company = %record.company_name, error = %e, "Follow-up not generated");
            })
    }

    /// Export record `index` with whatever the session holds for it.
    pub fn export(
        &self,
        session: &OutreachSession,
        index: usize,
        record: &ProspectRecord,
        context: &SiteContext,
    ) -> Result<PathBuf, ExportError> {
        let export = session.export_record(index, record, context.summary(), Utc::now());
        self.writer.write(&export).inspect_err(|e| {
            warn!(index, company = %record.company_name, error = %e, "Export failed");
        })
    }

    /// Process every record without interaction.
    pub async fn run_batch(
        &self,
        records: &[ProspectRecord],
        options: &BatchOptions,
    ) -> Vec<RecordReport> {
        let contexts = self.gather_contexts(records, options.concurrency).await;
        let mut session = OutreachSession::new();
        let mut reports = Vec::with_capacity(records.len());

        for (index, (record, context)) in records.iter().zip(contexts).enumerate() {
            let cold_email = self.draft(&mut session, index, record, &context).await;

            let follow_up = match (options.follow_up_days, &cold_email) {
                (Some(days), Ok(_)) => {
                    Some(self.follow_up(&mut session, index, record, days).await)
                }
                (Some(_), Err(_)) => Some(Err(GenerationError::MissingInitialEmail { index })),
                (None, _) => None,
            };

            let export = options
                .export
                .then(|| self.export(&session, index, record, &context));

            reports.push(RecordReport {
                index,
                record: record.clone(),
                context,
                cold_email,
                follow_up,
                export,
            });
        }

        let clean = reports.iter().filter(|r| r.is_clean()).count();
        info!(total = reports.len(), clean, "Batch finished");
        reports
    }
}
