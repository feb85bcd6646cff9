//! Process a prospect file: scrape, draft, follow up, export.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use outreach::{
    BatchOptions, ExportWriter, HttpContextExtractor, Outreach, OutreachSession, ProspectRecord,
    SiteContext,
};
use tracing::info;

use crate::config::Config;
use crate::context::AppContext;
use crate::render;

const DEFAULT_FOLLOW_UP_DAYS: NonZeroU32 = NonZeroU32::MIN.saturating_add(6);

#[derive(Debug, Args)]
pub struct RunArgs {
    /// CSV or spreadsheet with prospect rows
    pub file: PathBuf,

    /// Process every record without prompting
    #[arg(long)]
    pub batch: bool,

    /// In batch mode, also draft a follow-up using this many elapsed days
    #[arg(long, requires = "batch")]
    pub follow_up_days: Option<NonZeroU32>,

    /// In batch mode, write an export file per record
    #[arg(long, requires = "batch")]
    pub export: bool,
}

/// Per-record choices in interactive mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    RetryColdEmail,
    FollowUp,
    Export,
    ViewWebsiteData,
    Next,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Action::RetryColdEmail => "🤖 Retry cold email",
            Action::FollowUp => "🔄 Generate follow-up",
            Action::Export => "📤 Export to n8n",
            Action::ViewWebsiteData => "🌐 View website data",
            Action::Next => "➡️  Next prospect",
            Action::Quit => "🛑 Quit",
        }
    }
}

pub async fn run(ctx: &AppContext, config: &Config, args: RunArgs) -> Result<()> {
    let records = super::load(ctx, &args.file)?;
    if records.is_empty() {
        ctx.print_warning("No prospects found in file");
        return Ok(());
    }

    let extractor = HttpContextExtractor::new(config.fetch_timeout)
        .context("Failed to create HTTP client")?;
    let outreach = Outreach::new(
        Arc::new(extractor),
        Arc::new(config.generator()?),
        ExportWriter::new(&config.export_dir),
    );
    outreach
        .writer()
        .ensure_dir()
        .context("Failed to create export directory")?;

    info!(
        file = %args.file.display(),
        records = records.len(),
        model = %config.model,
        batch = args.batch,
        "Processing prospects"
    );

    if args.batch {
        run_batch(ctx, config, &outreach, &records, &args).await
    } else {
        run_interactive(ctx, config, &outreach, &records).await
    }
}

async fn run_batch(
    ctx: &AppContext,
    config: &Config,
    outreach: &Outreach,
    records: &[ProspectRecord],
    args: &RunArgs,
) -> Result<()> {
    ctx.print_info(&format!("🔍 Processing {} prospects...", records.len()));

    let options = BatchOptions {
        follow_up_days: args.follow_up_days,
        export: args.export,
        concurrency: config.concurrency,
    };
    let reports = outreach.run_batch(records, &options).await;

    for report in &reports {
        render::print_company_header(report.index, reports.len(), &report.record);
        render::print_report(ctx, report);
    }

    let clean = reports.iter().filter(|r| r.is_clean()).count();
    ctx.print_header(&format!(
        "Done: {clean}/{} prospects completed without errors",
        reports.len()
    ));
    Ok(())
}

async fn run_interactive(
    ctx: &AppContext,
    config: &Config,
    outreach: &Outreach,
    records: &[ProspectRecord],
) -> Result<()> {
    ctx.print_info(&format!("🔍 Scraping {} websites...", records.len()));
    let contexts = outreach
        .gather_contexts(records, config.concurrency)
        .await;

    let mut session = OutreachSession::new();
    let total = records.len();

    for (index, (record, context)) in records.iter().zip(&contexts).enumerate() {
        render::print_company_header(index, total, record);
        render::print_context(ctx, context);

        ctx.print_info(&format!("🤖 Generating cold email for {}...", record.company_name));
        draft(ctx, outreach, &mut session, index, record, context).await;

        loop {
            match choose_action(ctx, &session, index, context)? {
                Action::RetryColdEmail => {
                    draft(ctx, outreach, &mut session, index, record, context).await;
                }
                Action::FollowUp => {
                    let days = ctx.ask_follow_up_days(DEFAULT_FOLLOW_UP_DAYS)?;
                    match outreach.follow_up(&mut session, index, record, days).await {
                        Ok(email) => render::print_email("Follow-up", &email),
                        Err(err) => ctx.print_failure("Follow-up not generated", &err),
                    }
                }
                Action::Export => export(ctx, outreach, &session, index, record, context),
                Action::ViewWebsiteData => match context.summary() {
                    Some(summary) => render::print_summary_detail(summary),
                    None => ctx.print_info("No website data scraped or an error occurred."),
                },
                Action::Next => break,
                Action::Quit => {
                    let remaining = total - index - 1;
                    if remaining == 0
                        || ctx.confirm(&format!("Skip the remaining {remaining} prospects?"), true)?
                    {
                        return Ok(());
                    }
                }
            }
        }
    }

    ctx.print_header("All prospects processed");
    Ok(())
}

async fn draft(
    ctx: &AppContext,
    outreach: &Outreach,
    session: &mut OutreachSession,
    index: usize,
    record: &ProspectRecord,
    context: &SiteContext,
) {
    match outreach.draft(session, index, record, context).await {
        Ok(email) => render::print_email("Cold email", &email),
        Err(err) => ctx.print_failure("Failed to generate cold email", &err),
    }
}

fn export(
    ctx: &AppContext,
    outreach: &Outreach,
    session: &OutreachSession,
    index: usize,
    record: &ProspectRecord,
    context: &SiteContext,
) {
    match outreach.export(session, index, record, context) {
        Ok(path) => ctx.print_success(&format!("Exported to {}", display_path(&path))),
        Err(err) => ctx.print_failure("Error exporting data", &err),
    }
}

fn choose_action(
    ctx: &AppContext,
    session: &OutreachSession,
    index: usize,
    context: &SiteContext,
) -> Result<Action> {
    let mut actions = Vec::with_capacity(6);
    if session.cold_email(index).is_some() {
        actions.push(Action::FollowUp);
    } else {
        actions.push(Action::RetryColdEmail);
    }
    actions.push(Action::Export);
    if context.is_available() {
        actions.push(Action::ViewWebsiteData);
    }
    actions.extend([Action::Next, Action::Quit]);

    let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
    let selection = ctx.select("⚡ Actions", &labels)?;

    Ok(actions[selection])
}

fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
