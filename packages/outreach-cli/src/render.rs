//! Terminal rendering for records, contexts and emails.

use colored::Colorize;
use outreach::{ContextSummary, GeneratedEmail, ProspectRecord, RecordReport, SiteContext};

use crate::context::AppContext;

/// Longest cell shown in the preview table.
const PREVIEW_CELL_WIDTH: usize = 28;

pub fn print_banner() {
    println!("{}", "╔════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║        B2B Outreach Email Drafter      ║".bright_cyan());
    println!("{}", "╚════════════════════════════════════════╝".bright_cyan());
}

pub fn print_company_header(index: usize, total: usize, record: &ProspectRecord) {
    println!();
    println!(
        "{} {}",
        format!("[{}/{}]", index + 1, total).dimmed(),
        format!("🏢 {}", record.company_name).bold().bright_white()
    );
    println!(
        "   {} <{}>  {}",
        record.head_name,
        record.head_email,
        record.website.dimmed()
    );
}

pub fn print_context(ctx: &AppContext, context: &SiteContext) {
    match context {
        SiteContext::Available(summary) => {
            println!("   🌐 {}", summary.title.green());
            println!("   {}", truncate(&summary.description, 100).dimmed());
        }
        SiteContext::Unavailable(err) => {
            ctx.print_warning(&format!("No website data: {err}"));
        }
    }
}

pub fn print_summary_detail(summary: &ContextSummary) {
    println!("{}", "Website data".bold());
    println!("  {} {}", "Title:".bold(), summary.title);
    println!("  {} {}", "Description:".bold(), summary.description);
    println!("  {}", "Content excerpt:".bold());
    println!("{}", indent(&summary.excerpt, 4));
}

pub fn print_email(label: &str, email: &GeneratedEmail) {
    println!();
    println!("{}", format!("── {label} ").bold().bright_blue());
    println!("{}", indent(&email.body, 2));
    println!();
}

pub fn print_preview(records: &[ProspectRecord]) {
    println!(
        "{}",
        format!(
            "  {:<4} {:<w$} {:<w$} {:<w$}",
            "#",
            "company_name",
            "head_name",
            "website",
            w = PREVIEW_CELL_WIDTH
        )
        .bold()
    );
    for (idx, record) in records.iter().enumerate() {
        println!(
            "  {:<4} {:<w$} {:<w$} {:<w$}",
            idx + 1,
            truncate(&record.company_name, PREVIEW_CELL_WIDTH),
            truncate(&record.head_name, PREVIEW_CELL_WIDTH),
            truncate(&record.website, PREVIEW_CELL_WIDTH),
            w = PREVIEW_CELL_WIDTH
        );
    }
}

/// One line per stage of a batch report.
pub fn print_report(ctx: &AppContext, report: &RecordReport) {
    print_context(ctx, &report.context);

    match &report.cold_email {
        Ok(email) => print_email("Cold email", email),
        Err(err) => ctx.print_failure("Cold email not generated", err),
    }

    match &report.follow_up {
        Some(Ok(email)) => print_email("Follow-up", email),
        Some(Err(err)) => ctx.print_failure("Follow-up not generated", err),
        None => {}
    }

    match &report.export {
        Some(Ok(path)) => ctx.print_success(&format!("Exported to {}", path.display())),
        Some(Err(err)) => ctx.print_failure("Export failed", err),
        None => {}
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
