//! Write a small sample prospect file.

use std::path::Path;

use anyhow::{Context, Result};

use crate::context::AppContext;

const SAMPLE_ROWS: [[&str; 5]; 5] = [
    [
        "TechCorp Solutions",
        "Michael Chen",
        "michael.chen@techcorp.com",
        "https://techcorp.com",
        "https://linkedin.com/in/michaelchen",
    ],
    [
        "Innovate Labs",
        "Sarah Patel",
        "sarah.patel@innovatelabs.com",
        "https://innovatelabs.com",
        "https://linkedin.com/in/sarahpatel",
    ],
    [
        "Global Systems Inc",
        "David Wilson",
        "david.wilson@globalsystems.com",
        "https://globalsystems.com",
        "https://linkedin.com/in/davidwilson",
    ],
    [
        "Future Tech",
        "Emily Brown",
        "emily.brown@futuretech.com",
        "https://futuretech.com",
        "https://linkedin.com/in/emilybrown",
    ],
    [
        "Smart Solutions",
        "Raj Kumar",
        "raj.kumar@smartsolutions.com",
        "https://smartsolutions.com",
        "https://linkedin.com/in/rajkumar",
    ],
];

pub fn run(ctx: &AppContext, path: &Path, force: bool) -> Result<()> {
    if path.exists()
        && !force
        && !ctx.confirm(&format!("{} exists. Overwrite?", path.display()), false)?
    {
        ctx.print_warning("Skipped; existing file left untouched");
        return Ok(());
    }

    write_sample(path)?;
    ctx.print_success(&format!(
        "Wrote {} sample prospects to {}",
        SAMPLE_ROWS.len(),
        path.display()
    ));
    Ok(())
}

fn write_sample(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(outreach::REQUIRED_COLUMNS)?;
    for row in SAMPLE_ROWS {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
