//! Validate an input file without contacting anything.

use std::path::Path;

use anyhow::Result;

use crate::context::AppContext;
use crate::render;

pub fn run(ctx: &AppContext, path: &Path) -> Result<()> {
    let records = super::load(ctx, path)?;

    ctx.print_header(&format!("📊 {} ({} prospects)", path.display(), records.len()));
    if !ctx.quiet {
        render::print_preview(&records);
    }
    ctx.print_success("All required columns present");
    Ok(())
}
