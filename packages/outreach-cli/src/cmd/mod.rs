pub mod check;
pub mod run;
pub mod sample;

use std::path::Path;

use anyhow::{Context, Result};
use outreach::{LoadError, ProspectRecord, REQUIRED_COLUMNS};

use crate::context::AppContext;

/// Load records, explaining column problems before failing.
pub fn load(ctx: &AppContext, path: &Path) -> Result<Vec<ProspectRecord>> {
    match outreach::load_records(path) {
        Ok(records) => Ok(records),
        Err(LoadError::MissingColumns { missing }) => {
            ctx.print_error("Missing required columns");
            ctx.print_error(&format!("   missing:  {}", missing.join(", ")));
            ctx.print_error(&format!("   expected: {}", REQUIRED_COLUMNS.join(", ")));
            Err(LoadError::MissingColumns { missing })
                .with_context(|| format!("Cannot process {}", path.display()))
        }
        Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
    }
}
