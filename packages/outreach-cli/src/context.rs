//! Terminal session state: quiet mode, status lines and prompts.

use std::fmt::Display;
use std::num::NonZeroU32;

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

/// Shared by every subcommand. Configuration is loaded separately, only by
/// commands that call out to websites or the generation service.
pub struct AppContext {
    pub quiet: bool,
}

impl AppContext {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    fn theme(&self) -> ColorfulTheme {
        ColorfulTheme::default()
    }

    /// Yes/no question; quiet mode takes the default.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.quiet {
            return Ok(default);
        }
        Ok(Confirm::with_theme(&self.theme())
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    /// Ask how many days passed since the previous email.
    pub fn ask_follow_up_days(&self, default: NonZeroU32) -> Result<NonZeroU32> {
        if self.quiet {
            return Ok(default);
        }
        Ok(Input::with_theme(&self.theme())
            .with_prompt("📅 Days since last email")
            .default(default)
            .interact_text()?)
    }

    /// Pick one of `labels`, returning its position.
    pub fn select(&self, prompt: &str, labels: &[&str]) -> Result<usize> {
        Ok(Select::with_theme(&self.theme())
            .with_prompt(prompt)
            .items(labels)
            .default(0)
            .interact()?)
    }

    pub fn print_header(&self, msg: &str) {
        if !self.quiet {
            println!();
            println!("{}", style(msg).bold());
        }
    }

    pub fn print_info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).cyan());
        }
    }

    pub fn print_success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(success_line(msg)).green());
        }
    }

    pub fn print_warning(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(warning_line(msg)).yellow());
        }
    }

    /// A step that failed for one prospect. Shown even in quiet mode.
    pub fn print_failure(&self, what: &str, err: &dyn Display) {
        eprintln!("{}", style(failure_line(what, err)).red());
    }

    /// Plain error text on stderr. Shown even in quiet mode.
    pub fn print_error(&self, msg: &str) {
        eprintln!("{}", style(msg).red());
    }
}

fn success_line(msg: &str) -> String {
    format!("✓ {msg}")
}

fn warning_line(msg: &str) -> String {
    format!("⚠️  {msg}")
}

fn failure_line(what: &str, err: &dyn Display) -> String {
    format!("✗ {what}: {err}")
}
