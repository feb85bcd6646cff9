//! Configuration loaded from environment variables, with CLI overrides.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use openai_client::OpenAIClient;
use outreach::{OpenAIGenerator, DEFAULT_EXPORT_DIR, DEFAULT_MODEL};

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Flags that take precedence over the environment.
#[derive(Debug, Default, Args)]
pub struct ConfigOverrides {
    /// Model used for generation [env: OUTREACH_MODEL]
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Directory for export files [env: OUTREACH_EXPORT_DIR]
    #[arg(long, global = true)]
    pub export_dir: Option<PathBuf>,

    /// Seconds before a website fetch is abandoned [env: FETCH_TIMEOUT_SECS]
    #[arg(long, global = true)]
    pub fetch_timeout: Option<u64>,

    /// Website fetches in flight at once [env: FETCH_CONCURRENCY]
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub model: String,
    pub export_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_base_url: non_empty("OPENAI_BASE_URL"),
            model: non_empty("OUTREACH_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            export_dir: non_empty("OUTREACH_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR)),
            fetch_timeout: Duration::from_secs(
                non_empty("FETCH_TIMEOUT_SECS")
                    .map(|v| v.trim().parse())
                    .transpose()
                    .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
            ),
            concurrency: non_empty("FETCH_CONCURRENCY")
                .map(|v| v.trim().parse())
                .transpose()
                .context("FETCH_CONCURRENCY must be a positive number")?
                .unwrap_or(1),
        })
    }

    pub fn apply(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(model) = &overrides.model {
            self.model = model.clone();
        }
        if let Some(dir) = &overrides.export_dir {
            self.export_dir = dir.clone();
        }
        if let Some(secs) = overrides.fetch_timeout {
            self.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(concurrency) = overrides.concurrency {
            self.concurrency = concurrency;
        }
        self.concurrency = self.concurrency.max(1);
        self
    }

    /// Generation client for the configured model.
    pub fn generator(&self) -> Result<OpenAIGenerator> {
        let api_key = self
            .openai_api_key
            .as_deref()
            .context("OPENAI_API_KEY must be set to generate emails")?;

        let mut client = OpenAIClient::new(api_key).with_timeout(GENERATION_TIMEOUT);
        if let Some(url) = &self.openai_base_url {
            client = client.with_base_url(url);
        }
        Ok(OpenAIGenerator::new(client, &self.model))
    }
}
