//! Generation client seam.
//!
//! The core only needs two operations from the text-generation service.
//! Failures of any kind surface as [`GenerationError`]; there is no retry
//! here.

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient};
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::prompts::{COLD_EMAIL_SYSTEM, FOLLOW_UP_SYSTEM};

pub const DEFAULT_MODEL: &str = "gpt-4";

/// Completion budget for the initial email.
pub const COLD_EMAIL_MAX_TOKENS: u32 = 300;

/// Completion budget for follow-ups.
pub const FOLLOW_UP_MAX_TOKENS: u32 = 200;

/// Text generation for outreach emails.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an initial outreach email from a composed prompt.
    async fn cold_email(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Generate a follow-up email from a composed prompt.
    async fn follow_up(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// [`Generator`] backed by the OpenAI chat completions API.
pub struct OpenAIGenerator {
    client: OpenAIClient,
    model: String,
}

impl OpenAIGenerator {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest::new(&self.model)
            .message(Message::system(system))
            .message(Message::user(prompt))
            .max_tokens(max_tokens);

        let response = self.client.chat_completion(request).await.map_err(|e| {
            warn!(model = %self.model, error = %e, "Generation request failed");
            GenerationError::from(e)
        })?;

        if response.finish_reason.as_deref() == Some("length") {
            debug!(model = %self.model, max_tokens, "Completion hit the token limit");
        }

        response
            .content
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::Empty)
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    async fn cold_email(&self, prompt: &str) -> Result<String, GenerationError> {
        self.complete(COLD_EMAIL_SYSTEM, prompt, COLD_EMAIL_MAX_TOKENS)
            .await
    }

    async fn follow_up(&self, prompt: &str) -> Result<String, GenerationError> {
        self.complete(FOLLOW_UP_SYSTEM, prompt, FOLLOW_UP_MAX_TOKENS)
            .await
    }
}
