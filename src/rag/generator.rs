//! Generative backend for answer synthesis.

use crate::config::RagSettings;
use crate::error::{HarkError, Result};
use crate::openai::backend_error;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Text produced by a generative backend, with its token accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    /// Model that actually served the request.
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Trait for text generation backends.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for a system instruction and a user prompt.
    async fn generate(&self, system: &str, user: &str) -> Result<Generation>;
}

/// OpenAI chat-completions generator.
pub struct OpenAIGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIGenerator {
    /// Create a generator from settings and a configured client.
    pub fn with_config(settings: &RagSettings, client: Client<OpenAIConfig>) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
        }
    }

    /// Override the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, system, user), fields(model = %self.model))]
    async fn generate(&self, system: &str, user: &str) -> Result<Generation> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| HarkError::InvalidInput(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| HarkError::InvalidInput(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| HarkError::InvalidInput(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| backend_error("Generation", e))?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| HarkError::BackendUnavailable("Empty response from LLM".to_string()))?;

        let (prompt_tokens, completion_tokens) = response
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        debug!(prompt_tokens, completion_tokens, "Generated answer");

        Ok(Generation {
            text,
            model: response.model,
            prompt_tokens,
            completion_tokens,
        })
    }
}
