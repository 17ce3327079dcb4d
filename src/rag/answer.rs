//! Answer synthesis over retrieved chunks.

use super::generator::Generator;
use super::pricing::calculate_cost;
use crate::chunking::TextChunk;
use crate::config::Prompts;
use crate::error::{HarkError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Token and cost accounting for one answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// Estimated cost in USD (0.0 when the model has no known price).
    pub total_cost: f64,
}

/// A generated answer with its usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub answer_text: String,
    pub usage: Usage,
}

/// Answers questions from a handful of context chunks.
pub struct Answerer {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
}

impl Answerer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Answer `question` using only `context`.
    ///
    /// Without context there is nothing to answer from, so the generator is
    /// not called and `EmptyCorpus` is returned.
    #[instrument(skip(self, context), fields(chunks = context.len()))]
    pub async fn answer(&self, question: &str, context: &[TextChunk]) -> Result<QueryResult> {
        if context.is_empty() {
            return Err(HarkError::EmptyCorpus);
        }

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), format_context(context));

        let user_prompt = self.prompts.render_with_custom(&self.prompts.rag.user, &vars);
        let system_prompt = self.prompts.render_with_custom(&self.prompts.rag.system, &vars);

        let generation = self.generator.generate(&system_prompt, &user_prompt).await?;

        let total_cost = calculate_cost(
            &generation.model,
            generation.prompt_tokens,
            generation.completion_tokens,
        )
        .unwrap_or_else(|| {
            debug!("No pricing known for model {}", generation.model);
            0.0
        });

        Ok(QueryResult {
            answer_text: generation.text,
            usage: Usage {
                prompt_tokens: generation.prompt_tokens,
                completion_tokens: generation.completion_tokens,
                total_cost,
            },
        })
    }
}

/// Join chunk contents into a single context block.
pub fn format_context(chunks: &[TextChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
