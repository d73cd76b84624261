use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::cache::StageCache;
use crate::openai::{ChatMessage, CompletionRequest, OpenAiClient};
use crate::{PipelineError, Result};

/// Tokens requested per requested word by the interactive front-end
pub const TOKENS_PER_WORD: u32 = 4;

/// How a word-count target becomes a generation token budget.
///
/// The interactive and batch front-ends have always differed here and both
/// behaviors are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetPolicy {
    /// `TOKENS_PER_WORD` tokens per word
    Scaled,
    /// One token per word
    Literal,
}

impl BudgetPolicy {
    pub fn token_budget(self, words: u32) -> u32 {
        match self {
            BudgetPolicy::Scaled => words.saturating_mul(TOKENS_PER_WORD),
            BudgetPolicy::Literal => words,
        }
    }
}

/// Third pipeline stage: transcript in, shorter text out
pub struct Summarizer {
    client: OpenAiClient,
    model: String,
    temperature: f32,
    show_progress: bool,
    cache: StageCache<(String, u32, u32), String>,
}

/// Prompt sent to the generation endpoint
pub fn summary_prompt(text: &str, words: u32) -> String {
    format!("Please summarize the following text in about {} words: {}", words, text)
}

impl Summarizer {
    pub fn new(client: OpenAiClient, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
            show_progress: false,
            cache: StageCache::new("summarize"),
        }
    }

    /// Show a spinner while the remote call runs
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Summarize `text` in about `words` words with the budget `policy` derives
    pub async fn summarize(&self, text: &str, words: u32, policy: BudgetPolicy) -> Result<String> {
        let max_tokens = policy.token_budget(words);
        self.cache
            .get_or_compute((text.to_string(), words, max_tokens), || {
                self.summarize_uncached(text, words, max_tokens)
            })
            .await
    }

    async fn summarize_uncached(&self, text: &str, words: u32, max_tokens: u32) -> Result<String> {
        tracing::info!(words, max_tokens, "Summarizing transcript");

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(summary_prompt(text, words))],
            max_tokens,
            n: 1,
            temperature: self.temperature,
        };

        let progress = self.spinner();
        let result = self.client.complete(&request).await;
        progress.finish_and_clear();

        let summary = result.map_err(|e| PipelineError::SummarizationService(e.to_string()))?;
        Ok(summary.trim().to_string())
    }

    fn spinner(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.set_message("Summarizing the transcription...");
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}
