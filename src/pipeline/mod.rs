use anyhow::{Context, Result};

use crate::config::{Config, Credentials};
use crate::fetch::{Fetcher, MediaHandle};
use crate::openai::OpenAiClient;
use crate::summarize::{BudgetPolicy, Summarizer};
use crate::transcribe::Transcriber;

/// fetch -> transcribe -> summarize, each stage memoized for the process lifetime
pub struct Pipeline {
    fetcher: Fetcher,
    transcriber: Transcriber,
    summarizer: Summarizer,
}

impl Pipeline {
    pub fn new(fetcher: Fetcher, transcriber: Transcriber, summarizer: Summarizer) -> Self {
        Self {
            fetcher,
            transcriber,
            summarizer,
        }
    }

    /// Build every stage from configuration and credentials
    pub fn from_config(
        config: &Config,
        credentials: Credentials,
        show_progress: bool,
    ) -> Result<Self> {
        let client =
            OpenAiClient::new(&config.openai, credentials).context("Failed to build HTTP client")?;

        Ok(Self::new(
            Fetcher::from_config(config, show_progress),
            Transcriber::new(client.clone(), config.openai.transcription_model.clone())
                .with_progress(show_progress),
            Summarizer::new(
                client,
                config.openai.summary_model.clone(),
                config.openai.temperature,
            )
            .with_progress(show_progress),
        ))
    }

    pub async fn fetch(&self, identifier: &str) -> crate::Result<MediaHandle> {
        self.fetcher.fetch(identifier).await
    }

    pub async fn transcribe(&self, media: &MediaHandle) -> crate::Result<String> {
        self.transcriber.transcribe(media).await
    }

    pub async fn summarize(
        &self,
        text: &str,
        words: u32,
        policy: BudgetPolicy,
    ) -> crate::Result<String> {
        self.summarizer.summarize(text, words, policy).await
    }

    /// Fetch and transcribe
    pub async fn transcript_for(&self, identifier: &str) -> crate::Result<(MediaHandle, String)> {
        let media = self.fetch(identifier).await?;
        let transcript = self.transcribe(&media).await?;
        Ok((media, transcript))
    }
}
