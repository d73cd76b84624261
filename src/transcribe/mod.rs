use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::StageCache;
use crate::fetch::MediaHandle;
use crate::openai::OpenAiClient;
use crate::{PipelineError, Result};

/// Second pipeline stage: media file in, transcript out.
///
/// One blocking call to the speech-to-text endpoint per distinct file. There is
/// no retry here; an error or an empty result is reported as
/// [`PipelineError::TranscriptionService`].
pub struct Transcriber {
    client: OpenAiClient,
    model: String,
    show_progress: bool,
    cache: StageCache<PathBuf, String>,
}

impl Transcriber {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            show_progress: false,
            cache: StageCache::new("transcribe"),
        }
    }

    /// Show a spinner while the remote call runs
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub async fn transcribe(&self, media: &MediaHandle) -> Result<String> {
        self.cache
            .get_or_compute(media.path.clone(), || self.transcribe_uncached(media))
            .await
    }

    async fn transcribe_uncached(&self, media: &MediaHandle) -> Result<String> {
        tracing::info!("Transcribing {}", media.path.display());

        let progress = self.spinner("Transcribing the video...");
        let result = self.client.transcribe_file(&self.model, &media.path).await;
        progress.finish_and_clear();

        let text = result.map_err(|e| PipelineError::TranscriptionService(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(PipelineError::TranscriptionService(
                "service returned an empty transcript".to_string(),
            ));
        }

        tracing::info!(chars = text.len(), "Transcription complete");
        Ok(text)
    }

    fn spinner(&self, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.set_message(message);
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}
