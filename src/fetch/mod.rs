use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod direct;
pub mod local;
pub mod ytdlp;

use crate::cache::StageCache;
use crate::config::Config;
use crate::utils::with_assumed_scheme;
use crate::{PipelineError, Result};

/// A fetched media file on the local filesystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaHandle {
    /// Where the media lives
    pub path: PathBuf,

    /// Title reported by the source, if any
    pub title: Option<String>,

    /// Duration in seconds if the source reported it
    pub duration: Option<f64>,

    /// Name of the source that produced the file
    pub source: String,
}

/// Something that can materialize an identifier as a local media file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Check if this source handles the given identifier
    fn supports(&self, identifier: &str) -> bool;

    /// Get the name of this source
    fn name(&self) -> &'static str;

    /// Resolve the identifier and place the media under `dest_dir`
    async fn fetch(&self, identifier: &str, dest_dir: &Path) -> Result<MediaHandle>;
}

/// Ordered list of sources; the first one that supports an identifier wins
pub struct SourceRegistry {
    sources: Vec<Box<dyn MediaSource>>,
}

impl SourceRegistry {
    /// Create a registry with no sources
    pub fn empty() -> Self {
        Self { sources: Vec::new() }
    }

    /// Create a registry with the default sources
    pub fn from_config(config: &Config, show_progress: bool) -> Self {
        let mut registry = Self::empty();

        // Local paths are checked first so "./clip.mp4" never reaches a URL source
        registry.register(Box::new(local::LocalFileSource::new()));
        registry.register(Box::new(ytdlp::YtDlpSource::new(
            config.fetch.yt_dlp_path.clone(),
            config.fetch.preferred_extension.clone(),
        )));
        registry.register(Box::new(direct::DirectSource::new().with_progress(show_progress)));

        registry
    }

    /// Register a new source
    pub fn register(&mut self, source: Box<dyn MediaSource>) {
        self.sources.push(source);
    }

    pub fn with(mut self, source: Box<dyn MediaSource>) -> Self {
        self.register(source);
        self
    }

    /// Find a source that supports the given identifier
    pub fn find(&self, identifier: &str) -> Option<&dyn MediaSource> {
        self.resolve(identifier).map(|(source, _)| source)
    }

    /// Pick a source and the identifier to hand it.
    ///
    /// Scheme-less links like `youtu.be/abc` are offered to the sources as
    /// `https://` URLs first, so they are not mistaken for missing files.
    pub fn resolve<'a>(&self, identifier: &'a str) -> Option<(&dyn MediaSource, Cow<'a, str>)> {
        if let Some(url) = with_assumed_scheme(identifier) {
            if let Some(source) = self.first_supporting(&url) {
                return Some((source, Cow::Owned(url)));
            }
        }

        self.first_supporting(identifier).map(|source| (source, Cow::Borrowed(identifier)))
    }

    fn first_supporting(&self, identifier: &str) -> Option<&dyn MediaSource> {
        self.sources
            .iter()
            .find(|source| source.supports(identifier))
            .map(|boxed| boxed.as_ref())
    }

    /// List all registered source names
    pub fn list_sources(&self) -> Vec<&'static str> {
        self.sources.iter().map(|source| source.name()).collect()
    }
}

/// First pipeline stage: identifier in, media handle out
pub struct Fetcher {
    registry: SourceRegistry,
    download_dir: PathBuf,
    backoff: Duration,
    cache: StageCache<String, MediaHandle>,
}

impl Fetcher {
    pub fn new(registry: SourceRegistry, download_dir: PathBuf, backoff: Duration) -> Self {
        Self {
            registry,
            download_dir,
            backoff,
            cache: StageCache::new("fetch"),
        }
    }

    pub fn from_config(config: &Config, show_progress: bool) -> Self {
        Self::new(
            SourceRegistry::from_config(config, show_progress),
            config.download_dir(),
            config.retry_backoff(),
        )
    }

    /// Fetch the media for `identifier`, reusing an earlier result from this process
    pub async fn fetch(&self, identifier: &str) -> Result<MediaHandle> {
        let identifier = identifier.trim();
        self.cache
            .get_or_compute(identifier.to_string(), || self.fetch_uncached(identifier))
            .await
    }

    async fn fetch_uncached(&self, identifier: &str) -> Result<MediaHandle> {
        let (source, identifier) = self
            .registry
            .resolve(identifier)
            .ok_or_else(|| PipelineError::UnsupportedSource(identifier.to_string()))?;

        tracing::info!(
            source = source.name(),
            domain = crate::utils::extract_domain(&identifier).as_deref().unwrap_or("local"),
            "Fetching media for {}",
            identifier
        );

        fs_err::create_dir_all(&self.download_dir)?;

        match source.fetch(&identifier, &self.download_dir).await {
            Err(err) if err.is_transient() => {
                tracing::warn!("{}; retrying once in {}s", err, self.backoff.as_secs_f64());
                tokio::time::sleep(self.backoff).await;
                source.fetch(&identifier, &self.download_dir).await
            }
            result => result,
        }
    }
}
