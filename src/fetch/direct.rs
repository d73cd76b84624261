use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use std::io::Write;
use std::path::Path;
use url::Url;

use crate::utils::{artifact_file_name, format_file_size};
use crate::{PipelineError, Result, TransientCause};

use super::{MediaHandle, MediaSource};

const MEDIA_EXTENSIONS: &[&str] = &[
    "mp3", "m4a", "wav", "flac", "ogg", "aac", "mp4", "avi", "mov", "mkv", "webm", "m4v", "mpeg",
    "mpga",
];

/// Direct URL source for audio and video files
pub struct DirectSource {
    client: Client,
    show_progress: bool,
}

impl DirectSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            show_progress: false,
        }
    }

    /// Draw a download bar on stderr
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn progress_bar(&self, total_bytes: Option<u64>) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(total_bytes.unwrap_or(0));
        progress.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
                     {bytes}/{total_bytes} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress.set_message("Downloading media...");
        progress
    }

    /// Extension of the last path segment, if it is a known media type
    fn media_extension(url: &Url) -> Option<String> {
        let filename = url.path_segments()?.last()?;
        let extension = Path::new(filename).extension()?.to_string_lossy().to_lowercase();
        MEDIA_EXTENSIONS.contains(&extension.as_str()).then_some(extension)
    }

    /// Human-readable title from the file name
    fn title_from_url(url: &Url) -> Option<String> {
        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|filename| !filename.is_empty())
            .map(|filename| {
                let name = match filename.rfind('.') {
                    Some(dot_pos) => &filename[..dot_pos],
                    None => filename,
                };
                urlencoding::decode(name)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| name.to_string())
                    .replace(['_', '-'], " ")
            })
    }
}

/// Map an HTTP status to a fetch error
pub fn classify_status(identifier: &str, status: StatusCode) -> PipelineError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            PipelineError::transient(TransientCause::RateLimited, format!("HTTP {}", status))
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
            PipelineError::transient(TransientCause::Network, format!("HTTP {}", status))
        }
        _ => PipelineError::unavailable(identifier, format!("HTTP {}", status)),
    }
}

fn classify_request_error(identifier: &str, err: reqwest::Error) -> PipelineError {
    if err.is_timeout() || err.is_connect() {
        PipelineError::transient(TransientCause::Network, err.to_string())
    } else {
        PipelineError::unavailable(identifier, err.to_string())
    }
}

#[async_trait]
impl MediaSource for DirectSource {
    fn supports(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .filter(|parsed| matches!(parsed.scheme(), "http" | "https"))
            .and_then(|parsed| Self::media_extension(&parsed))
            .is_some()
    }

    fn name(&self) -> &'static str {
        "Direct URL"
    }

    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<MediaHandle> {
        let parsed =
            Url::parse(url).map_err(|_| PipelineError::UnsupportedSource(url.to_string()))?;
        let extension = Self::media_extension(&parsed).unwrap_or_else(|| "mp4".to_string());
        let title = Self::title_from_url(&parsed);

        let response = self
            .client
            .get(parsed.as_str())
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        if !response.status().is_success() {
            return Err(classify_status(url, response.status()));
        }

        let path = dest_dir.join(artifact_file_name(title.as_deref(), &extension));
        tracing::info!("Downloading media to: {}", path.display());

        let progress = self.progress_bar(response.content_length());

        let mut file = fs_err::File::create(&path)?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| classify_request_error(url, e))?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
            progress.set_position(downloaded);
        }

        progress.finish_with_message("Download complete");
        tracing::debug!("Downloaded {}", format_file_size(downloaded));

        Ok(MediaHandle {
            path,
            title,
            duration: None,
            source: self.name().to_string(),
        })
    }
}

impl Default for DirectSource {
    fn default() -> Self {
        Self::new()
    }
}
