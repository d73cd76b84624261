use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use url::Url;

use crate::utils::artifact_file_name;
use crate::{PipelineError, Result, TransientCause};

use super::{MediaHandle, MediaSource};

/// Video site source backed by yt-dlp (YouTube, X/Twitter)
pub struct YtDlpSource {
    yt_dlp_path: String,
    preferred_extension: String,
}

/// The parts of `yt-dlp --dump-json` we care about
#[derive(Debug, Deserialize)]
struct VideoInfo {
    title: Option<String>,
    duration: Option<f64>,
    formats: Option<Vec<Encoding>>,
}

/// One stream encoding offered by the site
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Encoding {
    pub format_id: String,
    pub ext: String,
    pub height: Option<u32>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
}

impl Encoding {
    fn has_audio(&self) -> bool {
        self.acodec.as_deref().is_some_and(|codec| codec != "none")
    }

    fn has_video(&self) -> bool {
        self.vcodec.as_deref().is_some_and(|codec| codec != "none")
    }

    /// Audio and video muxed in a single stream
    pub fn is_progressive(&self) -> bool {
        self.has_audio() && self.has_video()
    }
}

/// Pick the lowest-resolution progressive stream in the preferred container,
/// falling back to the first listed encoding that carries audio. Storyboards
/// and video-only streams are never chosen by the fallback.
pub fn select_encoding<'a>(encodings: &'a [Encoding], preferred_ext: &str) -> Option<&'a Encoding> {
    encodings
        .iter()
        .filter(|enc| enc.is_progressive() && enc.ext.eq_ignore_ascii_case(preferred_ext))
        .min_by_key(|enc| enc.height.unwrap_or(u32::MAX))
        .or_else(|| encodings.iter().find(|enc| enc.has_audio()))
}

/// Map yt-dlp's stderr to a pipeline error
pub fn classify_failure(identifier: &str, stderr: &str) -> PipelineError {
    let lower = stderr.to_lowercase();
    let message = stderr.trim().lines().last().unwrap_or("yt-dlp failed").to_string();

    if lower.contains("http error 429") || lower.contains("too many requests") {
        PipelineError::transient(TransientCause::RateLimited, message)
    } else if lower.contains("unable to extract")
        || lower.contains("streamingdata")
        || lower.contains("nsig extraction failed")
    {
        PipelineError::transient(TransientCause::MissingStreamMetadata, message)
    } else if lower.contains("timed out") || lower.contains("connection reset") {
        PipelineError::transient(TransientCause::Network, message)
    } else {
        // Private, removed, geo-blocked, requested format gone, ...
        PipelineError::unavailable(identifier, message)
    }
}

impl YtDlpSource {
    pub fn new(yt_dlp_path: String, preferred_extension: String) -> Self {
        Self {
            yt_dlp_path,
            preferred_extension,
        }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output> {
        Command::new(&self.yt_dlp_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| PipelineError::Tool(format!("could not run {}: {}", self.yt_dlp_path, e)))
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<VideoInfo> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = self.run(&["--dump-json", "--no-playlist", url]).await?;

        if !output.status.success() {
            return Err(classify_failure(url, &String::from_utf8_lossy(&output.stderr)));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            PipelineError::transient(
                TransientCause::MissingStreamMetadata,
                format!("unreadable video metadata: {}", e),
            )
        })
    }

    /// Download one encoding to the given path
    async fn download(&self, url: &str, encoding: &Encoding, output_path: &Path) -> Result<()> {
        tracing::debug!(
            "Downloading format {} ({}) for: {}",
            encoding.format_id,
            encoding.ext,
            url
        );

        let output_path = output_path.to_string_lossy();
        let output = self
            .run(&[
                "--format",
                encoding.format_id.as_str(),
                "--output",
                &*output_path,
                "--no-playlist",
                "--no-part",
                url,
            ])
            .await?;

        if !output.status.success() {
            return Err(classify_failure(url, &String::from_utf8_lossy(&output.stderr)));
        }

        Ok(())
    }
}

#[async_trait]
impl MediaSource for YtDlpSource {
    fn supports(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_lowercase();
        let host = host
            .strip_prefix("www.")
            .or_else(|| host.strip_prefix("m."))
            .unwrap_or(&host);

        match host {
            "youtube.com" | "youtube-nocookie.com" => {
                let path = parsed.path();
                path.starts_with("/watch")
                    || path.starts_with("/embed/")
                    || path.starts_with("/shorts/")
                    || path.starts_with("/v/")
                    || path.starts_with("/live/")
            }
            "youtu.be" => parsed.path().len() > 1,
            "twitter.com" | "x.com" => parsed.path().contains("/status/"),
            _ => false,
        }
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<MediaHandle> {
        let info = self.get_video_info(url).await?;

        let encodings = info.formats.ok_or_else(|| {
            PipelineError::transient(
                TransientCause::MissingStreamMetadata,
                "response carried no stream list",
            )
        })?;

        let encoding = select_encoding(&encodings, &self.preferred_extension)
            .ok_or_else(|| PipelineError::unavailable(url, "no encoding with audio offered"))?;

        if !encoding.ext.eq_ignore_ascii_case(&self.preferred_extension) {
            tracing::info!(
                "No {} stream available, falling back to {} ({})",
                self.preferred_extension,
                encoding.format_id,
                encoding.ext
            );
        }

        let path: PathBuf = dest_dir.join(artifact_file_name(info.title.as_deref(), &encoding.ext));
        self.download(url, encoding, &path).await?;

        Ok(MediaHandle {
            path,
            title: info.title,
            duration: info.duration,
            source: self.name().to_string(),
        })
    }
}
