use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils;

/// Environment variable holding the API key for the speech and text services
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote speech-to-text and text-generation service settings
    pub openai: OpenAiConfig,

    /// Media fetching settings
    pub fetch: FetchConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL of the OpenAI-compatible API
    pub api_base: String,

    /// Model used for speech recognition
    pub transcription_model: String,

    /// Model used for summaries
    pub summary_model: String,

    /// Sampling temperature for summaries
    pub temperature: f32,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Path or name of the yt-dlp executable
    pub yt_dlp_path: String,

    /// Container extension preferred when picking a stream
    pub preferred_extension: String,

    /// Wait before the single retry of a temporary fetch failure
    pub retry_backoff_secs: u64,

    /// Where fetched media is written (system temp dir if unset)
    pub download_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Summary length offered when none is given
    pub default_summary_length: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig {
                api_base: "https://api.openai.com/v1".to_string(),
                transcription_model: "whisper-1".to_string(),
                summary_model: "gpt-4o-mini".to_string(),
                temperature: 0.5,
                request_timeout_secs: 600,
            },
            fetch: FetchConfig {
                yt_dlp_path: "yt-dlp".to_string(),
                preferred_extension: "mp4".to_string(),
                retry_backoff_secs: 5,
                download_dir: None,
            },
            app: AppConfig {
                default_summary_length: 100,
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            let content =
                fs_err::read_to_string(&config_path).context("Failed to read config file")?;

            let config = Self::from_yaml(&content)?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save(&config_path).await?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("tubesum").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        utils::validate_and_normalize_url(&self.openai.api_base)
            .context("openai.api_base is not a usable URL")?;

        if !(0.0..=2.0).contains(&self.openai.temperature) {
            anyhow::bail!(
                "openai.temperature must be between 0 and 2, got {}",
                self.openai.temperature
            );
        }

        if self.fetch.preferred_extension.trim().is_empty() {
            anyhow::bail!("fetch.preferred_extension must not be empty");
        }

        if self.app.default_summary_length == 0 {
            anyhow::bail!("app.default_summary_length must be positive");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  API Base: {}", self.openai.api_base);
        println!("  Transcription Model: {}", self.openai.transcription_model);
        println!("  Summary Model: {}", self.openai.summary_model);
        println!("  Temperature: {}", self.openai.temperature);
        println!("  yt-dlp: {}", self.fetch.yt_dlp_path);
        println!("  Preferred Extension: {}", self.fetch.preferred_extension);
        println!("  Retry Backoff: {}s", self.fetch.retry_backoff_secs);
        println!("  Download Dir: {}", self.download_dir().display());
        println!("  Default Summary Length: {} words", self.app.default_summary_length);
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.fetch.retry_backoff_secs)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.fetch
            .download_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("tubesum"))
    }
}

/// API credentials, read once at startup and handed to the service client
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Read the API key from the process environment
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).with_context(|| {
            format!("{} must be set to reach the transcription service", API_KEY_ENV)
        })?;

        if api_key.trim().is_empty() {
            anyhow::bail!("{} is set but empty", API_KEY_ENV);
        }

        Ok(Self::new(api_key))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
