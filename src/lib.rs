//! tubesum - fetch an online video, transcribe it and optionally summarize the transcript
//!
//! The work is split into three stages (fetch, transcribe, summarize), each memoized
//! per process by a [`cache::StageCache`], and driven by either an interactive
//! terminal form or a line-oriented batch prompt.

pub mod cache;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod frontend;
pub mod openai;
pub mod output;
pub mod pipeline;
pub mod summarize;
pub mod transcribe;
pub mod utils;

pub use cache::StageCache;
pub use cli::{Cli, Commands};
pub use config::{Config, Credentials};
pub use fetch::{Fetcher, MediaHandle, MediaSource, SourceRegistry};
pub use frontend::Capability;
pub use pipeline::Pipeline;
pub use summarize::{BudgetPolicy, Summarizer};
pub use transcribe::Transcriber;

/// Result type used by the pipeline stages
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Why a fetch failed in a way that may succeed on a later attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientCause {
    /// The upstream host asked us to slow down
    RateLimited,
    /// Stream metadata was missing from an otherwise valid response
    MissingStreamMetadata,
    /// Connection or timeout failure
    Network,
}

impl std::fmt::Display for TransientCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransientCause::RateLimited => write!(f, "rate limited"),
            TransientCause::MissingStreamMetadata => write!(f, "stream metadata missing"),
            TransientCause::Network => write!(f, "network"),
        }
    }
}

/// Error types produced by the pipeline stages
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Source unavailable: {identifier}: {reason}")]
    UnavailableSource { identifier: String, reason: String },

    #[error("Temporary fetch failure ({cause}): {message}")]
    TransientFetch { cause: TransientCause, message: String },

    #[error("Transcription service error: {0}")]
    TranscriptionService(String),

    #[error("Summarization service error: {0}")]
    SummarizationService(String),

    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("External tool failed: {0}")]
    Tool(String),

    #[error("File operation failed: {0}")]
    File(#[from] std::io::Error),
}

impl PipelineError {
    pub fn unavailable(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::UnavailableSource {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    pub fn transient(cause: TransientCause, message: impl Into<String>) -> Self {
        PipelineError::TransientFetch {
            cause,
            message: message.into(),
        }
    }

    /// Whether the fetcher should wait and try once more
    pub fn is_transient(&self) -> bool {
        matches!(self, PipelineError::TransientFetch { .. })
    }
}
