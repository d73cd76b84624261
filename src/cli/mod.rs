use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::frontend::Capability;

#[derive(Parser, Debug)]
#[command(
    name = "tubesum",
    about = "Transcribe a video and optionally summarize the transcript",
    version,
    long_about = "Fetches a video (YouTube, X/Twitter, direct media URL or local file), sends it \
                  to an OpenAI-compatible speech-to-text service and can summarize the transcript \
                  with a text-generation model. Runs a full-screen form on a terminal and plain \
                  prompts otherwise."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (defaults to ./config.yaml or the user config dir)
    #[arg(short, long, global = true, env = "TUBESUM_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also save the printed transcript or summary to this file (batch mode)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or locate the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported media sources
    Sources,
}

impl Cli {
    /// Default log filter for the chosen verbosity.
    ///
    /// The full-screen form shares the terminal with stderr, so only warnings
    /// get through there unless `--verbose` asks for more.
    pub fn log_filter(&self, capability: Capability) -> &'static str {
        match (self.verbose, capability) {
            (true, _) => "tubesum=debug",
            (false, Capability::InteractiveAvailable) => "tubesum=warn",
            (false, Capability::BatchOnly) => "tubesum=info",
        }
    }

    /// Spinners and download bars only run for line-oriented output
    pub fn show_progress(&self, capability: Capability) -> bool {
        !self.quiet && capability == Capability::BatchOnly
    }
}
