use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::output::format_section;
use crate::pipeline::Pipeline;
use crate::summarize::BudgetPolicy;

/// What the batch run printed last
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Transcript(String),
    Summary(String),
}

impl BatchOutcome {
    pub fn text(&self) -> &str {
        match self {
            BatchOutcome::Transcript(text) | BatchOutcome::Summary(text) => text,
        }
    }
}

fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<String> {
    write!(out, "{}", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer).context("Failed to read from stdin")?;
    Ok(answer.trim().to_string())
}

/// Prompt for one URL, run the pipeline once and print the result.
///
/// Stage failures are returned unchanged so the process exits non-zero.
pub async fn run<R: BufRead, W: Write>(
    pipeline: &Pipeline,
    input: &mut R,
    out: &mut W,
) -> Result<BatchOutcome> {
    let url = ask(input, out, "Enter the YouTube video URL: ")?;
    if url.is_empty() {
        anyhow::bail!("No video URL given");
    }

    let media = pipeline.fetch(&url).await?;
    let transcription = pipeline.transcribe(&media).await?;

    let summarize = ask(input, out, "Do you want to summarize the transcription? (yes/no): ")?;

    if summarize.to_lowercase() == "yes" {
        let answer = ask(input, out, "Enter the desired summary length (in words): ")?;
        let summary_length: u32 = answer
            .parse()
            .ok()
            .filter(|&words| words > 0)
            .with_context(|| format!("Invalid summary length: {:?}", answer))?;

        let summary = pipeline
            .summarize(&transcription, summary_length, BudgetPolicy::Literal)
            .await?;
        writeln!(out, "{}", format_section("Summary", &summary))?;
        Ok(BatchOutcome::Summary(summary))
    } else {
        writeln!(out, "{}", format_section("Transcription", &transcription))?;
        Ok(BatchOutcome::Transcript(transcription))
    }
}
