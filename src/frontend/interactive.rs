use anyhow::Result;
use console::{style, Key, Term};

use crate::fetch::MediaHandle;
use crate::output::code_block;
use crate::pipeline::Pipeline;
use crate::summarize::BudgetPolicy;
use crate::utils::format_duration;

pub const SLIDER_MIN: u32 = 10;
pub const SLIDER_MAX: u32 = 500;
const SLIDER_WIDTH: u32 = 30;

const TITLE: &str = "YouTube Video Transcription and Summarization";

/// Which control has the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    UrlField,
    Controls,
}

/// Everything the form shows; every change is followed by a full redraw
#[derive(Debug, Clone)]
pub struct FormState {
    pub url: String,
    pub focus: Focus,
    pub status: Option<&'static str>,
    pub media: Option<MediaHandle>,
    pub transcript: Option<String>,
    pub summarize: bool,
    pub length: u32,
    pub summary: Option<String>,
    pub error: Option<String>,
}

impl FormState {
    pub fn new(default_length: u32) -> Self {
        Self {
            url: String::new(),
            focus: Focus::UrlField,
            status: None,
            media: None,
            transcript: None,
            summarize: false,
            length: default_length.clamp(SLIDER_MIN, SLIDER_MAX),
            summary: None,
            error: None,
        }
    }

    /// New URL entered: previous results no longer apply, the controls keep their values
    pub fn set_url(&mut self, url: &str) {
        self.url = url.trim().to_string();
        self.media = None;
        self.transcript = None;
        self.summary = None;
        self.error = None;
    }

    pub fn toggle_summarize(&mut self) {
        self.summarize = !self.summarize;
        if !self.summarize {
            self.summary = None;
        }
    }

    /// Move the slider; returns whether the value changed
    pub fn adjust_length(&mut self, delta: i64) -> bool {
        let next = (self.length as i64 + delta).clamp(SLIDER_MIN as i64, SLIDER_MAX as i64) as u32;
        if next == self.length {
            return false;
        }
        self.length = next;
        self.summary = None;
        true
    }

    /// A summary is wanted and is not on screen yet
    pub fn needs_summary(&self) -> bool {
        self.summarize && self.transcript.is_some() && self.summary.is_none()
    }

    /// Generic error state shown in place of a result
    pub fn fail(&mut self, err: &dyn std::fmt::Display) {
        self.status = None;
        self.error = Some(format!("Something went wrong: {}", err));
    }
}

fn slider(length: u32) -> String {
    let span = SLIDER_MAX - SLIDER_MIN;
    let knob = (length.saturating_sub(SLIDER_MIN) * (SLIDER_WIDTH - 1) + span / 2) / span;
    let track: String = (0..SLIDER_WIDTH)
        .map(|i| if i == knob { '●' } else { '━' })
        .collect();
    format!("{} {} {}", SLIDER_MIN, track, SLIDER_MAX)
}

/// Draw the whole form as text
pub fn render(state: &FormState, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(style(TITLE).bold().to_string());
    lines.push("=".repeat(TITLE.len()));
    lines.push(String::new());

    if !state.url.is_empty() {
        lines.push(format!("URL: {}", state.url));
    }
    if let Some(media) = &state.media {
        let mut about = format!("Source: {}", media.source);
        if let Some(title) = &media.title {
            about.push_str(&format!(" | {}", title));
        }
        if let Some(duration) = media.duration {
            about.push_str(&format!(" | {}", format_duration(duration)));
        }
        lines.push(style(about).dim().to_string());
    }
    if let Some(error) = &state.error {
        lines.push(style(error).red().to_string());
    }
    if let Some(status) = state.status {
        lines.push(style(status).cyan().to_string());
    }

    if let Some(transcript) = &state.transcript {
        lines.push(String::new());
        lines.push("Transcription:".to_string());
        lines.push(code_block(transcript, width));
        lines.push(String::new());

        let checkbox = if state.summarize { "[x]" } else { "[ ]" };
        lines.push(format!("{} Do you want to summarize the transcription?", checkbox));

        if state.summarize {
            lines.push(format!(
                "Enter the desired summary length (in words): {}",
                style(state.length).bold()
            ));
            lines.push(slider(state.length));
        }

        if let Some(summary) = &state.summary {
            lines.push(String::new());
            lines.push("Summary:".to_string());
            lines.push(summary.clone());
        }
    }

    lines.push(String::new());
    match state.focus {
        Focus::UrlField => {
            lines.push(style("Leave empty to quit.").dim().to_string());
            lines.push("Enter the YouTube video URL: ".to_string());
        }
        Focus::Controls => {
            let keys =
                "[space] summarize  [←/→] ±10  [↓/↑] ±1  [enter] update  [n] new URL  [q] quit";
            lines.push(style(keys).dim().to_string());
        }
    }

    lines.join("\n")
}

enum Next {
    NewUrl,
    Quit,
}

/// Full-screen form driven from the terminal
pub struct InteractiveApp<'a> {
    pipeline: &'a Pipeline,
    term: Term,
    state: FormState,
}

impl<'a> InteractiveApp<'a> {
    pub fn new(pipeline: &'a Pipeline, default_length: u32) -> Self {
        Self {
            pipeline,
            term: Term::stdout(),
            state: FormState::new(default_length),
        }
    }

    fn draw(&self) -> Result<()> {
        let width = (self.term.size().1 as usize).saturating_sub(2);
        self.term.clear_screen()?;
        self.term.write_str(&render(&self.state, width))?;
        Ok(())
    }

    pub async fn run(mut self) -> Result<()> {
        loop {
            self.state.focus = Focus::UrlField;
            self.draw()?;

            let url = self.term.read_line()?;
            if url.trim().is_empty() {
                break;
            }

            self.state.set_url(&url);
            self.state.status = Some("Transcribing the video...");
            self.draw()?;

            let identifier = self.state.url.clone();
            match self.pipeline.transcript_for(&identifier).await {
                Ok((media, transcript)) => {
                    self.state.status = None;
                    self.state.media = Some(media);
                    self.state.transcript = Some(transcript);
                }
                Err(err) => {
                    tracing::warn!("Pipeline failed for {}: {}", identifier, err);
                    self.state.fail(&err);
                    continue;
                }
            }

            match self.controls().await? {
                Next::NewUrl => continue,
                Next::Quit => break,
            }
        }

        self.term.clear_screen()?;
        Ok(())
    }

    async fn controls(&mut self) -> Result<Next> {
        self.state.focus = Focus::Controls;
        if self.state.needs_summary() {
            self.summarize().await;
        }

        loop {
            self.draw()?;

            match self.term.read_key()? {
                Key::Char(' ') | Key::Char('s') => {
                    self.state.toggle_summarize();
                    if self.state.needs_summary() {
                        self.summarize().await;
                    }
                }
                Key::ArrowLeft => {
                    self.state.adjust_length(-10);
                }
                Key::ArrowRight => {
                    self.state.adjust_length(10);
                }
                Key::ArrowDown => {
                    self.state.adjust_length(-1);
                }
                Key::ArrowUp => {
                    self.state.adjust_length(1);
                }
                Key::Enter => {
                    if self.state.needs_summary() {
                        self.summarize().await;
                    }
                }
                Key::Char('n') => return Ok(Next::NewUrl),
                Key::Char('q') | Key::Escape => return Ok(Next::Quit),
                _ => {}
            }
        }
    }

    async fn summarize(&mut self) {
        let Some(transcript) = self.state.transcript.clone() else {
            return;
        };

        self.state.error = None;
        self.state.status = Some("Summarizing the transcription...");
        if let Err(err) = self.draw() {
            tracing::debug!("redraw failed: {}", err);
        }

        summarize_into(self.pipeline, &mut self.state, &transcript).await;
    }
}

/// Summarize at the slider's length and put the result, or the error, on the form
pub async fn summarize_into(pipeline: &Pipeline, state: &mut FormState, transcript: &str) {
    match pipeline
        .summarize(transcript, state.length, BudgetPolicy::Scaled)
        .await
    {
        Ok(summary) => {
            state.status = None;
            state.summary = Some(summary);
        }
        Err(err) => {
            tracing::warn!("Summarization failed: {}", err);
            state.fail(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn plain(state: &FormState) -> String {
        console::strip_ansi_codes(&render(state, 20)).to_string()
    }

    fn with_transcript() -> FormState {
        let mut state = FormState::new(100);
        state.set_url("https://youtu.be/abc");
        state.media = Some(MediaHandle {
            path: PathBuf::from("/tmp/clip.mp4"),
            title: Some("Clip".to_string()),
            duration: Some(10.0),
            source: "yt-dlp".to_string(),
        });
        state.transcript = Some("hello world".to_string());
        state.focus = Focus::Controls;
        state
    }

    #[test]
    fn test_initial_form_asks_for_url() {
        let text = plain(&FormState::new(100));

        assert!(text.contains(TITLE));
        assert!(text.trim_end().ends_with("Enter the YouTube video URL:"));
        assert!(!text.contains("Transcription:"));
    }

    #[test]
    fn test_renders_transcript_and_checkbox() {
        let text = plain(&with_transcript());

        assert!(text.contains("Source: yt-dlp | Clip | 10s"));
        assert!(text.contains("  hello world"));
        assert!(text.contains("[ ] Do you want to summarize"));
        assert!(!text.contains("summary length"));
    }

    #[test]
    fn test_renders_slider_and_summary_when_enabled() {
        let mut state = with_transcript();
        state.toggle_summarize();
        state.summary = Some("A greeting.".to_string());

        let text = plain(&state);

        assert!(text.contains("[x] Do you want to summarize"));
        assert!(text.contains("Enter the desired summary length (in words): 100"));
        assert!(text.contains("Summary:\nA greeting."));
    }

    #[test]
    fn test_error_state_is_rendered() {
        let mut state = FormState::new(100);
        state.status = Some("Transcribing the video...");
        state.fail(&"Source unavailable");

        let text = plain(&state);

        assert!(text.contains("Something went wrong: Source unavailable"));
        assert!(!text.contains("Transcribing the video..."));
    }

    #[test]
    fn test_slider_is_clamped() {
        let mut state = FormState::new(100);

        assert!(state.adjust_length(-1000));
        assert_eq!(state.length, SLIDER_MIN);
        assert!(!state.adjust_length(-10));

        assert!(state.adjust_length(10_000));
        assert_eq!(state.length, SLIDER_MAX);

        assert_eq!(FormState::new(3).length, SLIDER_MIN);
    }

    #[test]
    fn test_slider_change_invalidates_summary() {
        let mut state = with_transcript();
        state.toggle_summarize();
        state.summary = Some("old".to_string());

        state.adjust_length(10);

        assert_eq!(state.length, 110);
        assert!(state.needs_summary());
    }

    #[test]
    fn test_new_url_keeps_controls() {
        let mut state = with_transcript();
        state.toggle_summarize();
        state.adjust_length(50);
        state.summary = Some("old".to_string());

        state.set_url("  https://youtu.be/other ");

        assert_eq!(state.url, "https://youtu.be/other");
        assert!(state.summarize);
        assert_eq!(state.length, 150);
        assert!(state.transcript.is_none());
        assert!(state.summary.is_none());
        assert!(!state.needs_summary());
    }

    #[test]
    fn test_slider_track_positions() {
        assert!(slider(SLIDER_MIN).contains(" ●"));
        assert!(slider(SLIDER_MAX).contains("● "));
    }
}
