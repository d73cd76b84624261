use std::io::IsTerminal;

pub mod batch;
pub mod interactive;

/// Which front-end this process can drive, decided once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// A terminal is attached on both ends; the full-screen form can run
    InteractiveAvailable,
    /// Piped or redirected I/O; fall back to line prompts
    BatchOnly,
}

/// Probe the current process
pub fn probe() -> Capability {
    let term = std::env::var("TERM").ok();
    probe_with(
        std::io::stdin().is_terminal(),
        console::Term::stdout().is_term(),
        term.as_deref(),
    )
}

pub fn probe_with(stdin_is_tty: bool, stdout_is_tty: bool, term: Option<&str>) -> Capability {
    if stdin_is_tty && stdout_is_tty && term != Some("dumb") {
        Capability::InteractiveAvailable
    } else {
        Capability::BatchOnly
    }
}
