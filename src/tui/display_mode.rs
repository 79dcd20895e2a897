//! Display mode detection.
//!
//! Chooses between the interactive dial, a silent headless run, or a
//! headless run that prints JSON.

use std::io::IsTerminal;

/// How the application presents itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Interactive dial in the alternate screen
    Tui,
    /// One run, then a text summary
    Silent,
    /// One run, then a JSON summary
    Json,
}

impl DisplayMode {
    /// `Json` when `--json` was given, otherwise `Tui` on a terminal and
    /// `Silent` everywhere else.
    pub fn detect(json_flag: bool, is_tty: bool) -> Self {
        match (json_flag, is_tty) {
            (true, _) => DisplayMode::Json,
            (false, true) => DisplayMode::Tui,
            (false, false) => DisplayMode::Silent,
        }
    }

    /// [`detect`](Self::detect) against the process's stdout.
    pub fn from_stdout(json_flag: bool) -> Self {
        Self::detect(json_flag, std::io::stdout().is_terminal())
    }

    pub fn is_interactive(self) -> bool {
        self == DisplayMode::Tui
    }

    /// Whether log output may go to stderr without corrupting the screen.
    pub fn logs_to_stderr(self) -> bool {
        !self.is_interactive()
    }
}
