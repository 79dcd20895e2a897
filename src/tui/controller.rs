//! Terminal lifecycle for the interactive dial.
//!
//! The TuiController owns the terminal, keeps the state that frames are
//! drawn from, and hands the phase controller a progress callback that
//! feeds that state.

use std::io::{self, Stdout};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossterm::{
    cursor, execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};

use super::display_mode::DisplayMode;
use super::renderer::render_frame;
use super::state::TuiState;
use crate::errors::SpeedDialError;
use crate::progress::{ProgressCallback, ProgressEvent};

/// Controller for the TUI display.
pub struct TuiController {
    mode: DisplayMode,
    /// Shared with the progress callback
    state: Arc<Mutex<TuiState>>,
    /// Only present once `init` ran in TUI mode
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
    initialized: bool,
}

fn lock(state: &Mutex<TuiState>) -> MutexGuard<'_, TuiState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TuiController {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            mode,
            state: Arc::new(Mutex::new(TuiState::new())),
            terminal: None,
            initialized: false,
        }
    }

    /// Enter raw mode and the alternate screen. A no-op outside TUI mode.
    pub fn init(&mut self) -> Result<(), SpeedDialError> {
        if !self.mode.is_interactive() || self.initialized {
            return Ok(());
        }

        enable_raw_mode()?;
        self.initialized = true;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        lock(&self.state).terminal_width = terminal.size()?.width;
        self.terminal = Some(terminal);

        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn cleanup(&mut self) -> Result<(), SpeedDialError> {
        if !self.initialized {
            return Ok(());
        }

        if let Some(ref mut terminal) = self.terminal {
            execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
        }
        disable_raw_mode()?;

        self.initialized = false;
        self.terminal = None;

        Ok(())
    }

    pub fn set_dark_mode(&self, dark_mode: bool) {
        lock(&self.state).preferences.dark_mode = dark_mode;
    }

    /// Flip the palette and return the new setting.
    pub fn toggle_dark_mode(&self) -> bool {
        let mut state = lock(&self.state);
        state.preferences.toggle_dark_mode();
        state.preferences.dark_mode
    }

    /// Copy of the state the next frame will be drawn from.
    pub fn state(&self) -> TuiState {
        lock(&self.state).clone()
    }

    /// Draw one frame. A no-op outside TUI mode.
    pub fn render(&mut self) -> Result<(), SpeedDialError> {
        let Some(ref mut terminal) = self.terminal else {
            return Ok(());
        };

        let width = terminal.size()?.width;
        // Clone so the lock is not held while drawing
        let state = {
            let mut guard = lock(&self.state);
            guard.terminal_width = width;
            guard.clone()
        };

        terminal.draw(|frame| render_frame(frame, &state))?;
        Ok(())
    }

    /// Callback that feeds progress events into the drawn state.
    pub fn progress_callback(&self) -> Arc<dyn ProgressCallback> {
        Arc::new(TuiProgressCallback {
            state: Arc::clone(&self.state),
        })
    }
}

impl Drop for TuiController {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

struct TuiProgressCallback {
    state: Arc<Mutex<TuiState>>,
}

impl ProgressCallback for TuiProgressCallback {
    fn on_progress(&self, event: ProgressEvent) {
        // Every event must land: a dropped RunStopped would leave the
        // button reading "Stop Test".
        lock(&self.state).update_from_event(&event);
    }
}
