//! TUI state management.
//!
//! Holds everything needed to draw a frame: the run as last reported by
//! the controller, and the viewer's display preferences.

use crate::measurements::Measurements;
use crate::progress::ProgressEvent;
use crate::speedtest::phase::TestPhase;

/// Viewer preferences that outlive individual runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayPreferences {
    /// Dark palette instead of the light one
    pub dark_mode: bool,
}

impl DisplayPreferences {
    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }
}

/// State for the TUI display.
#[derive(Debug, Clone)]
pub struct TuiState {
    /// Whether a run is in progress (selects the button label)
    pub running: bool,
    /// Current test phase
    pub phase: TestPhase,
    /// Progress of the current phase or run, 0 to 100
    pub progress: f64,
    /// Latest values for every tile
    pub measurements: Measurements,
    /// Theme and other viewer choices
    pub preferences: DisplayPreferences,
    /// Terminal width for layout
    pub terminal_width: u16,
}

impl Default for TuiState {
    fn default() -> Self {
        Self {
            running: false,
            phase: TestPhase::Idle,
            progress: 0.0,
            measurements: Measurements::default(),
            preferences: DisplayPreferences::default(),
            terminal_width: 80,
        }
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update state from a progress event.
    pub fn update_from_event(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RunStarted => {
                self.running = true;
                self.phase = TestPhase::Download;
                self.progress = 0.0;
                self.measurements = Measurements::default();
            }
            ProgressEvent::Tick { progress } => {
                self.progress = progress.clamp(0.0, 100.0);
            }
            ProgressEvent::PhaseChange(phase) => {
                self.phase = *phase;
            }
            ProgressEvent::Measurement(measurements) => {
                self.measurements = *measurements;
            }
            ProgressEvent::RunStopped => {
                self.running = false;
                self.phase = TestPhase::Idle;
            }
            ProgressEvent::RunCompleted => {
                self.running = false;
                self.phase = TestPhase::Done;
            }
        }
    }

    /// Fraction of the ring to fill, 0 to 1.
    pub fn ring_fraction(&self) -> f64 {
        (self.progress / 100.0).clamp(0.0, 1.0)
    }
}
