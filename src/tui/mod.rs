//! Terminal user interface for speed-dial.
//!
//! Draws the dial, maps key presses to actions, and manages the terminal.

pub mod controller;
pub mod display_mode;
pub mod input;
pub mod renderer;
pub mod state;
pub mod theme;

pub use controller::TuiController;
pub use display_mode::DisplayMode;
pub use input::{poll_action, Action};
pub use state::{DisplayPreferences, TuiState};
pub use theme::Theme;
