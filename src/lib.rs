//! speed-dial: a terminal speed test gauge.
//!
//! A [`speedtest::TestPhaseController`] walks a run through its download,
//! upload and ping phases on a fixed tick, filling in readouts from a
//! [`speedtest::Sampler`]. The [`tui`] module draws the dial.

pub mod directory;
pub mod errors;
pub mod measurements;
pub mod progress;
pub mod results;
pub mod speedtest;
pub mod tui;
