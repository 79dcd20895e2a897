//! Progress event types and callback interface.
//!
//! Defines the events emitted by the phase controller and the callback
//! trait for receiving them.

use log::{debug, info};

use crate::measurements::Measurements;
use crate::speedtest::phase::TestPhase;

/// Progress events emitted while a run is active.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A run started; measurements were reset
    RunStarted,
    /// A tick advanced progress
    Tick {
        /// Progress after the tick, 0 to 100
        progress: f64,
    },
    /// The current phase changed
    PhaseChange(TestPhase),
    /// A sample was recorded; carries all current values
    Measurement(Measurements),
    /// The run was stopped before completing
    RunStopped,
    /// The run completed on its own
    RunCompleted,
}

/// Callback interface for progress updates.
///
/// Called while the controller holds its state lock, so implementations
/// must be quick and must not call back into the controller.
pub trait ProgressCallback: Send + Sync {
    /// Called when a progress event occurs.
    fn on_progress(&self, event: ProgressEvent);
}

/// Writes progress to the log; used when nothing is drawn.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressCallback for LogProgress {
    fn on_progress(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::RunStarted => info!("Speed test started"),
            ProgressEvent::Tick { progress } => debug!("Progress {:.0}%", progress),
            ProgressEvent::PhaseChange(phase) => info!("Phase: {:?}", phase),
            ProgressEvent::Measurement(m) => debug!(
                "Download {:.2} Mbps, upload {:.2} Mbps, ping {:.2} ms, idle {:.2} ms, {}",
                m.download_mbps, m.upload_mbps, m.ping_ms, m.idle_latency_ms, m.ip_type
            ),
            ProgressEvent::RunStopped => info!("Speed test stopped"),
            ProgressEvent::RunCompleted => info!("Speed test complete"),
        }
    }
}
