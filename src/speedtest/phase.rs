//! Test phases and the pacing rules that move between them.

use serde::Serialize;

/// Progress at which a continuous run leaves the download phase.
pub const CONTINUOUS_UPLOAD_AT: f64 = 40.0;
/// Progress at which a continuous run leaves the upload phase.
pub const CONTINUOUS_PING_AT: f64 = 80.0;
/// Progress value that ends a phase (per-phase pacing) or the run.
pub const PROGRESS_MAX: f64 = 100.0;

/// Which metric is currently being sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestPhase {
    /// No run is active (never started, or stopped)
    #[default]
    Idle,
    /// Sampling download throughput
    Download,
    /// Sampling upload throughput
    Upload,
    /// Sampling ping, idle latency and address family
    Ping,
    /// The last run finished on its own
    Done,
}

impl TestPhase {
    /// Whether this phase receives live metric updates.
    pub fn is_active(&self) -> bool {
        matches!(self, TestPhase::Download | TestPhase::Upload | TestPhase::Ping)
    }

    /// The phase following this one in a run.
    ///
    /// `Ping` is followed by `Done`; inactive phases have no successor.
    pub fn next(&self) -> Option<TestPhase> {
        match self {
            TestPhase::Download => Some(TestPhase::Upload),
            TestPhase::Upload => Some(TestPhase::Ping),
            TestPhase::Ping => Some(TestPhase::Done),
            TestPhase::Idle | TestPhase::Done => None,
        }
    }
}

/// How progress advances and how it maps onto phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pacing {
    /// Progress runs 0 to 100 within each phase and resets on every
    /// transition.
    PerPhase { step: f64 },
    /// Progress runs 0 to 100 once across the whole run; the phase is
    /// derived from the progress value.
    Continuous { step: f64 },
}

impl Pacing {
    pub fn step(&self) -> f64 {
        match *self {
            Pacing::PerPhase { step } | Pacing::Continuous { step } => step,
        }
    }

    /// Name of the variant this pacing implements.
    pub fn name(&self) -> &'static str {
        match self {
            Pacing::PerPhase { .. } => "discrete",
            Pacing::Continuous { .. } => "continuous",
        }
    }

    pub fn with_step(self, step: f64) -> Self {
        match self {
            Pacing::PerPhase { .. } => Pacing::PerPhase { step },
            Pacing::Continuous { .. } => Pacing::Continuous { step },
        }
    }
}

/// Phase for a given progress value under continuous pacing.
pub fn continuous_phase(progress: f64) -> TestPhase {
    if progress < CONTINUOUS_UPLOAD_AT {
        TestPhase::Download
    } else if progress < CONTINUOUS_PING_AT {
        TestPhase::Upload
    } else {
        TestPhase::Ping
    }
}
