//! Controller configuration and the two pacing presets.

use std::time::Duration;

use super::phase::{Pacing, CONTINUOUS_PING_AT, PROGRESS_MAX};
use crate::errors::SpeedDialError;

/// Default interval between ticks.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
/// Progress added per tick with per-phase pacing (50 ticks per phase).
pub const DISCRETE_STEP: f64 = 2.0;
/// Progress added per tick with continuous pacing (100 ticks per run).
pub const CONTINUOUS_STEP: f64 = 1.0;

/// Largest continuous step that still samples every phase at least once.
pub const MAX_CONTINUOUS_STEP: f64 = PROGRESS_MAX - CONTINUOUS_PING_AT;

/// Configuration for the phase controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Time between two ticks.
    /// Default: 100ms
    pub tick_interval: Duration,

    /// How progress advances each tick.
    /// Default: per-phase pacing, 2% per tick
    pub pacing: Pacing,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::discrete()
    }
}

impl ControllerConfig {
    /// Per-phase pacing: each phase runs 0 to 100 at 2% per tick.
    pub fn discrete() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            pacing: Pacing::PerPhase { step: DISCRETE_STEP },
        }
    }

    /// Continuous pacing: one 0 to 100 sweep at 1% per tick.
    pub fn continuous() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            pacing: Pacing::Continuous { step: CONTINUOUS_STEP },
        }
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.pacing = self.pacing.with_step(step);
        self
    }

    /// Check that the interval is non-zero and the step is in (0, 100]
    /// (at most 20 for continuous pacing).
    pub fn validate(&self) -> Result<(), SpeedDialError> {
        if self.tick_interval.is_zero() {
            return Err(SpeedDialError::config(
                "tick interval must be greater than zero",
            ));
        }

        let step = self.pacing.step();
        if !step.is_finite() || step <= 0.0 || step > PROGRESS_MAX {
            return Err(SpeedDialError::config(format!(
                "step must be greater than 0 and at most 100, got {}",
                step
            )));
        }

        if let Pacing::Continuous { step } = self.pacing {
            if step > MAX_CONTINUOUS_STEP {
                return Err(SpeedDialError::config(format!(
                    "continuous step must be at most {}, got {}",
                    MAX_CONTINUOUS_STEP, step
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_presets() {
        let discrete = ControllerConfig::discrete();
        assert_eq!(discrete.tick_interval, Duration::from_millis(100));
        assert_eq!(discrete.pacing, Pacing::PerPhase { step: 2.0 });

        let continuous = ControllerConfig::continuous();
        assert_eq!(continuous.tick_interval, Duration::from_millis(100));
        assert_eq!(continuous.pacing, Pacing::Continuous { step: 1.0 });

        assert_eq!(ControllerConfig::default(), discrete);
    }

    #[test]
    fn test_validate_accepts_presets() {
        assert!(ControllerConfig::discrete().validate().is_ok());
        assert!(ControllerConfig::continuous().validate().is_ok());
        assert!(ControllerConfig::discrete().with_step(100.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_step() {
        for step in [0.0, -1.0, 100.5, f64::NAN, f64::INFINITY] {
            let error = ControllerConfig::discrete()
                .with_step(step)
                .validate()
                .unwrap_err();
            assert_eq!(error.kind, ErrorKind::Config);
        }
    }

    #[test]
    fn test_validate_rejects_large_continuous_step() {
        assert!(ControllerConfig::continuous().with_step(20.0).validate().is_ok());
        let error = ControllerConfig::continuous()
            .with_step(25.0)
            .validate()
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Config);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let error = ControllerConfig::continuous()
            .with_tick_interval(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Config);
    }
}
