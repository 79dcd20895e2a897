//! Run state and its transition functions.
//!
//! `RunState` holds everything that changes during a run. Every transition
//! is a plain method with no I/O, so the whole state machine can be driven
//! tick by tick without a timer.

use serde::Serialize;

use super::phase::{continuous_phase, Pacing, TestPhase, PROGRESS_MAX};
use crate::measurements::{Measurements, Sample};

/// What a single tick did to the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Position of the tick within its run, starting at 1
    pub sequence: u64,
    /// Phase that was current when the tick fired
    pub sampled: TestPhase,
    /// Progress after the tick
    pub progress: f64,
    /// Phase after the tick
    pub phase: TestPhase,
    /// Whether the tick moved to a different phase
    pub phase_changed: bool,
    /// Whether the tick completed the run
    pub finished: bool,
}

/// A copy of the observable state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub running: bool,
    pub phase: TestPhase,
    pub progress: f64,
    pub measurements: Measurements,
}

/// State of the current (or last) run.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Bumped on every start and every explicit stop
    generation: u64,
    running: bool,
    phase: TestPhase,
    progress: f64,
    measurements: Measurements,
    /// Ticks fired in the current run
    ticks: u64,
    /// Sequence of the newest tick whose sample was recorded
    last_applied: u64,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            running: self.running,
            phase: self.phase,
            progress: self.progress,
            measurements: self.measurements,
        }
    }

    /// Begin a new run and return its generation.
    ///
    /// Clears every measurement, puts the run in the download phase with
    /// zero progress, and invalidates anything still owed to an earlier run.
    pub fn start(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.running = true;
        self.phase = TestPhase::Download;
        self.progress = 0.0;
        self.measurements = Measurements::default();
        self.ticks = 0;
        self.last_applied = 0;
        self.generation
    }

    /// Stop the current run, keeping its measurements.
    ///
    /// Returns `false` (and changes nothing) when no run is active.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.running = false;
        self.phase = TestPhase::Idle;
        self.generation = self.generation.wrapping_add(1);
        true
    }

    /// Advance the run identified by `generation` by one tick.
    ///
    /// Returns `None` when that run is no longer the active one, in which
    /// case nothing changes.
    pub fn tick(&mut self, generation: u64, pacing: Pacing) -> Option<Tick> {
        if generation != self.generation || !self.running {
            return None;
        }

        self.ticks += 1;
        let sampled = self.phase;
        let progress = (self.progress + pacing.step()).min(PROGRESS_MAX);

        match pacing {
            Pacing::PerPhase { .. } => {
                if progress >= PROGRESS_MAX {
                    match sampled.next() {
                        Some(next) if next.is_active() => {
                            self.phase = next;
                            self.progress = 0.0;
                        }
                        _ => self.finish(),
                    }
                } else {
                    self.progress = progress;
                }
            }
            Pacing::Continuous { .. } => {
                if progress >= PROGRESS_MAX {
                    self.finish();
                } else {
                    self.progress = progress;
                    self.phase = continuous_phase(progress);
                }
            }
        }

        Some(Tick {
            sequence: self.ticks,
            sampled,
            progress: self.progress,
            phase: self.phase,
            phase_changed: self.phase != sampled,
            finished: !self.running,
        })
    }

    /// Record the sample requested by tick `sequence` of the run
    /// identified by `generation`.
    ///
    /// A sample only lands while its phase is still the current one, so a
    /// metric stops changing once its phase is over. Samples from a stopped
    /// or replaced run are dropped, and so are samples that finish after a
    /// newer tick's sample was already recorded.
    pub fn apply(&mut self, generation: u64, sequence: u64, sample: &Sample) -> bool {
        if generation != self.generation
            || sample.phase() != self.phase
            || sequence <= self.last_applied
        {
            return false;
        }

        self.measurements.apply(sample);
        self.last_applied = sequence;
        true
    }

    fn finish(&mut self) {
        self.running = false;
        self.phase = TestPhase::Done;
        self.progress = PROGRESS_MAX;
    }
}
