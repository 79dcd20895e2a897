//! The test-phase controller.
//!
//! `TestPhaseController` drives a [`RunState`] from a [`RepeatingTask`] and
//! requests one sample per tick from its [`Sampler`]. It emits
//! [`ProgressEvent`]s to a [`ProgressCallback`] so a display can follow
//! along.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info, warn};

use super::config::ControllerConfig;
use super::run::{RunSnapshot, RunState, Tick};
use super::sampler::Sampler;
use super::ticker::{Pending, RepeatingTask};
use crate::errors::SpeedDialError;
use crate::progress::{ProgressCallback, ProgressEvent};

/// Drives runs of the phase state machine.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use speed_dial::progress::LogProgress;
/// use speed_dial::speedtest::{ControllerConfig, RandomSampler, TestPhaseController};
///
/// #[tokio::main]
/// async fn main() {
///     let mut controller = TestPhaseController::new(
///         ControllerConfig::discrete(),
///         RandomSampler::default(),
///         Arc::new(LogProgress),
///     ).unwrap();
///     controller.start();
///     controller.wait().await;
///     println!("{:?}", controller.snapshot().measurements);
/// }
/// ```
pub struct TestPhaseController<S: Sampler + 'static> {
    config: ControllerConfig,
    sampler: Arc<S>,
    state: Arc<Mutex<RunState>>,
    callback: Arc<dyn ProgressCallback>,
    /// Timer of the active run; dropping it cancels the run's ticks
    ticker: Option<RepeatingTask>,
}

impl<S: Sampler + 'static> TestPhaseController<S> {
    /// Create a controller. Fails when `config` is invalid.
    pub fn new(
        config: ControllerConfig,
        sampler: S,
        callback: Arc<dyn ProgressCallback>,
    ) -> Result<Self, SpeedDialError> {
        config.validate()?;

        Ok(Self {
            config,
            sampler: Arc::new(sampler),
            state: Arc::new(Mutex::new(RunState::new())),
            callback,
            ticker: None,
        })
    }

    /// Start a new run, cancelling any run still in progress.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        // Drop the previous timer before its replacement exists.
        self.ticker = None;

        let generation = {
            let mut state = lock_state(&self.state);
            let generation = state.start();
            self.callback.on_progress(ProgressEvent::RunStarted);
            self.callback.on_progress(ProgressEvent::PhaseChange(state.phase()));
            generation
        };

        info!(
            "Starting run {} ({:?}, every {:?})",
            generation, self.config.pacing, self.config.tick_interval
        );

        let state = Arc::clone(&self.state);
        let sampler = Arc::clone(&self.sampler);
        let callback = Arc::clone(&self.callback);
        let pacing = self.config.pacing;

        self.ticker = Some(RepeatingTask::spawn(
            self.config.tick_interval,
            move |pending| {
                let tick = {
                    let mut guard = lock_state(&state);
                    let Some(tick) = guard.tick(generation, pacing) else {
                        return ControlFlow::Break(());
                    };
                    emit_tick(callback.as_ref(), &tick);
                    tick
                };

                request_sample(
                    pending,
                    generation,
                    &tick,
                    &state,
                    &sampler,
                    &callback,
                );

                if tick.finished {
                    info!("Run {} complete", generation);
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        ));
    }

    /// Stop the current run. Does nothing when no run is active.
    ///
    /// Once this returns, no tick or sample of the stopped run changes the
    /// state again.
    pub fn stop(&mut self) {
        let stopped = {
            let mut state = lock_state(&self.state);
            let stopped = state.stop();
            if stopped {
                self.callback.on_progress(ProgressEvent::RunStopped);
            }
            stopped
        };

        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }

        if stopped {
            info!("Run stopped");
        }
    }

    /// Stop when running, start otherwise.
    pub fn toggle(&mut self) {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn is_running(&self) -> bool {
        lock_state(&self.state).is_running()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        lock_state(&self.state).snapshot()
    }

    /// Wait until the current run finishes on its own.
    ///
    /// Samples still in flight at that point are abandoned; they could no
    /// longer change the state. Returns immediately when no run is active.
    pub async fn wait(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.finished().await;
        }
    }
}

// A poisoned lock only means a callback panicked mid-update; the state
// itself is always left consistent by RunState's methods.
fn lock_state(state: &Mutex<RunState>) -> MutexGuard<'_, RunState> {
    state.lock().unwrap_or_else(|poisoned| {
        warn!("Run state lock was poisoned; continuing");
        poisoned.into_inner()
    })
}

fn emit_tick(callback: &dyn ProgressCallback, tick: &Tick) {
    callback.on_progress(ProgressEvent::Tick { progress: tick.progress });

    if tick.phase_changed {
        debug!("Phase {:?} -> {:?}", tick.sampled, tick.phase);
        callback.on_progress(ProgressEvent::PhaseChange(tick.phase));
    }

    if tick.finished {
        callback.on_progress(ProgressEvent::RunCompleted);
    }
}

fn request_sample<S: Sampler + 'static>(
    pending: &mut Pending<'_>,
    generation: u64,
    tick: &Tick,
    state: &Arc<Mutex<RunState>>,
    sampler: &Arc<S>,
    callback: &Arc<dyn ProgressCallback>,
) {
    // A sample for a phase that already ended would be dropped on arrival.
    if !tick.sampled.is_active() || tick.phase_changed {
        return;
    }

    let phase = tick.sampled;
    let sequence = tick.sequence;
    let state = Arc::clone(state);
    let sampler = Arc::clone(sampler);
    let callback = Arc::clone(callback);

    pending.spawn(async move {
        match sampler.sample(phase).await {
            Ok(sample) => {
                let mut guard = lock_state(&state);
                if guard.apply(generation, sequence, &sample) {
                    callback.on_progress(ProgressEvent::Measurement(
                        *guard.measurements(),
                    ));
                } else {
                    debug!(
                        "Dropping {:?} sample of tick {} from run {}",
                        phase, sequence, generation
                    );
                }
            }
            Err(e) => {
                error!("Error fetching speed test results: {}", e);
            }
        }
    });
}

impl<S: Sampler + 'static> Drop for TestPhaseController<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
