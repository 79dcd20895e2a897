//! A cancellable fixed-interval task.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Work spawned from a tick. It lives no longer than the task that
/// spawned it.
pub struct Pending<'a> {
    set: &'a mut JoinSet<()>,
}

impl Pending<'_> {
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.set.spawn(future);
    }
}

/// Handle to a task that calls a closure every `period`.
///
/// The first call happens one period after spawning. The task ends when the
/// closure returns `ControlFlow::Break`, abandoning anything spawned through
/// [`Pending`] that is still running. Cancelling or dropping the handle
/// aborts the task and its pending work at any point.
#[derive(Debug)]
pub struct RepeatingTask {
    handle: Option<JoinHandle<()>>,
}

impl RepeatingTask {
    /// Spawn the task on the current tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(&mut Pending<'_>) -> ControlFlow<()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut pending = JoinSet::new();

            loop {
                interval.tick().await;
                while pending.try_join_next().is_some() {}

                let flow = on_tick(&mut Pending { set: &mut pending });
                if flow.is_break() {
                    break;
                }
            }

            pending.shutdown().await;
        });

        Self { handle: Some(handle) }
    }

    /// Abort the task and everything it spawned.
    pub fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Wait for the task to stop on its own.
    pub async fn finished(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
