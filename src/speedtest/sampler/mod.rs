//! Sampling strategies that produce the values shown for each phase.
//!
//! The controller only knows the [`Sampler`] trait, so the random numbers
//! and the latency-based estimate can be swapped for real measurements
//! without touching the state machine.

pub mod probe;
pub mod random;

use std::future::Future;

use super::phase::TestPhase;
use crate::errors::SpeedDialError;
use crate::measurements::Sample;

pub use probe::{LatencyProbeSampler, ProbeConfig};
pub use random::{RandomSampler, SampleRanges};

/// Produces one sample for an active phase.
pub trait Sampler: Send + Sync {
    /// Produce a sample for `phase`, which is always `Download`, `Upload`
    /// or `Ping`.
    fn sample(
        &self,
        phase: TestPhase,
    ) -> impl Future<Output = Result<Sample, SpeedDialError>> + Send;
}

/// Sampler chosen at runtime from the command line.
#[derive(Debug)]
pub enum AnySampler {
    Random(RandomSampler),
    Probe(LatencyProbeSampler),
}

impl AnySampler {
    pub fn name(&self) -> &'static str {
        match self {
            AnySampler::Random(_) => "random",
            AnySampler::Probe(_) => "probe",
        }
    }
}

impl Sampler for AnySampler {
    async fn sample(&self, phase: TestPhase) -> Result<Sample, SpeedDialError> {
        match self {
            AnySampler::Random(sampler) => sampler.sample(phase).await,
            AnySampler::Probe(sampler) => sampler.sample(phase).await,
        }
    }
}

fn inactive_phase(phase: TestPhase) -> SpeedDialError {
    SpeedDialError::new(
        crate::errors::ErrorKind::Unknown,
        format!("no metric is sampled in the {:?} phase", phase),
    )
}
