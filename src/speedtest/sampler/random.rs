//! Uniformly random readouts.

use std::ops::Range;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{inactive_phase, Sampler};
use crate::errors::SpeedDialError;
use crate::measurements::{IpType, Sample};
use crate::speedtest::phase::TestPhase;

/// Half-open ranges the random sampler draws from.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRanges {
    /// Default: 0..100 Mbps
    pub download_mbps: Range<f64>,
    /// Default: 0..50 Mbps
    pub upload_mbps: Range<f64>,
    /// Default: 0..50 ms
    pub ping_ms: Range<f64>,
    /// Default: 0..20 ms
    pub idle_latency_ms: Range<f64>,
}

impl Default for SampleRanges {
    fn default() -> Self {
        Self {
            download_mbps: 0.0..100.0,
            upload_mbps: 0.0..50.0,
            ping_ms: 0.0..50.0,
            idle_latency_ms: 0.0..20.0,
        }
    }
}

/// Draws every value uniformly from [`SampleRanges`].
#[derive(Debug)]
pub struct RandomSampler {
    ranges: SampleRanges,
    rng: Mutex<StdRng>,
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new(SampleRanges::default())
    }
}

impl RandomSampler {
    pub fn new(ranges: SampleRanges) -> Self {
        Self { ranges, rng: Mutex::new(StdRng::from_entropy()) }
    }

    /// A sampler with a fixed seed, for reproducible sequences.
    pub fn with_seed(ranges: SampleRanges, seed: u64) -> Self {
        Self { ranges, rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    fn draw(&self, phase: TestPhase) -> Result<Sample, SpeedDialError> {
        let mut rng = self.rng.lock().map_err(|e| {
            SpeedDialError::new(
                crate::errors::ErrorKind::Unknown,
                format!("random sampler lock poisoned: {}", e),
            )
        })?;

        match phase {
            TestPhase::Download => Ok(Sample::Download {
                mbps: draw_in(&mut *rng, &self.ranges.download_mbps),
            }),
            TestPhase::Upload => Ok(Sample::Upload {
                mbps: draw_in(&mut *rng, &self.ranges.upload_mbps),
            }),
            TestPhase::Ping => Ok(Sample::Ping {
                ping_ms: draw_in(&mut *rng, &self.ranges.ping_ms),
                idle_latency_ms: draw_in(&mut *rng, &self.ranges.idle_latency_ms),
                ip_type: if rng.gen_bool(0.5) {
                    IpType::IPv4
                } else {
                    IpType::IPv6
                },
            }),
            TestPhase::Idle | TestPhase::Done => Err(inactive_phase(phase)),
        }
    }
}

// gen_range panics on an empty range
fn draw_in<R: Rng>(rng: &mut R, range: &Range<f64>) -> f64 {
    if range.is_empty() {
        range.start
    } else {
        rng.gen_range(range.clone())
    }
}

impl Sampler for RandomSampler {
    async fn sample(&self, phase: TestPhase) -> Result<Sample, SpeedDialError> {
        self.draw(phase)
    }
}
