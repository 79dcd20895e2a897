//! The test-phase state machine and everything that drives it.

pub mod config;
pub mod controller;
pub mod phase;
pub mod run;
pub mod sampler;
pub mod ticker;

pub use config::ControllerConfig;
pub use controller::TestPhaseController;
pub use phase::{Pacing, TestPhase};
pub use run::{RunSnapshot, RunState};
pub use sampler::{
    AnySampler, LatencyProbeSampler, ProbeConfig, RandomSampler, SampleRanges,
    Sampler,
};
