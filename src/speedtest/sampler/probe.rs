//! Latency-derived readouts from a round trip to a speed-test server.

use std::time::Duration;

use log::debug;
use url::Url;

use super::{inactive_phase, Sampler};
use crate::directory::requests::probe::ProbeRequest;
use crate::directory::requests::servers::{ServersRequest, DEFAULT_DIRECTORY_URL};
use crate::directory::{Client, Timing};
use crate::errors::SpeedDialError;
use crate::measurements::{IpType, LatencyEstimate, Sample};
use crate::speedtest::phase::TestPhase;

/// Where and how to probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// Server directory endpoint returning a JSON list of servers
    pub directory_url: Url,
    /// Request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl ProbeConfig {
    pub fn new(directory_url: &str) -> Result<Self, SpeedDialError> {
        Ok(Self { directory_url: Url::parse(directory_url)?, timeout: None })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            directory_url: Url::parse(DEFAULT_DIRECTORY_URL)
                .expect("default directory URL is valid"),
            timeout: None,
        }
    }
}

/// Estimates every readout from the time one HTTP round trip takes.
///
/// Each sample fetches the server directory, picks the first server and
/// times a request to its upload endpoint. Only that second request is
/// timed.
#[derive(Debug)]
pub struct LatencyProbeSampler {
    client: Client,
    servers: ServersRequest,
}

impl LatencyProbeSampler {
    pub fn new(config: ProbeConfig) -> Result<Self, SpeedDialError> {
        Ok(Self {
            client: Client::new(config.timeout)?,
            servers: ServersRequest::new(config.directory_url),
        })
    }

    async fn probe(&self) -> Result<Timing, SpeedDialError> {
        let servers = self.client.send(&self.servers).await?;
        let server = servers.first().ok_or_else(|| {
            SpeedDialError::api("server directory returned no servers")
        })?;

        debug!(
            "Probing {} at {} ({} candidates)",
            server.label(),
            server.host,
            servers.len()
        );

        self.client.time(ProbeRequest::new(server.host.as_str())).await
    }
}

impl Sampler for LatencyProbeSampler {
    async fn sample(&self, phase: TestPhase) -> Result<Sample, SpeedDialError> {
        if !phase.is_active() {
            return Err(inactive_phase(phase));
        }

        let timing = self.probe().await?;
        let ip_type =
            timing.remote_addr.map(|addr| IpType::from(addr.ip())).unwrap_or_default();

        LatencyEstimate::from_latency(timing.elapsed, ip_type)
            .sample_for(phase)
            .ok_or_else(|| inactive_phase(phase))
    }
}
