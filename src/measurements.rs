//! Measurement values shown by the gauge and the latency-based estimate.

use serde::Serialize;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use crate::speedtest::phase::TestPhase;

/// Numerator for the download estimate (`DOWNLOAD_FACTOR / latency_ms`).
pub const DOWNLOAD_FACTOR: f64 = 100_000.0;
/// Numerator for the upload estimate (`UPLOAD_FACTOR / latency_ms`).
pub const UPLOAD_FACTOR: f64 = 50_000.0;
/// Idle latency is reported as this fraction of the probe latency.
pub const IDLE_LATENCY_RATIO: f64 = 0.8;
/// Probe latencies below this are treated as this value.
pub const MIN_LATENCY_MS: f64 = 1.0;

/// Address family of the connection used for the ping phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum IpType {
    #[serde(rename = "IPv4")]
    IPv4,
    #[serde(rename = "IPv6")]
    IPv6,
    #[default]
    Unknown,
}

impl From<IpAddr> for IpType {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => IpType::IPv4,
            IpAddr::V6(v6) if v6.to_ipv4_mapped().is_some() => IpType::IPv4,
            IpAddr::V6(_) => IpType::IPv6,
        }
    }
}

impl fmt::Display for IpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IpType::IPv4 => "IPv4",
            IpType::IPv6 => "IPv6",
            IpType::Unknown => "N/A",
        })
    }
}

/// The values displayed on the metric tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Measurements {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub ping_ms: f64,
    pub idle_latency_ms: f64,
    pub ip_type: IpType,
}

impl Measurements {
    /// Replace the fields owned by the sample's phase.
    pub fn apply(&mut self, sample: &Sample) {
        match *sample {
            Sample::Download { mbps } => self.download_mbps = mbps,
            Sample::Upload { mbps } => self.upload_mbps = mbps,
            Sample::Ping { ping_ms, idle_latency_ms, ip_type } => {
                self.ping_ms = ping_ms;
                self.idle_latency_ms = idle_latency_ms;
                self.ip_type = ip_type;
            }
        }
    }
}

/// One sampler result, tagged with the phase that owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Download { mbps: f64 },
    Upload { mbps: f64 },
    Ping { ping_ms: f64, idle_latency_ms: f64, ip_type: IpType },
}

impl Sample {
    /// The phase whose fields this sample replaces.
    pub fn phase(&self) -> TestPhase {
        match self {
            Sample::Download { .. } => TestPhase::Download,
            Sample::Upload { .. } => TestPhase::Upload,
            Sample::Ping { .. } => TestPhase::Ping,
        }
    }
}

/// Readouts derived from a single round-trip time.
///
/// This is an approximation for display only: throughput is not measured,
/// it is a fixed constant divided by the round-trip latency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyEstimate {
    pub latency_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub idle_latency_ms: f64,
    pub ip_type: IpType,
}

impl LatencyEstimate {
    pub fn from_latency(latency: Duration, ip_type: IpType) -> Self {
        Self::from_latency_ms(latency.as_secs_f64() * 1000.0, ip_type)
    }

    pub fn from_latency_ms(latency_ms: f64, ip_type: IpType) -> Self {
        let latency_ms = latency_ms.max(MIN_LATENCY_MS);

        Self {
            latency_ms,
            download_mbps: DOWNLOAD_FACTOR / latency_ms,
            upload_mbps: UPLOAD_FACTOR / latency_ms,
            idle_latency_ms: latency_ms * IDLE_LATENCY_RATIO,
            ip_type,
        }
    }

    /// Project the estimate onto the fields owned by `phase`.
    ///
    /// Returns `None` for phases without a live metric.
    pub fn sample_for(&self, phase: TestPhase) -> Option<Sample> {
        match phase {
            TestPhase::Download => {
                Some(Sample::Download { mbps: self.download_mbps })
            }
            TestPhase::Upload => Some(Sample::Upload { mbps: self.upload_mbps }),
            TestPhase::Ping => Some(Sample::Ping {
                ping_ms: self.latency_ms,
                idle_latency_ms: self.idle_latency_ms,
                ip_type: self.ip_type,
            }),
            TestPhase::Idle | TestPhase::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_estimate_from_200ms() {
        let estimate =
            LatencyEstimate::from_latency(Duration::from_millis(200), IpType::IPv4);

        assert_eq!(estimate.download_mbps, 500.0);
        assert_eq!(estimate.upload_mbps, 250.0);
        assert_eq!(estimate.latency_ms, 200.0);
        assert_eq!(estimate.idle_latency_ms, 160.0);
    }

    #[test]
    fn test_estimate_floors_zero_latency() {
        let estimate = LatencyEstimate::from_latency_ms(0.0, IpType::Unknown);

        assert_eq!(estimate.latency_ms, MIN_LATENCY_MS);
        assert!(estimate.download_mbps.is_finite());
        assert_eq!(estimate.download_mbps, DOWNLOAD_FACTOR);
    }

    #[test]
    fn test_sample_for_phase() {
        let estimate = LatencyEstimate::from_latency_ms(100.0, IpType::IPv6);

        assert_eq!(
            estimate.sample_for(TestPhase::Download),
            Some(Sample::Download { mbps: 1000.0 })
        );
        assert_eq!(
            estimate.sample_for(TestPhase::Upload),
            Some(Sample::Upload { mbps: 500.0 })
        );
        assert_eq!(
            estimate.sample_for(TestPhase::Ping),
            Some(Sample::Ping {
                ping_ms: 100.0,
                idle_latency_ms: 80.0,
                ip_type: IpType::IPv6
            })
        );
        assert_eq!(estimate.sample_for(TestPhase::Idle), None);
        assert_eq!(estimate.sample_for(TestPhase::Done), None);
    }

    #[test]
    fn test_apply_replaces_only_owned_fields() {
        let mut measurements = Measurements {
            download_mbps: 1.0,
            upload_mbps: 2.0,
            ping_ms: 3.0,
            idle_latency_ms: 4.0,
            ip_type: IpType::IPv4,
        };

        measurements.apply(&Sample::Upload { mbps: 42.0 });

        assert_eq!(measurements.upload_mbps, 42.0);
        assert_eq!(measurements.download_mbps, 1.0);
        assert_eq!(measurements.ping_ms, 3.0);
        assert_eq!(measurements.idle_latency_ms, 4.0);
        assert_eq!(measurements.ip_type, IpType::IPv4);
    }

    #[test]
    fn test_ip_type_from_addr() {
        assert_eq!(IpType::from(IpAddr::V4(Ipv4Addr::LOCALHOST)), IpType::IPv4);
        assert_eq!(IpType::from(IpAddr::V6(Ipv6Addr::LOCALHOST)), IpType::IPv6);
        assert_eq!(
            IpType::from(IpAddr::V6(Ipv4Addr::new(10, 0, 0, 1).to_ipv6_mapped())),
            IpType::IPv4
        );
    }

    #[test]
    fn test_ip_type_display() {
        assert_eq!(IpType::IPv4.to_string(), "IPv4");
        assert_eq!(IpType::IPv6.to_string(), "IPv6");
        assert_eq!(IpType::Unknown.to_string(), "N/A");
    }

    proptest! {
        /// Property: the estimate is always the fixed factor divided by the
        /// (floored) latency, so download is exactly twice upload.
        #[test]
        fn prop_estimate_ratio(latency_ms in 0.0f64..10_000.0) {
            let estimate = LatencyEstimate::from_latency_ms(latency_ms, IpType::Unknown);
            prop_assert!(estimate.latency_ms >= MIN_LATENCY_MS);
            prop_assert!((estimate.download_mbps - 2.0 * estimate.upload_mbps).abs() < 1e-9);
            prop_assert!(estimate.idle_latency_ms <= estimate.latency_ms);
        }
    }
}
