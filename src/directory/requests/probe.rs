use crate::directory::requests::Request;
use crate::errors::SpeedDialError;
use serde::de::IgnoredAny;
use url::Url;

const PROBE_PATH: &str = "/speedtest/upload.php";

/// A request whose only purpose is to be timed.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    host: String,
}

impl ProbeRequest {
    /// Probe `host`, which may carry a port (`example.net:8080`).
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl Request for ProbeRequest {
    type Response = IgnoredAny;

    fn url(&self) -> Result<Url, SpeedDialError> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(SpeedDialError::api("server directory entry has an empty host"));
        }

        let url = Url::parse(&format!("https://{}{}", host, PROBE_PATH))
            .map_err(|e| {
                SpeedDialError::api(format!("invalid probe host {:?}: {}", host, e))
            })?;

        Ok(url)
    }
}
