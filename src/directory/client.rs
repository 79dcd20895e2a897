use crate::directory::requests::Request;
use crate::errors::SpeedDialError;
use log::debug;
use reqwest::Client as ReqwestClient;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::Instant;

/// Round-trip timing of a single request.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// Time from sending the request until the response head arrived
    pub elapsed: Duration,
    /// Address the response came from, when the connector reports it
    pub remote_addr: Option<SocketAddr>,
}

#[derive(Debug, Clone)]
pub struct Client {
    client: ReqwestClient,
}

impl Client {
    pub fn new(timeout: Option<Duration>) -> Result<Self, SpeedDialError> {
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Client { client: builder.build()? })
    }

    pub async fn send<R: Request>(
        &self,
        request: R,
    ) -> Result<R::Response, SpeedDialError> {
        let url = request.url()?;

        let response = self
            .client
            .request(R::METHOD, url)
            .headers(request.headers())
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;

        serde_json::from_str::<R::Response>(&text).map_err(|e| {
            SpeedDialError::api(format!("unexpected response body: {}", e))
                .with_source(e)
        })
    }

    /// Send `request` and time it; the response body and status are ignored.
    pub async fn time<R: Request>(
        &self,
        request: R,
    ) -> Result<Timing, SpeedDialError> {
        let url = request.url()?;
        let builder = self
            .client
            .request(R::METHOD, url.clone())
            .headers(request.headers());

        let start = Instant::now();
        let response = builder.send().await?;
        let elapsed = start.elapsed();

        debug!(
            "{} answered {} in {:?}",
            url,
            response.status(),
            elapsed
        );

        Ok(Timing { elapsed, remote_addr: response.remote_addr() })
    }
}
