use crate::directory::requests::Request;
use crate::errors::SpeedDialError;
use serde::Deserialize;
use url::Url;

/// The public speedtest.net server directory.
pub const DEFAULT_DIRECTORY_URL: &str =
    "https://www.speedtest.net/api/js/servers?engine=js&https_functional=true";

#[derive(Deserialize, Debug, Default)]
pub struct ServersResponse(Vec<Server>);

/// One entry of the server directory. Only `host` is required.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Server {
    pub host: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sponsor: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServersRequest {
    directory: Url,
}

impl ServersRequest {
    pub fn new(directory: Url) -> Self {
        Self { directory }
    }
}

impl Request for ServersRequest {
    type Response = ServersResponse;

    fn url(&self) -> Result<Url, SpeedDialError> {
        Ok(self.directory.clone())
    }
}

impl ServersResponse {
    /// The first server in the list, which is the one probed.
    pub fn first(&self) -> Option<&Server> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Server {
    /// Sponsor, name and country for log lines, falling back to the host.
    pub fn label(&self) -> String {
        let place = match (&self.name, &self.country) {
            (Some(name), Some(country)) => Some(format!("{}, {}", name, country)),
            (Some(place), None) | (None, Some(place)) => Some(place.clone()),
            (None, None) => None,
        };

        match (&self.sponsor, place) {
            (Some(sponsor), Some(place)) => format!("{} ({})", sponsor, place),
            (Some(sponsor), None) => sponsor.clone(),
            (None, Some(place)) => place,
            (None, None) => self.host.clone(),
        }
    }
}
