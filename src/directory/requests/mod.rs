extern crate serde;

pub mod probe;
pub mod servers;

use reqwest::{
    header::{HeaderMap, HeaderValue, USER_AGENT},
    Method,
};
use serde::Deserialize;
use url::Url;

use crate::errors::SpeedDialError;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub trait Request {
    type Response: for<'de> Deserialize<'de>;

    const METHOD: Method = Method::GET;

    fn url(&self) -> Result<Url, SpeedDialError>;

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(agent) =
            HeaderValue::from_str(&format!("{}/{}", NAME, VERSION))
        {
            headers.insert(USER_AGENT, agent);
        }

        headers
    }
}

impl<R: Request> Request for &R {
    type Response = R::Response;

    const METHOD: Method = R::METHOD;

    fn url(&self) -> Result<Url, SpeedDialError> {
        (**self).url()
    }

    fn headers(&self) -> HeaderMap {
        (**self).headers()
    }
}
