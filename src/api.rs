//! Synchronous client for the **Environment Agency flood-monitoring API**.
//!
//! Every list endpoint answers with an envelope whose `items` member holds the
//! payload. [`Client::get_items`] unwraps it so callers only ever see the
//! records themselves.
//!
//! ### Notes
//! - One request at a time, no retry and no caching: every call is a fresh GET.
//! - Paths may be relative (`id/stations/...`, a leading `/` is ignored) or
//!   absolute (`http(s)://...`, as found in measure catalogs).
//! - The network layer sits behind [`Transport`] so the client can run
//!   headlessly against canned responses.
//!
//! Typical usage:
//! ```no_run
//! # use eaflood_rs::Client;
//! let client: Client = Client::default();
//! client.check_valid_station("E2534")?;
//! let measures = client.get_station_measures("E2534")?;
//! # Ok::<(), eaflood_rs::FloodError>(())
//! ```

use crate::error::{FloodError, Result};
use log::{debug, info};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub const BASE_URL: &str = "https://environment.data.gov.uk/flood-monitoring";

/// Connection settings for [`Client::from_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("eaflood_rs/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

/// Performs one GET and decodes the JSON body.
///
/// Implementations report network failures as [`FloodError::Transport`],
/// non-2xx answers as [`FloodError::HttpStatus`] and undecodable bodies as
/// [`FloodError::MalformedResponse`].
pub trait Transport {
    fn get_json(&self, url: &str) -> Result<Value>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(Policy::limited(5))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(FloodError::ClientBuild)?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<Value> {
        let resp = self.http.get(url).send().map_err(|source| FloodError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FloodError::HttpStatus {
                url: url.to_string(),
                code: status.as_u16(),
            });
        }
        resp.json::<Value>()
            .map_err(|e| FloodError::MalformedResponse {
                url: url.to_string(),
                reason: format!("body is not valid JSON: {e}"),
            })
    }
}

#[derive(Debug, Clone)]
pub struct Client<T = HttpTransport> {
    pub base_url: String,
    transport: T,
}

impl Default for Client {
    fn default() -> Self {
        let config = ClientConfig::default();
        let transport = HttpTransport::new(&config).expect("reqwest client build");
        Self {
            base_url: config.base_url,
            transport,
        }
    }
}

impl Client {
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            transport: HttpTransport::new(config)?,
        })
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Turn an endpoint fragment into the URL that will be requested.
    ///
    /// An empty fragment means the station list. Absolute URLs pass through.
    pub fn resolve_url(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim();
        let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
        let endpoint = if endpoint.is_empty() {
            "id/stations"
        } else {
            endpoint
        };
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
        }
    }

    /// GET `endpoint` and return the `items` collection of the envelope.
    ///
    /// A single-resource endpoint whose `items` is an object yields a
    /// one-element collection.
    pub fn get_items(&self, endpoint: &str) -> Result<Vec<Value>> {
        let url = self.resolve_url(endpoint);
        debug!("Requesting endpoint: {url}");
        let body = self.transport.get_json(&url)?;
        let items = match body {
            Value::Object(mut map) => map.remove("items"),
            _ => None,
        };
        let items = match items {
            Some(Value::Array(arr)) => arr,
            Some(obj @ Value::Object(_)) => vec![obj],
            _ => {
                return Err(FloodError::MalformedResponse {
                    url,
                    reason: "missing top-level `items` collection".into(),
                });
            }
        };
        info!("Fetched {} item(s) from {url}", items.len());
        Ok(items)
    }

    /// [`Client::get_items`] decoded into typed records.
    pub fn get_records<D: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<D>> {
        self.get_items(endpoint)?
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| FloodError::MalformedResponse {
                    url: self.resolve_url(endpoint),
                    reason: format!("unexpected record shape: {e}"),
                })
            })
            .collect()
    }
}
