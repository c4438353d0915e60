//! Blocking HTTP client shared by the remote backends
//!
//! Applies the configured connect/read timeouts to every request and maps
//! response status to the backend contract:
//! - 2xx: parsed body
//! - 404: absent
//! - anything else: hard failure

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde_json::Value as JsonValue;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::errors::{Result, TytoError};

/// How a response status is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    NotFound,
    Failure,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            404 => StatusClass::NotFound,
            _ => StatusClass::Failure,
        }
    }
}

/// HTTP client with lazily built connection pool
#[derive(Debug)]
pub struct HttpClient {
    config: ClientConfig,
    client: OnceCell<Client>,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            config: config.clone(),
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| {
            let mut builder = Client::builder()
                .connect_timeout(Duration::from_secs(self.config.connect_timeout_secs))
                .timeout(Duration::from_secs(self.config.timeout_secs))
                .user_agent(self.config.user_agent.clone());
            if !self.config.use_system_proxy {
                builder = builder.no_proxy();
            }
            builder.build().map_err(TytoError::from)
        })
    }

    /// GET returning the body text, or `None` on 404
    pub fn get_text(&self, url: &str, query: &[(&str, &str)], accept: &str) -> Result<Option<String>> {
        let response = self
            .client()?
            .get(url)
            .query(query)
            .header(ACCEPT, accept)
            .send()?;

        let status = response.status();
        tracing::trace!(url, status = status.as_u16(), "HTTP response");

        match StatusClass::of(status.as_u16()) {
            StatusClass::Success => Ok(Some(response.text()?)),
            StatusClass::NotFound => Ok(None),
            StatusClass::Failure => Err(TytoError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    /// GET returning parsed JSON, or `None` on 404
    pub fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Option<JsonValue>> {
        match self.get_text(url, query, "application/json")? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }
}

/// Append percent-encoded path segments to a base URL
///
/// A bad base fails the request, not the dispatch: the error is a
/// transient `Query` failure so the next backend is still tried.
pub fn join_segments(base: &str, segments: &[&str]) -> Result<String> {
    let mut url = Url::parse(base)
        .map_err(|e| TytoError::Query(format!("Invalid base URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| TytoError::Query(format!("URL cannot take path segments: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.to_string())
}
