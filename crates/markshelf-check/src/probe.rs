//! HTTP probing.
//!
//! [`HttpProbe`] is the seam between the checker and the network. The
//! checker only needs a status code or a classified failure per request,
//! which keeps it testable with scripted probes.

use std::time::Duration;

use async_trait::async_trait;
use markshelf_core::{CheckConfig, LinkStatus};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use thiserror::Error;

use crate::error::CheckError;

/// HTTP method used for a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeMethod {
    /// Headers only.
    Head,
    /// Full request; the body is never read.
    Get,
}

/// Why a probe produced no status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    #[error("Timeout")]
    Timeout,

    #[error("Connection Error")]
    Connection,

    #[error("Too Many Redirects")]
    TooManyRedirects,

    #[error("{0}")]
    Other(String),
}

impl From<ProbeFailure> for LinkStatus {
    fn from(failure: ProbeFailure) -> Self {
        match failure {
            ProbeFailure::Timeout => LinkStatus::Timeout,
            ProbeFailure::Connection => LinkStatus::ConnectionError,
            ProbeFailure::TooManyRedirects => LinkStatus::TooManyRedirects,
            ProbeFailure::Other(message) => LinkStatus::Transport(message),
        }
    }
}

/// Issues a single request and reports the final status code.
///
/// Implementations follow redirects themselves; the returned code is the
/// one of the last response in the chain.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn probe(
        &self,
        url: &str,
        method: ProbeMethod,
        timeout: Duration,
    ) -> Result<u16, ProbeFailure>;
}

/// Probe backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: Client,
}

impl ReqwestProbe {
    /// Build a probe from the checker configuration.
    pub fn new(config: &CheckConfig) -> Result<Self, CheckError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert("DNT", HeaderValue::from_static("1"));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(Policy::limited(config.max_redirects))
            .pool_max_idle_per_host(config.concurrency)
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn probe(
        &self,
        url: &str,
        method: ProbeMethod,
        timeout: Duration,
    ) -> Result<u16, ProbeFailure> {
        let method = match method {
            ProbeMethod::Head => Method::HEAD,
            ProbeMethod::Get => Method::GET,
        };

        // Dropping the response closes it without reading the body.
        let response = self
            .client
            .request(method, url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        Ok(response.status().as_u16())
    }
}

fn classify(err: reqwest::Error) -> ProbeFailure {
    if err.is_timeout() {
        ProbeFailure::Timeout
    } else if err.is_redirect() {
        ProbeFailure::TooManyRedirects
    } else if err.is_connect() {
        ProbeFailure::Connection
    } else {
        ProbeFailure::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_to_status() {
        assert_eq!(LinkStatus::from(ProbeFailure::Timeout), LinkStatus::Timeout);
        assert_eq!(
            LinkStatus::from(ProbeFailure::Connection).to_string(),
            "Connection Error"
        );
        assert_eq!(
            LinkStatus::from(ProbeFailure::Other("bad".into())),
            LinkStatus::Transport("bad".into())
        );
    }

    #[test]
    fn test_probe_builds_from_default_config() {
        assert!(ReqwestProbe::new(&CheckConfig::default()).is_ok());
    }
}
