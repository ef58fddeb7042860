// Status page client
//
// One GET per call, no retries. Callers own the polling cadence.

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// HTTP client bound to a single device status page.
#[derive(Debug, Clone)]
pub struct StatusClient {
    http: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl StatusClient {
    /// Create a client for `url` using the given transport settings.
    pub fn new(url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            url,
            timeout: transport.timeout,
        })
    }

    /// The status page URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the status page and return the decoded body.
    ///
    /// Invalid UTF-8 is replaced rather than rejected: the body is scanned
    /// with a pattern, not parsed.
    pub async fn fetch_page(&self) -> Result<String, Error> {
        debug!("GET {}", self.url);

        let resp = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, self.url.as_str(), self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_owned(),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::from_reqwest(e, self.url.as_str(), self.timeout))?;

        debug!(bytes = bytes.len(), "status page received");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Fetch the status page split into lines.
    pub async fn fetch_lines(&self) -> Result<Vec<String>, Error> {
        let body = self.fetch_page().await?;
        Ok(body.lines().map(str::to_owned).collect())
    }
}
