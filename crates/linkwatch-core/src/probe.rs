// ── Device probe ──
//
// One probe = one fetch attempt + extraction. Failures are folded into
// `ProbeResult` values; nothing here returns an error to the caller.
// Retry cadence belongs to the monitor's timer.

use std::future::Future;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::{debug, warn};

use linkwatch_api::transport::TransportConfig;
use linkwatch_api::StatusClient;

use crate::config::DeviceConfig;
use crate::error::{CoreError, ExtractionError};
use crate::extract::FieldExtractor;
use crate::fields::Fields;

/// Broad class of a fetch failure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FetchErrorKind {
    /// The fetch exceeded the configured timeout.
    Timeout,
    /// DNS failure, connection refused, unreachable host.
    Connection,
    /// Non-2xx response or malformed HTTP exchange.
    Protocol,
}

/// Uniform description of a failed fetch.
///
/// `errno` is the OS error code for connection failures and the HTTP
/// status for protocol failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind} error: {strerror}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub errno: Option<i32>,
    pub strerror: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, errno: Option<i32>, strerror: impl Into<String>) -> Self {
        Self {
            kind,
            errno,
            strerror: strerror.into(),
        }
    }
}

impl From<linkwatch_api::Error> for FetchError {
    fn from(err: linkwatch_api::Error) -> Self {
        use linkwatch_api::Error as ApiError;

        let errno = err.errno();
        match err {
            ApiError::Timeout { .. } => Self::new(FetchErrorKind::Timeout, None, "timed out"),
            ApiError::Connect { message, .. } => {
                Self::new(FetchErrorKind::Connection, errno, message)
            }
            ApiError::Http { status, reason } => {
                let strerror = if reason.is_empty() {
                    format!("status {status}")
                } else {
                    reason
                };
                Self::new(FetchErrorKind::Protocol, errno, strerror)
            }
            ApiError::Transport(e) if e.is_timeout() => {
                Self::new(FetchErrorKind::Timeout, None, "timed out")
            }
            ApiError::Transport(e) if e.is_connect() => {
                Self::new(FetchErrorKind::Connection, None, e.to_string())
            }
            ApiError::Transport(e) => Self::new(FetchErrorKind::Protocol, None, e.to_string()),
            ApiError::Client(message) => Self::new(FetchErrorKind::Connection, None, message),
        }
    }
}

/// Outcome of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// The pattern matched; captured fields.
    Success(Fields),
    /// Device reachable but reports no wireless association.
    NoMatch,
    FetchError(FetchError),
}

impl From<Result<Fields, ExtractionError>> for ProbeResult {
    fn from(res: Result<Fields, ExtractionError>) -> Self {
        match res {
            Ok(fields) => Self::Success(fields),
            Err(ExtractionError::NoMatch) => Self::NoMatch,
        }
    }
}

/// Where probe results come from. Selected once at construction.
pub trait ProbeSource: Send + Sync {
    /// Perform one probe.
    fn probe(&self) -> impl Future<Output = ProbeResult> + Send;

    /// Short description for logs and status output.
    fn describe(&self) -> String;
}

/// Probes the real device over HTTP.
#[derive(Debug, Clone)]
pub struct LiveProbe {
    client: StatusClient,
    extractor: FieldExtractor,
}

impl LiveProbe {
    /// Build a probe from the device configuration.
    pub fn new(config: &DeviceConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            accept_invalid_certs: config.accept_invalid_certs,
        };
        let client = StatusClient::new(config.url.clone(), &transport)?;
        Ok(Self::with_client(client, config.extractor.clone()))
    }

    pub fn with_client(client: StatusClient, extractor: FieldExtractor) -> Self {
        Self { client, extractor }
    }
}

impl ProbeSource for LiveProbe {
    async fn probe(&self) -> ProbeResult {
        match self.client.fetch_lines().await {
            Ok(lines) => {
                let result = ProbeResult::from(self.extractor.extract(&lines));
                if result == ProbeResult::NoMatch {
                    debug!(lines = lines.len(), "pattern matched no line");
                }
                result
            }
            Err(e) => {
                warn!(url = %self.client.url(), error = %e, "status page fetch failed");
                ProbeResult::FetchError(e.into())
            }
        }
    }

    fn describe(&self) -> String {
        self.client.url().to_string()
    }
}
