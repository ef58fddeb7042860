use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `linkwatch-api` crate.
///
/// Every failure of a single page fetch lands in exactly one variant.
/// `linkwatch-core` folds these into its uniform fetch-error shape.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Request did not complete within the configured timeout.
    #[error("Request timed out after {}ms", timeout.as_millis())]
    Timeout { timeout: Duration },

    /// DNS failure, connection refused, host unreachable.
    #[error("Cannot connect to {url}: {message}")]
    Connect {
        url: String,
        /// OS error code, when the failure came from a socket call.
        errno: Option<i32>,
        message: String,
    },

    /// Any other reqwest failure (body decode, redirect loop, ...).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// Device answered with a non-2xx status.
    #[error("HTTP {status} {reason}")]
    Http { status: u16, reason: String },
}

impl Error {
    /// Translate a reqwest error into the matching variant.
    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            return Self::Timeout { timeout };
        }
        if err.is_connect() {
            let (errno, message) = match io_source(&err) {
                Some(io_err) => (io_err.raw_os_error(), strip_os_suffix(&io_err.to_string())),
                None => (None, innermost_message(&err)),
            };
            return Self::Connect {
                url: url.to_owned(),
                errno,
                message,
            };
        }
        Self::Transport(err)
    }

    /// Returns `true` if the request exceeded its time budget.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if no connection could be established.
    pub fn is_connect(&self) -> bool {
        match self {
            Self::Connect { .. } => true,
            Self::Transport(e) => e.is_connect(),
            _ => false,
        }
    }

    /// OS error code or HTTP status, whichever this error carries.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Connect { errno, .. } => *errno,
            Self::Http { status, .. } => Some(i32::from(*status)),
            _ => None,
        }
    }
}

/// Walk the source chain looking for the underlying socket error.
fn io_source<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a io::Error> {
    let mut current = err.source();
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        current = source.source();
    }
    None
}

fn innermost_message(err: &(dyn StdError + 'static)) -> String {
    let mut current: &(dyn StdError + 'static) = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

/// `"Connection refused (os error 111)"` -> `"Connection refused"`
fn strip_os_suffix(message: &str) -> String {
    match message.rfind(" (os error") {
        Some(idx) => message[..idx].to_owned(),
        None => message.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_os_error_suffix() {
        assert_eq!(
            strip_os_suffix("Connection refused (os error 111)"),
            "Connection refused"
        );
        assert_eq!(strip_os_suffix("dns error"), "dns error");
    }

    #[test]
    fn http_errno_is_status_code() {
        let err = Error::Http {
            status: 503,
            reason: "Service Unavailable".into(),
        };
        assert_eq!(err.errno(), Some(503));
        assert!(!err.is_timeout());
        assert!(!err.is_connect());
    }

    #[test]
    fn timeout_reports_sub_second_budget() {
        let err = Error::Timeout {
            timeout: Duration::from_millis(200),
        };
        assert_eq!(err.to_string(), "Request timed out after 200ms");
        assert!(err.is_timeout());
        assert_eq!(err.errno(), None);
    }

    #[test]
    fn io_source_finds_nested_io_error() {
        #[derive(Debug, Error)]
        #[error("outer")]
        struct Outer(#[source] io::Error);

        let outer = Outer(io::Error::from_raw_os_error(111));
        assert_eq!(
            io_source(&outer).and_then(io::Error::raw_os_error),
            Some(111)
        );
    }
}
