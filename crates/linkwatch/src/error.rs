//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use linkwatch_config::ConfigError;
use linkwatch_core::{ClassificationError, CoreError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const LINK_DOWN: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Link state ───────────────────────────────────────────────────
    #[error("No usable link ({band}): {tooltip}")]
    #[diagnostic(
        code(linkwatch::link_down),
        help("Check that the device is reachable and associated.\nURL: {url}")
    )]
    LinkDown {
        band: String,
        tooltip: String,
        url: String,
    },

    #[error("Level {level} is below the lowest band threshold {floor}")]
    #[diagnostic(
        code(linkwatch::below_range),
        help("Add a band with a threshold of {level} or lower to `bands`.")
    )]
    BelowRange { level: i64, floor: i64 },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid configuration: {message}")]
    #[diagnostic(
        code(linkwatch::config),
        help("Settings file: {path}\nInspect the effective values with: linkwatch config show")
    )]
    InvalidConfig { message: String, path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(linkwatch::validation))]
    Validation { field: String, reason: String },

    #[error("Cannot read replay file {path}")]
    #[diagnostic(
        code(linkwatch::replay),
        help("Replay files hold [[samples]] tables with kind = \"fields\", \"no_match\" or \"fetch_error\".")
    )]
    ReplayFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(linkwatch::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(linkwatch::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(linkwatch::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LinkDown { .. } => exit_code::LINK_DOWN,
            Self::InvalidConfig { .. } | Self::Validation { .. } | Self::ReplayFile { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the settings file path to configuration errors.
    pub fn config(err: impl Into<CliError>, path: &std::path::Path) -> Self {
        match err.into() {
            Self::InvalidConfig { message, .. } => Self::InvalidConfig {
                message,
                path: path.display().to_string(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Classification(ClassificationError::BelowRange { level, floor }) => {
                Self::BelowRange { level, floor }
            }
            other if other.is_config() => Self::InvalidConfig {
                message: other.to_string(),
                path: String::new(),
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ClassificationError> for CliError {
    fn from(err: ClassificationError) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Core(core) => core.into(),
            ConfigError::Validation { field, reason } => Self::InvalidConfig {
                message: format!("{field}: {reason}"),
                path: String::new(),
            },
            ConfigError::Io(io) => Self::Io(io),
            ConfigError::Serialization(e) => Self::Toml(e),
            other @ (ConfigError::Deserialization(_) | ConfigError::Figment(_)) => {
                Self::InvalidConfig {
                    message: other.to_string(),
                    path: String::new(),
                }
            }
        }
    }
}
