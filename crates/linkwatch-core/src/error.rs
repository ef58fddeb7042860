// ── Core error types ──
//
// Fetch failures and "no match" are ordinary probe outcomes and never
// appear here. What remains is configuration defects, which surface
// before the first tick, and classification failures, which mean the
// band table lacks a floor for the level it was handed.

use thiserror::Error;

/// A level could not be mapped onto the band table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("level {level} is below the lowest band threshold {floor}")]
    BelowRange { level: i64, floor: i64 },

    #[error("no band named '{name}'")]
    UnknownName { name: String },

    #[error("band table is empty")]
    EmptyTable,
}

/// The extraction pattern did not occur in any line of the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("pattern matched no line of the response")]
    NoMatch,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration errors ─────────────────────────────────────────
    #[error("Invalid extraction pattern: {reason}")]
    InvalidPattern { reason: String },

    #[error("Malformed template '{template}': {reason}")]
    MalformedTemplate { template: String, reason: String },

    #[error("Template '{template}' references '{{{key}}}', which the pipeline never produces")]
    MissingTemplateKey { template: String, key: String },

    #[error("Malformed band spec entry '{entry}': {reason}")]
    MalformedBandSpec { entry: String, reason: String },

    #[error("Band table has no '{name}' entry")]
    MissingBand { name: String },

    #[error("Classification key '{key}' is neither captured by the pattern nor derived")]
    UnknownClassificationKey { key: String },

    #[error("Invalid replay data: {reason}")]
    InvalidReplay { reason: String },

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] linkwatch_api::Error),

    // ── Runtime errors ───────────────────────────────────────────────
    #[error("Classification failed: {0}")]
    Classification(#[from] ClassificationError),

    #[error("Monitor loop is already running")]
    AlreadyRunning,
}

impl CoreError {
    /// Returns `true` for defects in the supplied configuration.
    ///
    /// An empty band table is a configuration defect; a level below the
    /// table's floor is a runtime failure.
    pub fn is_config(&self) -> bool {
        match self {
            Self::Classification(e) => *e == ClassificationError::EmptyTable,
            Self::AlreadyRunning => false,
            _ => true,
        }
    }
}
