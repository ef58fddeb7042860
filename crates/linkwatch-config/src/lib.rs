//! Settings for linkwatch.
//!
//! One flat TOML table, layered by figment: built-in defaults, then the
//! settings file, then `LINKWATCH_*` environment variables. Only values
//! that differ from the defaults are written back. The binary adds its
//! command-line overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use linkwatch_core::config::{
    DEFAULT_BANDS, DEFAULT_CLASSIFICATION_KEY, DEFAULT_HTTP_ERROR, DEFAULT_NO_WIFI,
    DEFAULT_PATTERN, DEFAULT_TIMEOUT_SECS, DEFAULT_TOOLTIP, DEFAULT_TOOLTIP_ERROR,
    DEFAULT_UPDATE_INTERVAL_SECS, DEFAULT_URL, DEFAULT_URL_ERROR,
};
use linkwatch_core::{CoreError, DeviceConfig, ErrorMessages, FieldExtractor, FsResources};

/// Environment variable prefix, e.g. `LINKWATCH_URL`.
pub const ENV_PREFIX: &str = "LINKWATCH_";

const CONFIG_FILE: &str = "config.toml";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to serialize settings: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("failed to parse settings file: {0}")]
    Deserialization(#[from] toml::de::Error),

    #[error("settings loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Everything a user can configure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Status page of the device.
    pub url: String,

    /// Regular expression with named groups, applied line by line.
    pub pattern: String,

    /// Fetch timeout in seconds.
    pub timeout: u64,

    /// Field whose integer value picks the band.
    pub classification_key: String,

    /// Band table, e.g. `"-2:error, -1:nocon, 0:low"`.
    pub bands: String,

    /// Directory holding `<band>.png`. Relative paths resolve against the
    /// settings file's directory.
    pub icon_dir: PathBuf,

    /// Directory holding `<band>.{ogg,mp3,wav}`.
    pub sound_dir: PathBuf,

    pub tooltip: String,
    pub tooltip_error: String,
    pub no_wifi: String,
    pub http_error: String,
    pub url_error: String,

    /// Seconds between periodic ticks.
    pub update_interval: u64,

    /// Routers usually serve self-signed certificates.
    pub accept_invalid_certs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.into(),
            pattern: DEFAULT_PATTERN.into(),
            timeout: DEFAULT_TIMEOUT_SECS,
            classification_key: DEFAULT_CLASSIFICATION_KEY.into(),
            bands: DEFAULT_BANDS.into(),
            icon_dir: PathBuf::from("icon/128"),
            sound_dir: PathBuf::from("sound"),
            tooltip: DEFAULT_TOOLTIP.into(),
            tooltip_error: DEFAULT_TOOLTIP_ERROR.into(),
            no_wifi: DEFAULT_NO_WIFI.into(),
            http_error: DEFAULT_HTTP_ERROR.into(),
            url_error: DEFAULT_URL_ERROR.into(),
            update_interval: DEFAULT_UPDATE_INTERVAL_SECS,
            accept_invalid_certs: true,
        }
    }
}

impl Settings {
    /// Parse and validate into the runtime configuration.
    ///
    /// Every defect surfaces here, before the first tick.
    pub fn to_device_config(&self) -> Result<DeviceConfig, ConfigError> {
        let url: url::Url = self.url.parse().map_err(|e| ConfigError::Validation {
            field: "url".into(),
            reason: format!("'{}': {e}", self.url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "url".into(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let timeout = positive_secs("timeout", self.timeout)?;
        let update_interval = positive_secs("update_interval", self.update_interval)?;

        if self.classification_key.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "classification_key".into(),
                reason: "must not be empty".into(),
            });
        }

        Ok(DeviceConfig {
            url,
            extractor: FieldExtractor::compile(&self.pattern)?,
            timeout,
            classification_key: self.classification_key.trim().to_owned(),
            tooltip: self.tooltip.parse()?,
            tooltip_error: self.tooltip_error.parse()?,
            messages: ErrorMessages {
                no_wifi: self.no_wifi.clone(),
                http_error: self.http_error.parse()?,
                url_error: self.url_error.parse()?,
            },
            bands: self.bands.parse()?,
            update_interval,
            accept_invalid_certs: self.accept_invalid_certs,
        })
    }

    /// Filesystem resource lookup, with relative directories anchored at
    /// `base` (normally the settings file's directory).
    pub fn resources(&self, base: &Path) -> FsResources {
        FsResources::new(
            resolve_dir(base, &self.icon_dir),
            resolve_dir(base, &self.sound_dir),
        )
    }
}

fn positive_secs(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// `dir` if absolute, otherwise `base/dir`.
pub fn resolve_dir(base: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        base.join(dir)
    }
}

// ── Settings file path ──────────────────────────────────────────────

/// Resolve the settings file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "linkwatch").map_or_else(
        || dirs_fallback().join(CONFIG_FILE),
        |dirs| dirs.config_dir().join(CONFIG_FILE),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("linkwatch");
    p
}

/// Directory used to anchor relative resource paths for `path`.
pub fn config_dir_of(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

// ── Loading ─────────────────────────────────────────────────────────

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

/// Load settings from defaults, the file at `path` (if present), and the
/// environment.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    debug!(path = %path.display(), exists = path.exists(), "loading settings");
    let settings: Settings = figment_for(path).extract()?;
    Ok(settings)
}

/// Load settings from a file only, ignoring the environment.
pub fn read_settings_file(path: &Path) -> Result<Settings, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

// ── Saving ──────────────────────────────────────────────────────────

/// Only the keys of `settings` whose values differ from the defaults.
pub fn non_default_table(settings: &Settings) -> Result<toml::Table, ConfigError> {
    let defaults = toml::Table::try_from(Settings::default())?;
    let mut table = toml::Table::try_from(settings)?;
    table.retain(|key, value| defaults.get(key) != Some(value));
    Ok(table)
}

/// Write `settings` to `path`, keeping only non-default values.
pub fn save_settings(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let table = non_default_table(settings)?;
    let toml_str = toml::to_string_pretty(&table)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), keys = table.len(), "settings saved");
    Ok(())
}
