//! CLI-side settings resolution: settings file + environment + flags,
//! then translation into the resolver and probe source the commands run.

use std::path::PathBuf;

use linkwatch_config::{Settings, config_dir_of, config_path, load_settings};
use linkwatch_core::{
    DeviceConfig, LiveProbe, ProbeResult, ProbeSource, ReplayProbe, StatusResolver,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Effective settings and the file they were loaded from.
#[derive(Debug)]
pub struct Resolved {
    pub path: PathBuf,
    pub settings: Settings,
}

/// Settings file named by `--config`, or the platform default.
pub fn settings_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load settings and apply command-line overrides.
pub fn resolve_settings(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let path = settings_path(global);
    let mut settings = load_settings(&path).map_err(|e| CliError::config(e, &path))?;

    if let Some(ref url) = global.url {
        settings.url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        settings.timeout = timeout;
    }
    if let Some(interval) = global.interval {
        settings.update_interval = interval;
    }

    Ok(Resolved { path, settings })
}

impl Resolved {
    pub fn device_config(&self) -> Result<DeviceConfig, CliError> {
        self.settings
            .to_device_config()
            .map_err(|e| CliError::config(e, &self.path))
    }

    /// Validate everything and compile the band table.
    pub fn resolver(&self) -> Result<StatusResolver, CliError> {
        let config = self.device_config()?;
        let resources = self.settings.resources(&config_dir_of(&self.path));
        StatusResolver::new(config, &resources).map_err(|e| CliError::config(e, &self.path))
    }
}

// ── Probe source ─────────────────────────────────────────────────────

/// Probe source picked once from the global flags.
#[derive(Debug)]
pub enum Source {
    Live(LiveProbe),
    Replay(ReplayProbe),
}

impl ProbeSource for Source {
    async fn probe(&self) -> ProbeResult {
        match self {
            Self::Live(p) => p.probe().await,
            Self::Replay(p) => p.probe().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Live(p) => p.describe(),
            Self::Replay(p) => p.describe(),
        }
    }
}

pub fn build_source(global: &GlobalOpts, config: &DeviceConfig) -> Result<Source, CliError> {
    if global.demo {
        return Ok(Source::Replay(ReplayProbe::demo()));
    }

    if let Some(ref path) = global.replay {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ReplayFile {
            path: path.display().to_string(),
            source,
        })?;
        let probe = ReplayProbe::from_toml(&text).map_err(|e| CliError::config(e, path))?;
        return Ok(Source::Replay(probe));
    }

    Ok(Source::Live(LiveProbe::new(config)?))
}
