// ── Status resolver ──
//
// Per-tick pipeline: probe -> derive -> classify -> format. Produces one
// complete `DisplayState` per call. Construction compiles the band table
// and checks every template against the keys the pipeline can produce.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::band::{BandTable, ERROR_BAND, NO_CONNECTION_BAND};
use crate::config::{DeviceConfig, ERROR_DESC_KEY, FETCH_ERROR_KEYS};
use crate::error::{ClassificationError, CoreError};
use crate::fields::Fields;
use crate::metrics;
use crate::probe::{FetchError, FetchErrorKind, ProbeResult, ProbeSource};
use crate::resources::{Presentation, ResourceLocator};
use crate::template::{MISSING_VALUE, Template};

/// What the presentation layer shows after a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayState {
    /// Band name (e.g. `high`, `nocon`, `error`).
    pub band: String,
    pub tooltip: String,
    pub presentation: Presentation,
    /// Classification level, when the tick produced one.
    pub level: Option<i64>,
    pub resolved_at: DateTime<Utc>,
}

/// Turns probe results into display states.
///
/// Cheap to share: configuration and band table are immutable.
#[derive(Debug, Clone)]
pub struct StatusResolver {
    config: Arc<DeviceConfig>,
    bands: Arc<BandTable>,
}

impl StatusResolver {
    /// Compile the band table and validate the configuration.
    pub fn new(config: DeviceConfig, resources: &impl ResourceLocator) -> Result<Self, CoreError> {
        let bands = BandTable::compile(&config.bands, resources)?;
        bands.require(ERROR_BAND)?;
        bands.require(NO_CONNECTION_BAND)?;

        let captured: Vec<&str> = config.extractor.capture_names().collect();
        let mut available: BTreeSet<&str> = captured.iter().copied().collect();
        available.extend(metrics::derivable_keys(captured.iter().copied()));

        if !available.contains(config.classification_key.as_str()) {
            return Err(CoreError::UnknownClassificationKey {
                key: config.classification_key.clone(),
            });
        }
        config.tooltip.validate(available.iter().copied())?;
        config.tooltip_error.validate([ERROR_DESC_KEY])?;
        config.messages.http_error.validate(FETCH_ERROR_KEYS)?;
        config.messages.url_error.validate(FETCH_ERROR_KEYS)?;

        debug!(
            bands = %bands.to_spec(),
            key = %config.classification_key,
            "resolver ready"
        );

        Ok(Self {
            config: Arc::new(config),
            bands: Arc::new(bands),
        })
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn bands(&self) -> &BandTable {
        &self.bands
    }

    /// Probe `source` once and resolve the result.
    pub async fn tick<S>(&self, source: &S) -> Result<DisplayState, ClassificationError>
    where
        S: ProbeSource + ?Sized,
    {
        let result = source.probe().await;
        self.resolve(result)
    }

    /// Map a probe result onto a display state.
    ///
    /// Only a level below the table's floor fails; every fetch or
    /// extraction failure becomes an error-band state.
    pub fn resolve(&self, result: ProbeResult) -> Result<DisplayState, ClassificationError> {
        match result {
            ProbeResult::Success(fields) => self.resolve_fields(fields),
            ProbeResult::NoMatch => self.error_state(NO_CONNECTION_BAND, &self.config.messages.no_wifi),
            ProbeResult::FetchError(err) => {
                let desc = self.describe_fetch_error(&err);
                self.error_state(ERROR_BAND, &desc)
            }
        }
    }

    fn resolve_fields(&self, fields: Fields) -> Result<DisplayState, ClassificationError> {
        let resolved = metrics::derive(fields);
        let key = &self.config.classification_key;

        let Some(level) = resolved.get_int(key) else {
            warn!(key = %key, "classification key missing or not an integer");
            return self.error_state(ERROR_BAND, &format!("no numeric {key} in device response"));
        };

        let band = self.bands.classify(level)?;
        Ok(DisplayState {
            band: band.name.clone(),
            tooltip: self.config.tooltip.render_fields(&resolved),
            presentation: band.presentation.clone(),
            level: Some(level),
            resolved_at: Utc::now(),
        })
    }

    fn error_state(&self, band: &str, desc: &str) -> Result<DisplayState, ClassificationError> {
        let band = self.bands.by_name(band)?;
        let tooltip = self
            .config
            .tooltip_error
            .render(|key| (key == ERROR_DESC_KEY).then(|| desc.to_owned()));
        Ok(DisplayState {
            band: band.name.clone(),
            tooltip,
            presentation: band.presentation.clone(),
            level: None,
            resolved_at: Utc::now(),
        })
    }

    fn describe_fetch_error(&self, err: &FetchError) -> String {
        let template: &Template = match err.kind {
            FetchErrorKind::Protocol => &self.config.messages.http_error,
            FetchErrorKind::Timeout | FetchErrorKind::Connection => {
                &self.config.messages.url_error
            }
        };
        template.render(|key| match key {
            "errno" => Some(
                err.errno
                    .map_or_else(|| MISSING_VALUE.to_owned(), |n| n.to_string()),
            ),
            "strerror" => Some(err.strerror.clone()),
            _ => None,
        })
    }
}
