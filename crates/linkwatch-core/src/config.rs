// ── Runtime device configuration ──
//
// These types describe *what* to poll and *how* to present it. They are
// fully parsed (URL, pattern, templates, band spec) but never touch disk.
// `linkwatch-config` builds a `DeviceConfig` from settings files and hands
// it in.

use std::time::Duration;

use url::Url;

use crate::band::BandSpec;
use crate::error::CoreError;
use crate::extract::FieldExtractor;
use crate::template::Template;

/// dd-wrt r41328 `setWirelessTable(...)` line on the Info page.
pub const DEFAULT_PATTERN: &str = concat!(
    r"setWirelessTable\('(?P<MAC>.+)',",
    r"'(?P<rname>.*)','(?P<if>.+)','(?P<uptime>.+)','(?P<TXrate>.+)','(?P<RXrate>.+)',",
    r"'(?P<info>.+)','(?P<signal>.+)','(?P<noise>.+)','(?P<SNR>\d+)','(?P<Q10>\d+)'\);",
);
pub const DEFAULT_URL: &str = "http://192.168.1.1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_CLASSIFICATION_KEY: &str = "Q";
pub const DEFAULT_BANDS: &str = "-2:error, -1:nocon, 0:low, 16:medium, 35:high";
pub const DEFAULT_TOOLTIP: &str = "SNR: {SNR} / Q: {Q}%";
pub const DEFAULT_TOOLTIP_ERROR: &str = "ERR: {desc}";
pub const DEFAULT_NO_WIFI: &str = "no wifi connection";
pub const DEFAULT_HTTP_ERROR: &str = "http {strerror}";
pub const DEFAULT_URL_ERROR: &str = "url {strerror}";

/// Placeholder available to the error tooltip.
pub const ERROR_DESC_KEY: &str = "desc";
/// Placeholders available to the http/url error messages.
pub const FETCH_ERROR_KEYS: [&str; 2] = ["errno", "strerror"];

/// Human-readable messages for the failure paths.
#[derive(Debug, Clone)]
pub struct ErrorMessages {
    /// Device reachable, but no wireless association reported.
    pub no_wifi: String,
    /// Non-2xx response. Keys: `errno`, `strerror`.
    pub http_error: Template,
    /// Timeout or connection failure. Keys: `errno`, `strerror`.
    pub url_error: Template,
}

/// Configuration for monitoring a single device.
///
/// Read-only once built; shared by every polling cycle.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Status page URL.
    pub url: Url,
    /// Pattern with named capture groups.
    pub extractor: FieldExtractor,
    /// Hard upper bound for one fetch.
    pub timeout: Duration,
    /// Field (raw or derived) that drives banding.
    pub classification_key: String,
    /// Tooltip for a classified level, rendered against the resolved metrics.
    pub tooltip: Template,
    /// Tooltip for failures. Key: `desc`.
    pub tooltip_error: Template,
    pub messages: ErrorMessages,
    /// Band spec, compiled by the resolver.
    pub bands: BandSpec,
    /// Time between scheduled ticks.
    pub update_interval: Duration,
    /// Accept self-signed certificates on https status pages.
    pub accept_invalid_certs: bool,
}

impl DeviceConfig {
    /// Configuration for `url` with every other value at its default.
    pub fn new(url: Url) -> Result<Self, CoreError> {
        Ok(Self {
            url,
            extractor: FieldExtractor::compile(DEFAULT_PATTERN)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            classification_key: DEFAULT_CLASSIFICATION_KEY.into(),
            tooltip: DEFAULT_TOOLTIP.parse()?,
            tooltip_error: DEFAULT_TOOLTIP_ERROR.parse()?,
            messages: ErrorMessages {
                no_wifi: DEFAULT_NO_WIFI.into(),
                http_error: DEFAULT_HTTP_ERROR.parse()?,
                url_error: DEFAULT_URL_ERROR.parse()?,
            },
            bands: DEFAULT_BANDS.parse()?,
            update_interval: Duration::from_secs(DEFAULT_UPDATE_INTERVAL_SECS),
            accept_invalid_certs: true,
        })
    }
}
