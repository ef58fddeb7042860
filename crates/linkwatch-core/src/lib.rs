//! Signal acquisition and classification pipeline for `linkwatch`.
//!
//! Polls a wireless device's status page and reduces it to a display state:
//!
//! - **[`FieldExtractor`]** applies a named-capture pattern line by line and
//!   returns the captures of the first matching line.
//!
//! - **[`metrics`]** derives `Q` (from `Q10`) and `SN` (`signal - noise`)
//!   when their inputs parse as integers.
//!
//! - **[`BandTable`]**: ordered `threshold:name` table, compiled once from a
//!   spec string with presentation resources resolved per band.
//!
//! - **[`ProbeSource`]**: where probe results come from: [`LiveProbe`] over
//!   HTTP, or [`ReplayProbe`] cycling through fixed samples.
//!
//! - **[`StatusResolver`]**: probe -> derive -> classify -> format, producing a
//!   complete [`DisplayState`] per tick.
//!
//! - **[`Monitor`]**: periodic timer plus manual refresh, serialized so that
//!   no two probes overlap, publishing states through a `watch` channel.

pub mod band;
pub mod config;
pub mod error;
pub mod extract;
pub mod fields;
pub mod metrics;
pub mod monitor;
pub mod probe;
pub mod replay;
pub mod resolver;
pub mod resources;
pub mod template;

// ── Primary re-exports ──────────────────────────────────────────────
pub use band::{Band, BandSpec, BandSpecEntry, BandTable, ERROR_BAND, NO_CONNECTION_BAND};
pub use config::{DeviceConfig, ErrorMessages};
pub use error::{ClassificationError, CoreError, ExtractionError};
pub use extract::FieldExtractor;
pub use fields::{FieldValue, Fields};
pub use monitor::Monitor;
pub use probe::{FetchError, FetchErrorKind, LiveProbe, ProbeResult, ProbeSource};
pub use replay::{ReplayProbe, ReplaySample};
pub use resolver::{DisplayState, StatusResolver};
pub use resources::{FsResources, NoResources, Presentation, ResourceLocator};
pub use template::Template;
