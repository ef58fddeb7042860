//! Replay probe source: cycles through a fixed list of probe results.
//!
//! Used for self-tests and demos without a device on the network. Samples
//! come from [`ReplayProbe::demo`] or from a TOML file:
//!
//! ```toml
//! [[samples]]
//! kind = "fetch_error"
//! error = "timeout"
//! strerror = "connection timeout"
//!
//! [[samples]]
//! kind = "no_match"
//!
//! [[samples]]
//! kind = "fields"
//! fields = { Q10 = "150", SNR = "5", signal = "-95", noise = "-100" }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::probe::{FetchError, FetchErrorKind, ProbeResult, ProbeSource};

/// One entry of a replay file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplaySample {
    Fields {
        fields: IndexMap<String, String>,
    },
    NoMatch,
    FetchError {
        error: FetchErrorKind,
        #[serde(default)]
        errno: Option<i32>,
        strerror: String,
    },
}

impl From<ReplaySample> for ProbeResult {
    fn from(sample: ReplaySample) -> Self {
        match sample {
            ReplaySample::Fields { fields } => Self::Success(fields.into_iter().collect()),
            ReplaySample::NoMatch => Self::NoMatch,
            ReplaySample::FetchError {
                error,
                errno,
                strerror,
            } => Self::FetchError(FetchError::new(error, errno, strerror)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReplayFile {
    samples: Vec<ReplaySample>,
}

/// Round-robin source over a fixed sample list.
#[derive(Debug)]
pub struct ReplayProbe {
    samples: Vec<ProbeResult>,
    next: AtomicUsize,
}

impl ReplayProbe {
    pub fn new(samples: Vec<ProbeResult>) -> Result<Self, CoreError> {
        if samples.is_empty() {
            return Err(CoreError::InvalidReplay {
                reason: "no samples".into(),
            });
        }
        Ok(Self {
            samples,
            next: AtomicUsize::new(0),
        })
    }

    /// Parse a TOML replay file.
    pub fn from_toml(text: &str) -> Result<Self, CoreError> {
        let file: ReplayFile = toml::from_str(text).map_err(|e| CoreError::InvalidReplay {
            reason: e.to_string(),
        })?;
        Self::new(file.samples.into_iter().map(ProbeResult::from).collect())
    }

    /// Built-in self-test sequence: both failure paths, then every band edge.
    pub fn demo() -> Self {
        let level = |q10: &str, snr: &str, signal: &str| {
            ProbeResult::Success(
                [
                    ("Q10", q10),
                    ("SNR", snr),
                    ("signal", signal),
                    ("noise", "-100"),
                ]
                .into_iter()
                .collect(),
            )
        };

        Self {
            samples: vec![
                ProbeResult::FetchError(FetchError::new(
                    FetchErrorKind::Timeout,
                    None,
                    "connection timeout",
                )),
                ProbeResult::NoMatch,
                level("0", "-5", "-105"),
                level("150", "5", "-95"),
                level("160", "15", "-85"),
                level("350", "25", "-75"),
                level("360", "35", "-65"),
                level("1000", "55", "-45"),
            ],
            next: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl ProbeSource for ReplayProbe {
    async fn probe(&self) -> ProbeResult {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.samples.len();
        self.samples
            .get(idx)
            .cloned()
            .unwrap_or(ProbeResult::NoMatch)
    }

    fn describe(&self) -> String {
        format!("replay ({} samples)", self.samples.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cycles_round_robin() {
        let probe = ReplayProbe::new(vec![
            ProbeResult::NoMatch,
            ProbeResult::Success([("Q10", "100")].into_iter().collect()),
        ])
        .unwrap();

        assert_eq!(tokio_test::block_on(probe.probe()), ProbeResult::NoMatch);
        assert!(matches!(tokio_test::block_on(probe.probe()), ProbeResult::Success(_)));
        assert_eq!(tokio_test::block_on(probe.probe()), ProbeResult::NoMatch);
    }

    #[test]
    fn empty_sample_list_is_rejected() {
        assert!(matches!(
            ReplayProbe::new(Vec::new()),
            Err(CoreError::InvalidReplay { .. })
        ));
    }

    #[tokio::test]
    async fn parses_replay_file() {
        let probe = ReplayProbe::from_toml(
            r#"
            [[samples]]
            kind = "fetch_error"
            error = "connection"
            errno = 111
            strerror = "Connection refused"

            [[samples]]
            kind = "no_match"

            [[samples]]
            kind = "fields"
            fields = { Q10 = "453", signal = "-57", noise = "-79" }
            "#,
        )
        .unwrap();

        assert_eq!(probe.len(), 3);
        assert_eq!(
            probe.probe().await,
            ProbeResult::FetchError(FetchError::new(
                FetchErrorKind::Connection,
                Some(111),
                "Connection refused"
            ))
        );
        assert_eq!(probe.probe().await, ProbeResult::NoMatch);
        match probe.probe().await {
            ProbeResult::Success(fields) => assert_eq!(fields.get_int("Q10"), Some(453)),
            other => panic!("expected fields, got {other:?}"),
        }
    }

    #[test]
    fn malformed_replay_file_is_rejected() {
        assert!(matches!(
            ReplayProbe::from_toml("[[samples]]\nkind = \"bogus\"\n"),
            Err(CoreError::InvalidReplay { .. })
        ));
    }

    #[test]
    fn demo_covers_failure_paths_first() {
        let demo = ReplayProbe::demo();
        assert_eq!(demo.len(), 8);
        assert!(matches!(demo.samples[0], ProbeResult::FetchError(_)));
        assert_eq!(demo.samples[1], ProbeResult::NoMatch);
    }
}
