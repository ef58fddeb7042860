//! Band table: ordered (threshold, name) pairs mapping a level to a band.
//!
//! Built from a textual spec such as `-2:error, -1:nocon, 0:low, 16:medium, 35:high`,
//! sorted ascending, with presentation resources resolved once per band.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{ClassificationError, CoreError};
use crate::resources::{Presentation, ResourceLocator};

/// Band used when the device cannot be fetched.
pub const ERROR_BAND: &str = "error";
/// Band used when the device answers but reports no association.
pub const NO_CONNECTION_BAND: &str = "nocon";

// ── Spec ─────────────────────────────────────────────────────────────

/// One `threshold:name` pair of a band spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandSpecEntry {
    pub threshold: i64,
    pub name: String,
}

/// Parsed band spec, sorted ascending by threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandSpec {
    entries: Vec<BandSpecEntry>,
}

impl BandSpec {
    pub fn entries(&self) -> &[BandSpecEntry] {
        &self.entries
    }
}

impl FromStr for BandSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = Vec::new();
        for raw in s.trim().split(',') {
            entries.push(parse_entry(raw)?);
        }
        entries.sort_by_key(|e| e.threshold);

        for pair in entries.windows(2) {
            if let [a, b] = pair {
                if a.threshold == b.threshold {
                    return Err(CoreError::MalformedBandSpec {
                        entry: format!("{}:{}", b.threshold, b.name),
                        reason: format!("threshold {} is used by '{}' too", a.threshold, a.name),
                    });
                }
            }
        }
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.name == entry.name) {
                return Err(CoreError::MalformedBandSpec {
                    entry: format!("{}:{}", entry.threshold, entry.name),
                    reason: "band name appears more than once".into(),
                });
            }
        }

        Ok(Self { entries })
    }
}

fn parse_entry(raw: &str) -> Result<BandSpecEntry, CoreError> {
    let malformed = |reason: &str| CoreError::MalformedBandSpec {
        entry: raw.trim().to_owned(),
        reason: reason.to_owned(),
    };

    let (level, name) = raw
        .split_once(':')
        .ok_or_else(|| malformed("expected 'threshold:name'"))?;
    let (level, name) = (level.trim(), name.trim());

    let threshold = level
        .parse::<i64>()
        .map_err(|_| malformed("threshold is not an integer"))?;
    if name.is_empty() {
        return Err(malformed("band name is empty"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(malformed("band name must be alphanumeric"));
    }

    Ok(BandSpecEntry {
        threshold,
        name: name.to_owned(),
    })
}

impl fmt::Display for BandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}", entry.threshold, entry.name)?;
        }
        Ok(())
    }
}

// ── Compiled table ───────────────────────────────────────────────────

/// A band with its resolved presentation handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Band {
    pub threshold: i64,
    pub name: String,
    pub presentation: Presentation,
}

/// Compiled band table. Never empty; sorted ascending by threshold.
#[derive(Debug, Clone)]
pub struct BandTable {
    bands: Vec<Band>,
}

impl BandTable {
    /// Compile a spec, resolving presentation resources per band.
    pub fn compile(spec: &BandSpec, resources: &impl ResourceLocator) -> Result<Self, CoreError> {
        if spec.entries.is_empty() {
            return Err(CoreError::Classification(ClassificationError::EmptyTable));
        }
        let bands = spec
            .entries
            .iter()
            .map(|e| Band {
                threshold: e.threshold,
                name: e.name.clone(),
                presentation: resources.presentation(&e.name),
            })
            .collect();
        Ok(Self { bands })
    }

    /// Fail unless a band called `name` exists.
    pub fn require(&self, name: &str) -> Result<(), CoreError> {
        self.by_name(name)
            .map(|_| ())
            .map_err(|_| CoreError::MissingBand { name: name.into() })
    }

    /// Highest band whose threshold is `<= level`.
    pub fn classify(&self, level: i64) -> Result<&Band, ClassificationError> {
        let floor = self
            .bands
            .first()
            .ok_or(ClassificationError::EmptyTable)?
            .threshold;

        let mut found = None;
        for band in &self.bands {
            if band.threshold > level {
                break;
            }
            found = Some(band);
        }
        found.ok_or(ClassificationError::BelowRange { level, floor })
    }

    /// Band with exactly this name.
    pub fn by_name(&self, name: &str) -> Result<&Band, ClassificationError> {
        self.bands
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| ClassificationError::UnknownName { name: name.into() })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Band> {
        self.bands.iter()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Spec equivalent to this table (sorted form).
    pub fn to_spec(&self) -> BandSpec {
        BandSpec {
            entries: self
                .bands
                .iter()
                .map(|b| BandSpecEntry {
                    threshold: b.threshold,
                    name: b.name.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::NoResources;

    const SPEC: &str = "-2:error, -1:nocon, 0:low, 16:medium, 35:high";
    const SAMPLE_LEVELS: [i64; 7] = [-1, 0, 15, 16, 34, 35, 1000];

    fn table(spec: &str) -> BandTable {
        BandTable::compile(&spec.parse().unwrap(), &NoResources).unwrap()
    }

    fn name_for(table: &BandTable, level: i64) -> &str {
        &table.classify(level).unwrap().name
    }

    #[test]
    fn classifies_reference_levels() {
        let t = table(SPEC);
        assert_eq!(name_for(&t, 0), "low");
        assert_eq!(name_for(&t, 15), "low");
        assert_eq!(name_for(&t, 16), "medium");
        assert_eq!(name_for(&t, 34), "medium");
        assert_eq!(name_for(&t, 35), "high");
        assert_eq!(name_for(&t, -1), "nocon");
        assert_eq!(name_for(&t, -2), "error");
    }

    #[test]
    fn below_lowest_threshold_fails() {
        let t = table(SPEC);
        assert_eq!(
            t.classify(-3),
            Err(ClassificationError::BelowRange { level: -3, floor: -2 })
        );
    }

    #[test]
    fn classification_is_monotone() {
        let t = table(SPEC);
        let mut previous = i64::MIN;
        for level in -2..=200 {
            let threshold = t.classify(level).unwrap().threshold;
            assert!(threshold >= previous, "level {level} went down to {threshold}");
            previous = threshold;
        }
    }

    #[test]
    fn lookup_by_name() {
        let t = table(SPEC);
        assert_eq!(t.by_name("nocon").unwrap().threshold, -1);
        assert_eq!(
            t.by_name("missing"),
            Err(ClassificationError::UnknownName {
                name: "missing".into()
            })
        );
        assert!(t.require("error").is_ok());
        assert!(matches!(
            t.require("offline"),
            Err(CoreError::MissingBand { .. })
        ));
    }

    #[test]
    fn unsorted_spec_is_sorted_and_round_trips() {
        let shuffled: BandSpec = " 35:high,0:low , -1:nocon,16:medium,-2:error "
            .parse()
            .unwrap();
        assert_eq!(shuffled.to_string(), SPEC);

        let first = BandTable::compile(&shuffled, &NoResources).unwrap();
        let reparsed: BandSpec = first.to_spec().to_string().parse().unwrap();
        let second = BandTable::compile(&reparsed, &NoResources).unwrap();

        for level in SAMPLE_LEVELS {
            assert_eq!(name_for(&first, level), name_for(&second, level));
        }
        assert!(second.classify(-3).is_err());
    }

    #[test]
    fn malformed_specs_are_rejected() {
        for bad in [
            "",
            "low",
            "x:low",
            "0:",
            "0:low,",
            "0:low, 0:medium",
            "0:low, 5:low",
            "0:lo w",
        ] {
            assert!(
                matches!(
                    bad.parse::<BandSpec>(),
                    Err(CoreError::MalformedBandSpec { .. })
                ),
                "spec {bad:?} should be rejected"
            );
        }
    }
}
