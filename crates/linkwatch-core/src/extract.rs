//! Pattern-based field extraction from an unstructured status page.

use regex::Regex;

use crate::error::{CoreError, ExtractionError};
use crate::fields::Fields;

/// Applies a named-capture pattern line by line.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    pattern: Regex,
}

impl FieldExtractor {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Compile `pattern`, rejecting patterns without named groups.
    pub fn compile(pattern: &str) -> Result<Self, CoreError> {
        let regex = Regex::new(pattern).map_err(|e| CoreError::InvalidPattern {
            reason: e.to_string(),
        })?;
        if regex.capture_names().flatten().next().is_none() {
            return Err(CoreError::InvalidPattern {
                reason: "pattern has no named capture groups".into(),
            });
        }
        Ok(Self::new(regex))
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Names of the pattern's capture groups, in pattern order.
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.pattern.capture_names().flatten()
    }

    /// Return the named captures of the first matching line.
    ///
    /// Scanning stops at the first match. Groups that did not take part
    /// in the match are omitted; groups that matched the empty string are
    /// kept as empty text.
    pub fn extract<I, S>(&self, lines: I) -> Result<Fields, ExtractionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            if let Some(caps) = self.pattern.captures(line.as_ref()) {
                return Ok(self
                    .pattern
                    .capture_names()
                    .flatten()
                    .filter_map(|name| caps.name(name).map(|m| (name, m.as_str())))
                    .collect());
            }
        }
        Err(ExtractionError::NoMatch)
    }
}
