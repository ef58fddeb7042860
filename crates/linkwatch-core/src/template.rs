//! Tooltip and message templates with `{key}` placeholders.
//!
//! `{{` and `}}` produce literal braces. Placeholders are checked against
//! the keys a pipeline stage can produce when the resolver is built, so a
//! template never references a field that cannot exist.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::fields::Fields;

/// Rendered in place of a value that is absent for this cycle.
pub const MISSING_VALUE: &str = "?";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Key(String),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names, in order of first appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        let mut seen = BTreeSet::new();
        self.segments.iter().filter_map(move |s| match s {
            Segment::Key(k) if seen.insert(k.as_str()) => Some(k.as_str()),
            _ => None,
        })
    }

    /// Fail if a placeholder is not among `available`.
    pub fn validate<'a>(
        &self,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), CoreError> {
        let available: BTreeSet<&str> = available.into_iter().collect();
        match self.placeholders().find(|k| !available.contains(k)) {
            Some(key) => Err(CoreError::MissingTemplateKey {
                template: self.source.clone(),
                key: key.to_owned(),
            }),
            None => Ok(()),
        }
    }

    /// Substitute placeholders via `lookup`; absent values render as [`MISSING_VALUE`].
    pub fn render<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Key(key) => match lookup(key) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(MISSING_VALUE),
                },
            }
        }
        out
    }

    /// Render against a field mapping.
    pub fn render_fields(&self, fields: &Fields) -> String {
        self.render(|key| fields.get(key).map(ToString::to_string))
    }
}

impl FromStr for Template {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| CoreError::MalformedTemplate {
            template: s.to_owned(),
            reason: reason.to_owned(),
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = s.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut key = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') => return Err(malformed("nested '{' in placeholder")),
                            Some(k) => key.push(k),
                            None => return Err(malformed("unclosed '{'")),
                        }
                    }
                    let key = key.trim();
                    if key.is_empty() {
                        return Err(malformed("empty placeholder"));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Key(key.to_owned()));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(malformed("unmatched '}'")),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: s.to_owned(),
            segments,
        })
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
