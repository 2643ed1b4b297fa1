//! Filter pipeline turning fetched text into a version.
//!
//! A pipeline runs in two phases. All [`FilterStep::Require`] gates are
//! checked against the raw input first, then the remaining steps transform
//! the text in declared order. Running a pipeline has no side effects, so the
//! same input always yields the same output or the same error.

use regex::Regex;

use relwatch_config::{LatestVersionConfig, UrlCommandConfig};

use crate::error::FilterError;

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;

/// One step of a [`FilterPipeline`].
#[derive(Debug, Clone)]
pub enum FilterStep {
    /// Take capture `group` of match number `index`.
    RegexExtract {
        regex: Regex,
        group: usize,
        index: i64,
    },
    /// Replace every match.
    RegexReplace { regex: Regex, replacement: String },
    /// Split on a literal separator and keep piece `index`.
    Split { separator: String, index: i64 },
    /// Gate on the raw input: `regex` must match, or must not when `negate`.
    Require { regex: Regex, negate: bool },
}

impl FilterStep {
    /// Regex extraction of `group`, or of the first group when `None`
    /// (the whole match when the pattern has no groups).
    pub fn regex_extract(pattern: &str, group: Option<usize>, index: i64) -> Result<Self, FilterError> {
        let regex = compile(pattern)?;
        let groups = regex.captures_len();
        let group = group.unwrap_or(if groups > 1 { 1 } else { 0 });
        if group >= groups {
            return Err(FilterError::InvalidRegex {
                regex: pattern.to_string(),
                message: format!("no capture group {group}"),
            });
        }
        Ok(FilterStep::RegexExtract { regex, group, index })
    }

    pub fn regex_replace(pattern: &str, replacement: impl Into<String>) -> Result<Self, FilterError> {
        Ok(FilterStep::RegexReplace {
            regex: compile(pattern)?,
            replacement: replacement.into(),
        })
    }

    pub fn split(separator: impl Into<String>, index: i64) -> Self {
        FilterStep::Split {
            separator: separator.into(),
            index,
        }
    }

    pub fn require(pattern: &str, negate: bool) -> Result<Self, FilterError> {
        Ok(FilterStep::Require {
            regex: compile(pattern)?,
            negate,
        })
    }

    fn is_gate(&self) -> bool {
        matches!(self, FilterStep::Require { .. })
    }

    fn check(&self, raw: &str) -> Result<(), FilterError> {
        if let FilterStep::Require { regex, negate } = self {
            if regex.is_match(raw) == *negate {
                return Err(FilterError::GateFailed {
                    regex: regex.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    fn apply(&self, text: String) -> Result<String, FilterError> {
        match self {
            FilterStep::RegexExtract { regex, group, index } => {
                let matches: Vec<_> = regex.captures_iter(&text).collect();
                if matches.is_empty() {
                    return Err(FilterError::NoMatch {
                        regex: regex.as_str().to_string(),
                    });
                }
                let captures = pick(&matches, *index)?;
                Ok(captures
                    .get(*group)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default())
            }
            FilterStep::RegexReplace { regex, replacement } => {
                Ok(regex.replace_all(&text, replacement.as_str()).into_owned())
            }
            FilterStep::Split { separator, index } => {
                let pieces: Vec<&str> = text.split(separator.as_str()).collect();
                pick(&pieces, *index).map(|piece| piece.to_string())
            }
            FilterStep::Require { .. } => Ok(text),
        }
    }
}

impl TryFrom<&UrlCommandConfig> for FilterStep {
    type Error = FilterError;

    fn try_from(command: &UrlCommandConfig) -> Result<Self, Self::Error> {
        match command {
            UrlCommandConfig::Regex { regex, group, index } => {
                FilterStep::regex_extract(regex, *group, *index)
            }
            UrlCommandConfig::Replace { regex, new } => FilterStep::regex_replace(regex, new.as_str()),
            UrlCommandConfig::Split { text, index } => Ok(FilterStep::split(text.as_str(), *index)),
            UrlCommandConfig::Require { regex, negate } => FilterStep::require(regex, *negate),
        }
    }
}

/// Ordered filter steps.
#[derive(Debug, Clone, Default)]
pub struct FilterPipeline {
    steps: Vec<FilterStep>,
}

impl FilterPipeline {
    pub fn new(steps: Vec<FilterStep>) -> Self {
        Self { steps }
    }

    /// Compile the `url_commands` of a lookup. A `require.regex_content`
    /// becomes a leading gate.
    pub fn from_config(config: &LatestVersionConfig) -> Result<Self, FilterError> {
        let mut steps = Vec::with_capacity(config.url_commands.len() + 1);
        if let Some(content) = config.require.as_ref().and_then(|r| r.regex_content.as_deref()) {
            steps.push(FilterStep::require(content, false)?);
        }
        for command in &config.url_commands {
            steps.push(FilterStep::try_from(command)?);
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[FilterStep] {
        &self.steps
    }

    /// Run the pipeline on `raw`. Surrounding whitespace of the result is
    /// trimmed and an empty result is an error.
    pub fn run(&self, raw: &str) -> Result<String, FilterError> {
        for gate in self.steps.iter().filter(|s| s.is_gate()) {
            gate.check(raw)?;
        }

        let mut text = raw.to_string();
        for step in self.steps.iter().filter(|s| !s.is_gate()) {
            text = step.apply(text)?;
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(FilterError::Empty);
        }
        Ok(text.to_string())
    }
}

/// Element `index` of `items`, negative counting from the end.
fn pick<T>(items: &[T], index: i64) -> Result<&T, FilterError> {
    let len = items.len();
    let resolved = if index < 0 {
        len.checked_sub(index.unsigned_abs() as usize)
    } else {
        Some(index as usize).filter(|i| *i < len)
    };
    resolved
        .and_then(|i| items.get(i))
        .ok_or(FilterError::IndexOutOfRange { index, len })
}

pub(crate) fn compile(pattern: &str) -> Result<Regex, FilterError> {
    Regex::new(pattern).map_err(|e| FilterError::InvalidRegex {
        regex: pattern.to_string(),
        message: e.to_string(),
    })
}
