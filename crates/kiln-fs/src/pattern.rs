//! Name filters applied to base names during traversal.

use kiln_error::{ConfigError, ConfigResult};
use regex::{Regex, RegexBuilder};
use std::ffi::OsStr;
use std::fmt;

/// Translate a shell-style wildcard into a case-insensitive matcher.
///
/// Every character except `*` is matched literally; `*` matches any sequence.
/// The match is anchored at the start of the name only, so `readme` also
/// matches `README.TXT`.
pub fn translate(pattern: &str) -> ConfigResult<PatternFilter> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    let compiled = build(&format!("^{}", body), pattern)?;
    Ok(PatternFilter {
        source: pattern.to_string(),
        regex: Some(compiled),
    })
}

fn build(expr: &str, source: &str) -> ConfigResult<Regex> {
    RegexBuilder::new(expr)
        .case_insensitive(true)
        .build()
        .map_err(|err| ConfigError::Pattern {
            pattern: source.to_string(),
            source: err,
        })
}

#[derive(Debug, Clone)]
pub struct PatternFilter {
    source: String,
    // `None` matches every name.
    regex: Option<Regex>,
}

impl PatternFilter {
    /// Regular expression filter. Matches anywhere in the name.
    pub fn regex(expr: &str) -> ConfigResult<Self> {
        Ok(Self {
            source: expr.to_string(),
            regex: Some(build(expr, expr)?),
        })
    }

    pub fn wildcard(pattern: &str) -> ConfigResult<Self> {
        translate(pattern)
    }

    /// Matches every name.
    pub fn any() -> Self {
        Self {
            source: "*".to_string(),
            regex: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.as_ref().map_or(true, |re| re.is_match(name))
    }

    pub fn matches_name(&self, name: &OsStr) -> bool {
        self.is_match(&name.to_string_lossy())
    }

}

impl fmt::Display for PatternFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
