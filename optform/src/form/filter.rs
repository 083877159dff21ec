use std::sync::LazyLock;

use regex::Regex;

/// Digits with at most one decimal point. Empty means "not set".
pub const FLOAT_PATTERN: &str = r"\A[0-9]*\.?[0-9]*\z";
/// Digits only. Empty means "not set".
pub const INT_PATTERN: &str = r"\A[0-9]*\z";

static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(FLOAT_PATTERN).unwrap());
static INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(INT_PATTERN).unwrap());

/// Result of running one content change through the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The text matched and is now the last good value.
    Accepted,
    /// The text was rejected; the control must show this value instead.
    Reverted(String),
}

/// Live guard for a single-line text input.
///
/// Every content change is matched in full against the pattern. A match
/// becomes the last good value, anything else is replaced by it. Rejected
/// edits are never reported as errors.
#[derive(Debug, Clone)]
pub struct ConstrainedInputFilter {
    pattern: Regex,
    last_good: String,
}

impl ConstrainedInputFilter {
    pub fn new(pattern: Regex) -> Self {
        Self {
            pattern,
            last_good: String::new(),
        }
    }

    /// Filter for `float` options.
    pub fn float() -> Self {
        Self::new(FLOAT_RE.clone())
    }

    /// Filter for `int` options.
    pub fn int() -> Self {
        Self::new(INT_RE.clone())
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn last_good(&self) -> &str {
        &self.last_good
    }

    /// Check the full current text of the control.
    pub fn check(&mut self, text: &str) -> FilterOutcome {
        if self.pattern.is_match(text) {
            self.last_good = text.to_string();
            FilterOutcome::Accepted
        } else {
            trace!("reverted {text:?} to {:?}", self.last_good);
            FilterOutcome::Reverted(self.last_good.clone())
        }
    }
}
