//! Result of one grammar check.

use serde::Serialize;
use std::fmt;

/// Score on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct GrammarScore(f64);

impl GrammarScore {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    /// Accept `value` unchanged if it lies inside `[0, 100]`.
    ///
    /// Returns `None` for out-of-range or non-finite input.
    pub fn new(value: f64) -> Option<Self> {
        Self::in_range(value).then(|| Self(normalize_zero(value)))
    }

    /// Like [`GrammarScore::new`], then rounded to one decimal place.
    ///
    /// The range is checked before rounding, so 100.04 is rejected.
    pub fn rounded(value: f64) -> Option<Self> {
        Self::in_range(value).then(|| Self(normalize_zero((value * 10.0).round() / 10.0)))
    }

    fn in_range(value: f64) -> bool {
        value.is_finite() && (Self::MIN..=Self::MAX).contains(&value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_perfect(&self) -> bool {
        self.0 >= Self::MAX
    }
}

// -0.0 would render as "-0".
fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

impl fmt::Display for GrammarScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f64's Display already drops a trailing ".0" (92.0 -> "92").
        write!(f, "{}", self.0)
    }
}

/// Score, suggested changes and the reason behind each change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrammarCheckResult {
    pub score: GrammarScore,
    pub changes: Vec<String>,
    pub reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_display() {
        assert_eq!(GrammarScore::new(92.0).unwrap().to_string(), "92");
        assert_eq!(GrammarScore::new(87.5).unwrap().to_string(), "87.5");
        assert_eq!(GrammarScore::new(0.0).unwrap().to_string(), "0");
        assert_eq!(GrammarScore::new(-0.0).unwrap().to_string(), "0");
    }

    #[test]
    fn test_score_keeps_precision() {
        assert_eq!(GrammarScore::new(33.33).unwrap().to_string(), "33.33");
    }

    #[test]
    fn test_rounded_score() {
        assert_eq!(GrammarScore::rounded(85.56).unwrap().value(), 85.6);
        assert_eq!(GrammarScore::rounded(99.94).unwrap().value(), 99.9);
        assert_eq!(GrammarScore::rounded(0.04).unwrap().to_string(), "0");
    }

    #[test]
    fn test_range_checked_before_rounding() {
        assert!(GrammarScore::rounded(100.04).is_none());
        assert!(GrammarScore::rounded(-0.04).is_none());
        assert!(GrammarScore::new(100.04).is_none());
        assert!(GrammarScore::new(-0.04).is_none());
    }

    #[test]
    fn test_score_range() {
        assert!(GrammarScore::new(-0.5).is_none());
        assert!(GrammarScore::new(100.5).is_none());
        assert!(GrammarScore::new(f64::NAN).is_none());
        assert!(GrammarScore::new(100.0).unwrap().is_perfect());
        assert!(!GrammarScore::new(99.9).unwrap().is_perfect());
    }
}
