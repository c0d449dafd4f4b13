//! Attachment name matching.

use std::fmt;

use regex::Regex;

use crate::Result;

/// What an attachment's decoded filename is compared against.
///
/// Exactly one mode is active per query. [`MatchTarget::Pattern`] matches
/// anywhere in the name (a search, not an anchored match); write `^...$` to
/// require the whole name.
#[derive(Clone)]
pub enum MatchTarget {
    /// Case-sensitive, byte-for-byte equality.
    Exact(String),
    /// Regular expression search.
    Pattern(Regex),
}

impl MatchTarget {
    /// Matches one literal filename.
    #[must_use]
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    /// Matches filenames containing `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPattern`] if the pattern does not compile.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    /// Builds a target from a name and a regex flag.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPattern`] if `check_regex` is set and
    /// `name` does not compile.
    pub fn from_flag(name: &str, check_regex: bool) -> Result<Self> {
        if check_regex {
            Self::pattern(name)
        } else {
            Ok(Self::exact(name))
        }
    }

    /// Whether `filename` satisfies this target.
    #[must_use]
    pub fn matches(&self, filename: &str) -> bool {
        match self {
            Self::Exact(name) => name == filename,
            Self::Pattern(regex) => regex.is_match(filename),
        }
    }
}

impl fmt::Debug for MatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => f.debug_tuple("Exact").field(name).finish(),
            Self::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
        }
    }
}

impl fmt::Display for MatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => f.write_str(name),
            Self::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_exact_is_case_sensitive() {
        let target = MatchTarget::exact("test1.csv");
        assert!(target.matches("test1.csv"));
        assert!(!target.matches("Test1.csv"));
        assert!(!target.matches("test1.csv "));
        assert!(!target.matches("xtest1.csv"));
    }

    #[test]
    fn test_pattern_requires_digits_after_prefix() {
        let target = MatchTarget::pattern(r"test(\d+)\.csv").unwrap();
        assert!(target.matches("test1.csv"));
        assert!(target.matches("test42.csv"));
        assert!(!target.matches("test_1.csv"));
    }

    #[test]
    fn test_pattern_is_unanchored() {
        let target = MatchTarget::pattern(r"test(\d+)\.csv").unwrap();
        assert!(target.matches("old_test1.csv.bak"));
    }

    #[test]
    fn test_anchored_pattern() {
        let target = MatchTarget::pattern(r"^test(\d+)\.csv$").unwrap();
        assert!(target.matches("test1.csv"));
        assert!(!target.matches("old_test1.csv.bak"));
    }

    #[test]
    fn test_underscore_pattern_rejects_plain_name() {
        let target = MatchTarget::pattern(r"test_(\d+).csv").unwrap();
        assert!(!target.matches("test1.csv"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = MatchTarget::from_flag("test(", true).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidPattern(_)));
    }

    #[test]
    fn test_from_flag_exact_keeps_metacharacters() {
        let target = MatchTarget::from_flag("a.csv", false).unwrap();
        assert!(target.matches("a.csv"));
        assert!(!target.matches("abcsv"));
    }

    proptest! {
        #[test]
        fn exact_matches_only_itself(name in "[ -~]{1,32}", other in "[ -~]{1,32}") {
            let target = MatchTarget::exact(name.clone());
            prop_assert!(target.matches(&name));
            prop_assert_eq!(target.matches(&other), name == other);
        }

        #[test]
        fn escaped_literal_pattern_agrees_with_anchored_exact(name in "[ -~]{1,32}") {
            let anchored = MatchTarget::pattern(&format!("^{}$", regex::escape(&name))).unwrap();
            prop_assert!(anchored.matches(&name));
            let unanchored = MatchTarget::pattern(&regex::escape(&name)).unwrap();
            let wrapped = format!("x{name}y");
            prop_assert!(unanchored.matches(&wrapped));
        }
    }
}
