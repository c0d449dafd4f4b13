//! Attachment query builder.

use crate::Result;
use crate::matcher::MatchTarget;

/// Which attachments to look for, and where.
///
/// ```
/// use mailsift::AttachmentQuery;
///
/// let query = AttachmentQuery::new(r"report_\d{8}\.csv")
///     .regex()
///     .folder("Reports")
///     .latest_only();
/// assert_eq!(query.mail_folder(), Some("Reports"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentQuery {
    name: String,
    check_regex: bool,
    folder: Option<String>,
    latest_only: bool,
}

impl AttachmentQuery {
    /// Looks for attachments named exactly `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            check_regex: false,
            folder: None,
            latest_only: false,
        }
    }

    /// Treats the name as a regular expression.
    #[must_use]
    pub const fn regex(mut self) -> Self {
        self.check_regex = true;
        self
    }

    /// Sets the regex flag explicitly.
    #[must_use]
    pub const fn check_regex(mut self, check_regex: bool) -> Self {
        self.check_regex = check_regex;
        self
    }

    /// Searches `folder` instead of the session's default folder.
    #[must_use]
    pub fn folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    /// Keeps only the matches of the newest message that has any.
    #[must_use]
    pub const fn latest_only(mut self) -> Self {
        self.latest_only = true;
        self
    }

    /// The name or pattern.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The folder override, if any.
    #[must_use]
    pub fn mail_folder(&self) -> Option<&str> {
        self.folder.as_deref()
    }

    /// Whether only the newest matching message counts.
    #[must_use]
    pub const fn is_latest_only(&self) -> bool {
        self.latest_only
    }

    /// Compiles the match target.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidPattern`] for a bad regular expression.
    pub fn target(&self) -> Result<MatchTarget> {
        MatchTarget::from_flag(&self.name, self.check_regex)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = AttachmentQuery::new("a.csv");
        assert_eq!(query.mail_folder(), None);
        assert!(!query.is_latest_only());
        assert!(matches!(query.target().unwrap(), MatchTarget::Exact(_)));
    }

    #[test]
    fn test_regex_flag() {
        let query = AttachmentQuery::new(r"\d+").check_regex(true);
        assert!(query.target().unwrap().matches("x1"));
        let query = query.check_regex(false);
        assert!(!query.target().unwrap().matches("x1"));
    }
}
