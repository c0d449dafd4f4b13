//! Content-Type header.

use std::fmt;

use crate::params::Params;

/// MIME content type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type, lower-cased (e.g. "text", "multipart").
    pub main_type: String,
    /// Subtype, lower-cased (e.g. "plain", "mixed").
    pub sub_type: String,
    /// Parameters such as `charset`, `boundary` or `name`.
    pub parameters: Params,
}

impl ContentType {
    /// Creates a content type with no parameters.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: Params::default(),
        }
    }

    /// The RFC 2045 default, `text/plain`.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain")
    }

    /// Parses a header value.
    ///
    /// Never fails: a missing or malformed `type/subtype` falls back to
    /// `text/plain` while keeping whatever parameters could be read.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let (mime, parameters) = Params::split(value);
        let (main_type, sub_type) = match mime.split_once('/') {
            Some((main, sub)) if !main.trim().is_empty() && !sub.trim().is_empty() => (
                main.trim().to_ascii_lowercase(),
                sub.trim().to_ascii_lowercase(),
            ),
            _ => ("text".to_string(), "plain".to_string()),
        };
        Self {
            main_type,
            sub_type,
            parameters,
        }
    }

    /// Whether this is any `multipart/*` type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type == "multipart"
    }

    /// Whether this is `message/rfc822`.
    #[must_use]
    pub fn is_message_rfc822(&self) -> bool {
        self.main_type == "message" && self.sub_type == "rfc822"
    }

    /// The multipart boundary, if present and non-empty.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameters.raw("boundary").filter(|b| !b.is_empty())
    }

    /// The charset parameter.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameters.raw("charset")
    }

    /// A decoded parameter value (RFC 2231 / RFC 2047 aware).
    #[must_use]
    pub fn param(&self, name: &str) -> Option<String> {
        self.parameters.decoded(name)
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self::text_plain()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)
    }
}
