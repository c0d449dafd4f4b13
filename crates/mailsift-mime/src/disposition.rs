//! Content-Disposition header (RFC 2183).

use crate::params::Params;

/// Disposition type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispositionKind {
    /// Displayed as part of the message.
    Inline,
    /// Separate from the message body.
    Attachment,
    /// Any other token, lower-cased.
    Other(String),
}

impl DispositionKind {
    fn parse(token: &str) -> Self {
        let token = token.trim().to_ascii_lowercase();
        match token.as_str() {
            "inline" => Self::Inline,
            "attachment" => Self::Attachment,
            _ => Self::Other(token),
        }
    }
}

/// Parsed Content-Disposition header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    /// Disposition type.
    pub kind: DispositionKind,
    /// Parameters such as `filename` or `size`.
    pub parameters: Params,
}

impl ContentDisposition {
    /// Parses a header value. Never fails.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let (kind, parameters) = Params::split(value);
        Self {
            kind: DispositionKind::parse(kind),
            parameters,
        }
    }

    /// Whether the disposition type is `attachment`.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.kind == DispositionKind::Attachment
    }

    /// Decoded `filename` parameter.
    #[must_use]
    pub fn filename(&self) -> Option<String> {
        self.parameters.decoded("filename")
    }
}
