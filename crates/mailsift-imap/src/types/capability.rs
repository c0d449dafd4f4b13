//! Server capabilities.

/// A capability advertised by the server.
///
/// Only the capabilities that change client behaviour get their own variant;
/// everything else is kept verbatim in [`Capability::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `IMAP4rev1`
    Imap4Rev1,
    /// `IMAP4rev2`
    Imap4Rev2,
    /// `STARTTLS`
    StartTls,
    /// `LOGINDISABLED`: plain LOGIN is refused on this connection.
    LoginDisabled,
    /// `AUTH=<mechanism>`
    Auth(String),
    /// `IDLE`
    Idle,
    /// Anything else.
    Other(String),
}

impl Capability {
    /// Parses a single capability atom.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let upper = s.to_ascii_uppercase();
        if let Some(mechanism) = upper.strip_prefix("AUTH=") {
            return Self::Auth(mechanism.to_string());
        }
        match upper.as_str() {
            "IMAP4REV1" => Self::Imap4Rev1,
            "IMAP4REV2" => Self::Imap4Rev2,
            "STARTTLS" => Self::StartTls,
            "LOGINDISABLED" => Self::LoginDisabled,
            "IDLE" => Self::Idle,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imap4Rev1 => f.write_str("IMAP4rev1"),
            Self::Imap4Rev2 => f.write_str("IMAP4rev2"),
            Self::StartTls => f.write_str("STARTTLS"),
            Self::LoginDisabled => f.write_str("LOGINDISABLED"),
            Self::Auth(m) => write!(f, "AUTH={m}"),
            Self::Idle => f.write_str("IDLE"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_and_unknown() {
        assert_eq!(Capability::parse("imap4rev1"), Capability::Imap4Rev1);
        assert_eq!(Capability::parse("STARTTLS"), Capability::StartTls);
        assert_eq!(
            Capability::parse("AUTH=PLAIN"),
            Capability::Auth("PLAIN".into())
        );
        assert_eq!(
            Capability::parse("X-GM-EXT-1"),
            Capability::Other("X-GM-EXT-1".into())
        );
    }

    #[test]
    fn display_round_trips_auth() {
        assert_eq!(Capability::Auth("XOAUTH2".into()).to_string(), "AUTH=XOAUTH2");
    }
}
