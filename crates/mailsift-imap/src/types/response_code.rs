//! Response codes carried in `[...]` on status responses.

use super::Capability;

/// Response code from a status response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// ALERT: text that must be shown to the user.
    Alert,
    /// AUTHENTICATIONFAILED (RFC 5530).
    AuthenticationFailed,
    /// CAPABILITY list sent inline.
    Capability(Vec<Capability>),
    /// NONEXISTENT (RFC 5530): the mailbox does not exist.
    Nonexistent,
    /// PARSE: the server could not parse a message.
    Parse,
    /// READ-ONLY: mailbox opened read-only.
    ReadOnly,
    /// READ-WRITE: mailbox opened read-write.
    ReadWrite,
    /// TRYCREATE: the mailbox does not exist but may be created.
    TryCreate,
    /// UIDNEXT
    UidNext(u32),
    /// UIDVALIDITY
    UidValidity(u32),
    /// UNSEEN
    Unseen(u32),
    /// Anything else, with its raw keyword.
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_code_carries_list() {
        let code = ResponseCode::Capability(vec![Capability::Imap4Rev1, Capability::Idle]);
        let ResponseCode::Capability(caps) = code else {
            panic!("expected Capability variant");
        };
        assert_eq!(caps.len(), 2);
    }
}
