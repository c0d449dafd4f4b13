//! IMAP command builder.
//!
//! Commands are plain values; [`Command::serialize`] turns one into the bytes
//! that go on the wire, tag and trailing CRLF included.

mod serialize;
mod tag_generator;
mod types;

use crate::error::Result;
use crate::types::{Mailbox, SequenceSet, Tag};

pub use tag_generator::TagGenerator;
pub use types::{FetchAttribute, FetchItems, SearchCriteria};

use serialize::{write_astring, write_fetch_items, write_search_criteria};

/// IMAP command.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    // Any state
    /// CAPABILITY command.
    Capability,
    /// NOOP command.
    Noop,
    /// LOGOUT command.
    Logout,

    // Not authenticated
    /// STARTTLS command.
    StartTls,
    /// LOGIN command.
    Login {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },

    // Authenticated
    /// SELECT command (read-write).
    Select {
        /// Mailbox to open.
        mailbox: Mailbox,
    },
    /// EXAMINE command (read-only).
    Examine {
        /// Mailbox to open.
        mailbox: Mailbox,
    },

    // Selected
    /// CLOSE command.
    Close,
    /// SEARCH command.
    Search {
        /// Search criteria.
        criteria: SearchCriteria,
    },
    /// FETCH command.
    Fetch {
        /// Messages to fetch.
        sequence: SequenceSet,
        /// Data items to fetch.
        items: FetchItems,
    },
}

impl Command {
    /// Serializes the command with the given tag, CRLF included.
    ///
    /// # Errors
    ///
    /// Returns an error if a string argument contains CR, LF or NUL, which
    /// cannot be carried by a quoted string.
    pub fn serialize(&self, tag: &Tag) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(tag.as_str().as_bytes());
        buf.push(b' ');

        match self {
            Self::Capability => buf.extend_from_slice(b"CAPABILITY"),
            Self::Noop => buf.extend_from_slice(b"NOOP"),
            Self::Logout => buf.extend_from_slice(b"LOGOUT"),
            Self::StartTls => buf.extend_from_slice(b"STARTTLS"),
            Self::Login { username, password } => {
                buf.extend_from_slice(b"LOGIN ");
                write_astring(&mut buf, username)?;
                buf.push(b' ');
                write_astring(&mut buf, password)?;
            }
            Self::Select { mailbox } => {
                buf.extend_from_slice(b"SELECT ");
                write_astring(&mut buf, mailbox.as_str())?;
            }
            Self::Examine { mailbox } => {
                buf.extend_from_slice(b"EXAMINE ");
                write_astring(&mut buf, mailbox.as_str())?;
            }
            Self::Close => buf.extend_from_slice(b"CLOSE"),
            Self::Search { criteria } => {
                buf.extend_from_slice(b"SEARCH ");
                write_search_criteria(&mut buf, criteria)?;
            }
            Self::Fetch { sequence, items } => {
                buf.extend_from_slice(b"FETCH ");
                buf.extend_from_slice(sequence.to_string().as_bytes());
                buf.push(b' ');
                write_fetch_items(&mut buf, items);
            }
        }

        buf.extend_from_slice(b"\r\n");
        Ok(buf)
    }

    /// The command keyword, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Capability => "CAPABILITY",
            Self::Noop => "NOOP",
            Self::Logout => "LOGOUT",
            Self::StartTls => "STARTTLS",
            Self::Login { .. } => "LOGIN",
            Self::Select { .. } => "SELECT",
            Self::Examine { .. } => "EXAMINE",
            Self::Close => "CLOSE",
            Self::Search { .. } => "SEARCH",
            Self::Fetch { .. } => "FETCH",
        }
    }
}

// Hand-written so a LOGIN never ends up in a log line with its password.
impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Select { mailbox } => f.debug_struct("Select").field("mailbox", mailbox).finish(),
            Self::Examine { mailbox } => {
                f.debug_struct("Examine").field("mailbox", mailbox).finish()
            }
            Self::Search { criteria } => {
                f.debug_struct("Search").field("criteria", criteria).finish()
            }
            Self::Fetch { sequence, items } => f
                .debug_struct("Fetch")
                .field("sequence", sequence)
                .field("items", items)
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn wire(cmd: &Command) -> String {
        String::from_utf8(cmd.serialize(&Tag::new("A0001")).unwrap()).unwrap()
    }

    #[test]
    fn simple_commands() {
        assert_eq!(wire(&Command::Capability), "A0001 CAPABILITY\r\n");
        assert_eq!(wire(&Command::Logout), "A0001 LOGOUT\r\n");
        assert_eq!(wire(&Command::Close), "A0001 CLOSE\r\n");
    }

    #[test]
    fn login_quotes_when_needed() {
        let cmd = Command::Login {
            username: "user@example.com".into(),
            password: "pa ss\"word".into(),
        };
        assert_eq!(
            wire(&cmd),
            "A0001 LOGIN user@example.com \"pa ss\\\"word\"\r\n"
        );
    }

    #[test]
    fn login_rejects_line_breaks() {
        let cmd = Command::Login {
            username: "user".into(),
            password: "bad\r\npass".into(),
        };
        assert!(cmd.serialize(&Tag::new("A0001")).is_err());
    }

    #[test]
    fn examine_mailbox_with_space() {
        let cmd = Command::Examine {
            mailbox: Mailbox::new("Sent Items"),
        };
        assert_eq!(wire(&cmd), "A0001 EXAMINE \"Sent Items\"\r\n");
    }

    #[test]
    fn fetch_full_message_peeks() {
        let cmd = Command::Fetch {
            sequence: SequenceSet::single(3).unwrap(),
            items: FetchItems::full_message(),
        };
        assert_eq!(wire(&cmd), "A0001 FETCH 3 BODY.PEEK[]\r\n");
    }

    #[test]
    fn debug_redacts_password() {
        let cmd = Command::Login {
            username: "user".into(),
            password: "hunter2".into(),
        };
        let debug = format!("{cmd:?}");
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }
}
