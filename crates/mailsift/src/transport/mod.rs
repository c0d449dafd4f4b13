//! The mail protocol operations a session needs.
//!
//! [`MailTransport`] is the seam between the session logic and the wire.
//! [`ImapTransport`] drives a real server; tests substitute a scripted
//! implementation.

mod imap;

use bytes::Bytes;

pub use imap::ImapTransport;
pub use mailsift_imap::SeqNum;

/// Transport error type.
pub type TransportError = mailsift_imap::Error;

/// Protocol commands used to locate attachments.
///
/// Commands run one at a time; every method waits for the server's
/// completion before returning. A non-OK completion is an error.
#[allow(async_fn_in_trait)]
pub trait MailTransport {
    /// Authenticates.
    async fn login(&mut self, username: &str, password: &str) -> Result<(), TransportError>;

    /// Opens `folder` read-only, leaving any previously open folder.
    async fn select(&mut self, folder: &str) -> Result<(), TransportError>;

    /// Every message in the open folder, ascending.
    async fn search_all(&mut self) -> Result<Vec<SeqNum>, TransportError>;

    /// The complete raw message.
    async fn fetch_message(&mut self, seq: SeqNum) -> Result<Bytes, TransportError>;

    /// Leaves the open folder. Does nothing when none is open.
    async fn close_mailbox(&mut self) -> Result<(), TransportError>;

    /// Ends the session and releases the connection, whatever the outcome.
    async fn logout(&mut self) -> Result<(), TransportError>;
}
