//! # mailsift
//!
//! Finds email attachments by name or regular expression in an IMAP folder,
//! and returns them in memory or writes them to a directory.
//!
//! A [`MailSession`] owns one authenticated connection. Each lookup opens the
//! folder read-only, lists every message, fetches them one by one and walks
//! their MIME parts. Parts with an `attachment` disposition whose decoded
//! filename matches are decoded (base64, quoted-printable) and returned in
//! message and part order.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailsift::{MailConfig, with_session};
//!
//! # async fn demo() -> mailsift::Result<()> {
//! let config = MailConfig::new("imap.example.com", "me@example.com", "secret");
//!
//! let reports = with_session(&config, async |session| {
//!     session
//!         .retrieve_mail_attachments(r"report_\d+\.csv", "INBOX", true)
//!         .await
//! })
//! .await?;
//!
//! for attachment in reports {
//!     println!("{}: {} bytes", attachment.filename, attachment.data.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Matching
//!
//! Exact names compare byte for byte. Patterns use [`regex`] search
//! semantics: `test\d+\.csv` also matches `old_test1.csv.bak`; anchor with
//! `^...$` to require the whole name.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod locator;
pub mod materializer;
pub mod matcher;
pub mod query;
pub mod session;
pub mod transport;

pub use config::{DEFAULT_MAIL_FOLDER, MailConfig, Security};
pub use error::{Error, Result, WriteError};
pub use locator::{Attachment, extract_attachments, first_matching_filename};
pub use materializer::{OverwritePolicy, write_attachments};
pub use matcher::MatchTarget;
pub use query::AttachmentQuery;
pub use session::{MailSession, with_session};
pub use transport::{ImapTransport, MailTransport, SeqNum, TransportError};
