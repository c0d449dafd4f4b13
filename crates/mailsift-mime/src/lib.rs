//! # mailsift-mime
//!
//! Parses raw RFC 5322 messages into a tree of MIME parts and answers the
//! questions an attachment finder asks of each part: what is its disposition,
//! what is its (decoded) filename, and what are its payload bytes once the
//! transfer encoding is undone.
//!
//! ## Quick Start
//!
//! ```
//! use mailsift_mime::Part;
//!
//! let raw = b"Content-Type: multipart/mixed; boundary=XX\r\n\
//! \r\n\
//! --XX\r\n\
//! Content-Type: text/plain\r\n\
//! \r\n\
//! see attached\r\n\
//! --XX\r\n\
//! Content-Disposition: attachment; filename=\"notes.txt\"\r\n\
//! Content-Transfer-Encoding: base64\r\n\
//! \r\n\
//! aGVsbG8=\r\n\
//! --XX--\r\n";
//!
//! let message = Part::parse(raw);
//! let attachment = message.walk().find(|p| p.is_attachment()).unwrap();
//! assert_eq!(attachment.filename().as_deref(), Some("notes.txt"));
//! assert_eq!(attachment.decoded_payload().unwrap(), b"hello");
//! ```
//!
//! Structure parsing never fails: malformed input degrades to leaf parts.
//! Only payload decoding reports errors.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod disposition;
mod error;
mod header;
mod message;
mod params;

pub mod encoding;

pub use content_type::ContentType;
pub use disposition::{ContentDisposition, DispositionKind};
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Body, Part, TransferEncoding, Walk};
pub use params::Params;
