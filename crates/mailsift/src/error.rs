//! Error types for attachment lookups.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening a session or locating attachments.
///
/// Protocol variants carry the transport error as their source. Nothing is
/// retried; the first failure aborts the operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The server could not be reached or the connection broke.
    #[error("Connection failed")]
    Connectivity(#[source] mailsift_imap::Error),

    /// The server rejected the credentials.
    #[error("Authentication failed")]
    Authentication(#[source] mailsift_imap::Error),

    /// The folder could not be opened.
    #[error("Cannot open folder {folder:?}")]
    Folder {
        /// Folder name as requested.
        folder: String,
        /// Transport error.
        #[source]
        source: mailsift_imap::Error,
    },

    /// The server rejected the search.
    #[error("Search failed")]
    Search(#[source] mailsift_imap::Error),

    /// A message could not be fetched.
    #[error("Fetching message {seq} failed")]
    Fetch {
        /// Sequence number of the message.
        seq: u32,
        /// Transport error.
        #[source]
        source: mailsift_imap::Error,
    },

    /// A matched attachment could not be written to disk.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// The attachment name pattern is not a valid regular expression.
    #[error("Invalid attachment pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A matched attachment's transfer encoding is malformed.
    #[error("Cannot decode attachment {filename:?}")]
    Decode {
        /// Filename of the attachment.
        filename: String,
        /// Decoder error.
        #[source]
        source: mailsift_mime::Error,
    },

    /// Configuration could not be read.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// The session has already been closed.
    #[error("Session is closed")]
    SessionClosed,
}

/// Failures while persisting attachments.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Creating or writing the file failed.
    #[error("Cannot write {path}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The destination exists and the overwrite policy forbids replacing it.
    #[error("{path} already exists")]
    AlreadyExists {
        /// Destination path.
        path: PathBuf,
    },

    /// The attachment name cannot be used as a file name.
    #[error("Refusing to write attachment with unsafe file name {filename:?}")]
    UnsafeFilename {
        /// Name as it appeared in the message.
        filename: String,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_protocol_errors_expose_source() {
        let err = Error::Folder {
            folder: "Archive".to_string(),
            source: mailsift_imap::Error::No("no such mailbox".to_string()),
        };
        assert_eq!(err.to_string(), "Cannot open folder \"Archive\"");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_write_error_is_transparent() {
        let err = Error::from(WriteError::UnsafeFilename {
            filename: "../x".to_string(),
        });
        assert!(err.to_string().contains("unsafe file name"));
    }
}
