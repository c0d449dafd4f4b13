//! Framed I/O for the IMAP wire format.
//!
//! Responses are CRLF-terminated lines, except that a line ending in `{n}`
//! is followed by exactly `n` bytes of literal data and then the rest of
//! the response. [`FramedStream::read_response`] returns one whole response
//! with its literals inlined, ready for the parser.

#![allow(clippy::missing_errors_doc)]

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::types::Tag;
use crate::{Error, Result};

const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Upper bound on a single response line.
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Upper bound on a single literal.
pub const MAX_LITERAL_SIZE: usize = 100 * 1024 * 1024;

/// Buffered, response-framed IMAP stream.
pub struct FramedStream<S> {
    reader: BufReader<S>,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a stream.
    pub fn new(stream: S) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, stream),
        }
    }

    /// Reads one complete response, literals included.
    pub async fn read_response(&mut self) -> Result<Vec<u8>> {
        let mut response = Vec::new();
        loop {
            let line_start = response.len();
            self.read_line_into(&mut response).await?;

            let Some(len) = literal_length(&response[line_start..]) else {
                return Ok(response);
            };
            if len > MAX_LITERAL_SIZE {
                return Err(Error::Protocol(format!(
                    "literal too large: {len} bytes (max {MAX_LITERAL_SIZE})"
                )));
            }
            let start = response.len();
            response.resize(start + len, 0);
            self.reader.read_exact(&mut response[start..]).await?;
        }
    }

    /// Reads responses until the completion response for `tag`, which is
    /// the last element of the returned list.
    pub async fn read_until_tagged(&mut self, tag: &Tag) -> Result<Vec<Vec<u8>>> {
        let mut responses = Vec::new();
        loop {
            let response = self.read_response().await?;
            let done = is_tagged_with(&response, tag);
            responses.push(response);
            if done {
                return Ok(responses);
            }
        }
    }

    async fn read_line_into(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let start = out.len();
        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed by server",
                )));
            }

            // A CR may end one read and its LF start the next.
            let carried_cr = out.len() > start && out.last() == Some(&b'\r') && buf[0] == b'\n';
            if carried_cr {
                out.push(b'\n');
                self.reader.consume(1);
                return Ok(());
            }
            if let Some(pos) = buf.windows(2).position(|w| w == b"\r\n") {
                out.extend_from_slice(&buf[..pos + 2]);
                self.reader.consume(pos + 2);
                return Ok(());
            }

            let len = buf.len();
            out.extend_from_slice(buf);
            self.reader.consume(len);

            if out.len() - start > MAX_LINE_LENGTH {
                return Err(Error::Protocol(format!(
                    "response line exceeds {MAX_LINE_LENGTH} bytes"
                )));
            }
        }
    }

    /// Writes a serialized command and flushes.
    pub async fn write_command(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(data).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Shuts down the write half.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.reader.get_mut().shutdown().await?;
        Ok(())
    }

    /// Returns the inner stream. Buffered unread data is lost.
    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

/// Returns true if `response` is the completion line for `tag`.
fn is_tagged_with(response: &[u8], tag: &Tag) -> bool {
    let tag = tag.as_str().as_bytes();
    response.starts_with(tag) && response.get(tag.len()) == Some(&b' ')
}

/// Literal length announced at the end of a line: `{123}\r\n` or `{123+}\r\n`.
fn literal_length(line: &[u8]) -> Option<usize> {
    let line = line.strip_suffix(b"\r\n")?.strip_suffix(b"}")?;
    let line = line.strip_suffix(b"+").unwrap_or(line);
    let open = line.iter().rposition(|&b| b == b'{')?;
    let digits = &line[open + 1..];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
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
    use tokio_test::io::Builder;

    use super::*;

    #[test]
    fn test_literal_length() {
        assert_eq!(literal_length(b"* 1 FETCH (BODY[] {42}\r\n"), Some(42));
        assert_eq!(literal_length(b"A1 APPEND {7+}\r\n"), Some(7));
        assert_eq!(literal_length(b"* OK done\r\n"), None);
        assert_eq!(literal_length(b"* OK {abc}\r\n"), None);
        assert_eq!(literal_length(b"* OK {}\r\n"), None);
        assert_eq!(literal_length(b"{5}"), None);
    }

    #[test]
    fn test_tag_match_needs_space() {
        let tag = Tag::new("A1");
        assert!(is_tagged_with(b"A1 OK done\r\n", &tag));
        assert!(!is_tagged_with(b"A10 OK done\r\n", &tag));
        assert!(!is_tagged_with(b"* OK A1\r\n", &tag));
    }

    #[tokio::test]
    async fn test_reads_response_with_literal() {
        let mock = Builder::new()
            .read(b"* 1 FETCH (BODY[] {7}\r\n")
            .read(b"a\r\nb\r\nc)\r\n")
            .build();
        let mut framed = FramedStream::new(mock);
        let response = framed.read_response().await.unwrap();
        assert_eq!(response, b"* 1 FETCH (BODY[] {7}\r\na\r\nb\r\nc)\r\n");
    }

    #[tokio::test]
    async fn test_crlf_split_across_reads() {
        let mock = Builder::new().read(b"* OK ready\r").read(b"\nA0 OK\r\n").build();
        let mut framed = FramedStream::new(mock);
        assert_eq!(framed.read_response().await.unwrap(), b"* OK ready\r\n");
        assert_eq!(framed.read_response().await.unwrap(), b"A0 OK\r\n");
    }

    #[tokio::test]
    async fn test_read_until_tagged_collects_untagged() {
        let mock = Builder::new()
            .read(b"* 3 EXISTS\r\n* 0 RECENT\r\nA0001 OK [READ-ONLY] done\r\n")
            .build();
        let mut framed = FramedStream::new(mock);
        let responses = framed.read_until_tagged(&Tag::new("A0001")).await.unwrap();
        assert_eq!(responses.len(), 3);
        assert!(responses[2].starts_with(b"A0001 OK"));
    }

    #[tokio::test]
    async fn test_eof_is_io_error() {
        let mock = Builder::new().read(b"* OK partial").build();
        let mut framed = FramedStream::new(mock);
        let err = framed.read_response().await.unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[tokio::test]
    async fn test_write_command() {
        let mock = Builder::new().write(b"A0000 NOOP\r\n").build();
        let mut framed = FramedStream::new(mock);
        framed.write_command(b"A0000 NOOP\r\n").await.unwrap();
    }
}
