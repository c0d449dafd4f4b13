//! MIME part tree.

use std::fmt;

use bytes::Bytes;

use crate::content_type::ContentType;
use crate::disposition::ContentDisposition;
use crate::encoding::{decode_base64, decode_quoted_printable};
use crate::error::Result;
use crate::header::{Headers, next_line};

/// Nesting depth past which multipart and message/rfc822 bodies are kept as leaves.
const MAX_DEPTH: usize = 64;

/// Content-Transfer-Encoding of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferEncoding {
    /// 7-bit ASCII (the default).
    #[default]
    SevenBit,
    /// 8-bit data.
    EightBit,
    /// Binary data.
    Binary,
    /// Base64.
    Base64,
    /// Quoted-printable.
    QuotedPrintable,
}

impl TransferEncoding {
    /// Parses a header value; unknown tokens are treated as 7bit.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "binary" => Self::Binary,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::SevenBit,
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SevenBit => "7bit",
            Self::EightBit => "8bit",
            Self::Binary => "binary",
            Self::Base64 => "base64",
            Self::QuotedPrintable => "quoted-printable",
        })
    }
}

/// Structure of a part's body.
#[derive(Debug, Clone)]
pub enum Body {
    /// Non-container content.
    Leaf,
    /// Children of a `multipart/*` part, in order.
    Multipart(Vec<Part>),
    /// The message embedded in a `message/rfc822` part.
    Message(Box<Part>),
}

/// One node of a parsed message.
#[derive(Debug, Clone)]
pub struct Part {
    headers: Headers,
    raw_body: Bytes,
    body: Body,
}

impl Part {
    /// Parses a raw message, copying it once.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        Self::from_bytes(Bytes::copy_from_slice(raw))
    }

    /// Parses a raw message without copying; parts slice into `raw`.
    #[must_use]
    pub fn from_bytes(raw: Bytes) -> Self {
        Self::parse_at_depth(&raw, 0)
    }

    fn parse_at_depth(raw: &Bytes, depth: usize) -> Self {
        let (headers, offset) = Headers::parse(raw);
        let raw_body = raw.slice(offset..);
        let content_type = headers
            .get("content-type")
            .map(ContentType::parse)
            .unwrap_or_default();

        let body = if depth >= MAX_DEPTH {
            tracing::debug!(depth, "MIME nesting too deep, treating part as leaf");
            Body::Leaf
        } else if content_type.is_multipart() {
            content_type
                .boundary()
                .and_then(|boundary| split_multipart(&raw_body, boundary))
                .map_or(Body::Leaf, |chunks| {
                    Body::Multipart(
                        chunks
                            .iter()
                            .map(|chunk| Self::parse_at_depth(chunk, depth + 1))
                            .collect(),
                    )
                })
        } else if content_type.is_message_rfc822() && !raw_body.is_empty() {
            Body::Message(Box::new(Self::parse_at_depth(&raw_body, depth + 1)))
        } else {
            Body::Leaf
        };

        Self {
            headers,
            raw_body,
            body,
        }
    }

    /// Header fields of this part.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Body structure.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Body bytes as they appear on the wire, still transfer-encoded.
    #[must_use]
    pub const fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    /// Content type, defaulting to `text/plain`.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.headers
            .get("content-type")
            .map(ContentType::parse)
            .unwrap_or_default()
    }

    /// Content-Disposition, if the header is present.
    #[must_use]
    pub fn content_disposition(&self) -> Option<ContentDisposition> {
        self.headers
            .get("content-disposition")
            .map(ContentDisposition::parse)
    }

    /// Content-Transfer-Encoding, defaulting to 7bit.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map(TransferEncoding::parse)
            .unwrap_or_default()
    }

    /// Whether the disposition type is `attachment`.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.content_disposition()
            .is_some_and(|cd| cd.is_attachment())
    }

    /// Decoded filename.
    ///
    /// Taken from the disposition `filename` parameter, falling back to the
    /// Content-Type `name` parameter. Empty names count as absent.
    #[must_use]
    pub fn filename(&self) -> Option<String> {
        self.content_disposition()
            .and_then(|cd| cd.filename())
            .filter(|name| !name.is_empty())
            .or_else(|| self.content_type().param("name"))
            .filter(|name| !name.is_empty())
    }

    /// Payload with the transfer encoding undone.
    ///
    /// # Errors
    ///
    /// Returns an error if a base64 or quoted-printable body is malformed.
    pub fn decoded_payload(&self) -> Result<Vec<u8>> {
        match self.transfer_encoding() {
            TransferEncoding::Base64 => decode_base64(&self.raw_body),
            TransferEncoding::QuotedPrintable => decode_quoted_printable(&self.raw_body),
            _ => Ok(self.raw_body.to_vec()),
        }
    }

    /// Depth-first, pre-order traversal starting with this part.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Iterator returned by [`Part::walk`].
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a Part>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Part;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        match &part.body {
            Body::Leaf => {}
            Body::Multipart(children) => self.stack.extend(children.iter().rev()),
            Body::Message(inner) => self.stack.push(inner),
        }
        Some(part)
    }
}

/// Splits a multipart body into its parts.
///
/// Returns `None` when no delimiter line is present. The line break before a
/// delimiter belongs to the delimiter. A missing close delimiter ends the
/// last part at the end of the body.
fn split_multipart(body: &Bytes, boundary: &str) -> Option<Vec<Bytes>> {
    let delimiter = format!("--{boundary}");
    let delimiter = delimiter.as_bytes();

    let mut chunks = Vec::new();
    let mut current: Option<usize> = None;
    let mut seen_delimiter = false;
    let mut closed = false;
    let mut offset = 0;

    while offset < body.len() {
        let (line, next) = next_line(body, offset);
        let trimmed = line.trim_ascii_end();

        if let Some(suffix) = trimmed.strip_prefix(delimiter)
            && (suffix.is_empty() || suffix == b"--")
        {
            seen_delimiter = true;
            if let Some(start) = current.take() {
                chunks.push(body.slice(start..content_end(body, start, offset)));
            }
            if suffix == b"--" {
                closed = true;
                break;
            }
            current = Some(next);
        }
        offset = next;
    }

    if let Some(start) = current {
        tracing::debug!(boundary, "multipart body has no closing delimiter");
        chunks.push(body.slice(start.min(body.len())..));
    }
    if !closed && !seen_delimiter {
        return None;
    }
    Some(chunks)
}

/// End of a part's content: the delimiter line start minus its preceding line break.
fn content_end(body: &[u8], start: usize, delimiter_at: usize) -> usize {
    let mut end = delimiter_at;
    if end > start && body[end - 1] == b'\n' {
        end -= 1;
        if end > start && body[end - 1] == b'\r' {
            end -= 1;
        }
    }
    end
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MIXED: &[u8] = b"From: a@example.com\r\n\
Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
\r\n\
preamble\r\n\
--b1\r\n\
Content-Type: text/plain\r\n\
\r\n\
Hello\r\n\
--b1\r\n\
Content-Type: text/csv\r\n\
Content-Disposition: attachment; filename=\"test1.csv\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
SWQsTmFtZQoxLEZlbGl4\r\n\
--b1--\r\n\
epilogue\r\n";

    #[test]
    fn test_multipart_structure() {
        let msg = Part::parse(MIXED);
        let Body::Multipart(children) = msg.body() else {
            panic!("expected multipart");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].raw_body().as_ref(), b"Hello");
        assert!(!children[0].is_attachment());
        assert!(children[1].is_attachment());
    }

    #[test]
    fn test_walk_order() {
        let msg = Part::parse(MIXED);
        let types: Vec<String> = msg.walk().map(|p| p.content_type().to_string()).collect();
        assert_eq!(types, ["multipart/mixed", "text/plain", "text/csv"]);
    }

    #[test]
    fn test_decoded_attachment() {
        let msg = Part::parse(MIXED);
        let att = msg.walk().find(|p| p.is_attachment()).unwrap();
        assert_eq!(att.filename().as_deref(), Some("test1.csv"));
        assert_eq!(att.decoded_payload().unwrap(), b"Id,Name\n1,Felix");
    }

    #[test]
    fn test_missing_close_delimiter() {
        let raw = b"Content-Type: multipart/mixed; boundary=zz\r\n\r\n--zz\r\nA: 1\r\n\r\none\r\n--zz\r\n\r\ntwo\r\n";
        let msg = Part::parse(raw);
        let Body::Multipart(children) = msg.body() else {
            panic!("expected multipart");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].raw_body().as_ref(), b"one");
        assert_eq!(children[1].raw_body().as_ref(), b"two\r\n");
    }

    #[test]
    fn test_multipart_without_delimiters_is_leaf() {
        let raw = b"Content-Type: multipart/mixed; boundary=zz\r\n\r\nno parts here\r\n";
        assert!(matches!(Part::parse(raw).body(), Body::Leaf));
    }

    #[test]
    fn test_boundary_prefix_is_not_delimiter() {
        let raw = b"Content-Type: multipart/mixed; boundary=zz\r\n\r\n--zz\r\n\r\n--zzz not a delimiter\r\n--zz--\r\n";
        let msg = Part::parse(raw);
        let Body::Multipart(children) = msg.body() else {
            panic!("expected multipart");
        };
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].raw_body().as_ref(), b"--zzz not a delimiter");
    }

    #[test]
    fn test_filename_falls_back_to_content_type_name() {
        let raw = b"Content-Type: application/pdf; name=\"report.pdf\"\r\n\
Content-Disposition: attachment\r\n\r\n%PDF";
        let part = Part::parse(raw);
        assert_eq!(part.filename().as_deref(), Some("report.pdf"));
    }

    #[test]
    fn test_quoted_printable_payload() {
        let raw = b"Content-Transfer-Encoding: quoted-printable\r\n\r\ncaf=C3=A9 =\r\nlatte";
        let part = Part::parse(raw);
        assert_eq!(part.decoded_payload().unwrap(), "café latte".as_bytes());
    }

    #[test]
    fn test_invalid_base64_is_error() {
        let raw = b"Content-Transfer-Encoding: base64\r\n\r\n!!!not base64!!!";
        assert!(Part::parse(raw).decoded_payload().is_err());
    }

    #[test]
    fn test_nested_message_is_walked() {
        let raw = b"Content-Type: multipart/mixed; boundary=outer\r\n\r\n\
--outer\r\n\
Content-Type: message/rfc822\r\n\
\r\n\
Content-Type: multipart/mixed; boundary=inner\r\n\
\r\n\
--inner\r\n\
Content-Disposition: attachment; filename=deep.txt\r\n\
\r\n\
deep\r\n\
--inner--\r\n\
--outer--\r\n";
        let msg = Part::parse(raw);
        let names: Vec<String> = msg.walk().filter_map(Part::filename).collect();
        assert_eq!(names, ["deep.txt"]);
    }

    #[test]
    fn test_depth_limit() {
        let mut raw = Vec::new();
        for _ in 0..(MAX_DEPTH + 10) {
            raw.extend_from_slice(b"Content-Type: message/rfc822\r\n\r\n");
        }
        raw.extend_from_slice(b"Subject: bottom\r\n\r\nx");
        assert_eq!(Part::parse(&raw).walk().count(), MAX_DEPTH + 1);
    }
}
