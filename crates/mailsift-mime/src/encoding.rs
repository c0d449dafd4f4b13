//! Transfer and header decoding.
//!
//! Base64 and quoted-printable for bodies, RFC 2047 encoded words for header
//! values, RFC 2231 extended parameter values, and charset conversion.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::error::Result;

/// Standard alphabet, tolerant of missing or extra padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes a base64 body, ignoring line breaks and other whitespace.
///
/// Padding may appear mid-stream, as when each line was encoded on its own;
/// every padded run is decoded in turn.
///
/// # Errors
///
/// Returns an error if the data is not valid base64.
pub fn decode_base64(data: &[u8]) -> Result<Vec<u8>> {
    let cleaned: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    let mut out = Vec::with_capacity(cleaned.len() / 4 * 3);
    for run in cleaned.split(|&b| b == b'=').filter(|run| !run.is_empty()) {
        LENIENT_BASE64.decode_vec(run, &mut out)?;
    }
    Ok(out)
}

/// Decodes a quoted-printable body (RFC 2045 section 6.7).
///
/// Soft line breaks (`=` at end of line) are removed; hard line breaks are
/// kept as they appear. An `=` that starts no valid escape is kept literally.
///
/// # Errors
///
/// Never fails today; the signature matches the other transfer decoders.
pub fn decode_quoted_printable(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let b = data[i];
        if b != b'=' {
            out.push(b);
            i += 1;
            continue;
        }

        // Soft break, possibly with transport padding before the newline.
        let mut j = i + 1;
        while j < data.len() && matches!(data[j], b' ' | b'\t') {
            j += 1;
        }
        match data.get(j..) {
            Some([b'\r', b'\n', ..]) => {
                i = j + 2;
                continue;
            }
            Some([b'\n', ..]) => {
                i = j + 1;
                continue;
            }
            Some([]) => {
                i = j;
                continue;
            }
            _ => {}
        }

        match (data.get(i + 1).copied().and_then(hex), data.get(i + 2).copied().and_then(hex)) {
            (Some(hi), Some(lo)) => {
                out.push((hi << 4) | lo);
                i += 3;
            }
            _ => {
                out.push(b'=');
                i += 1;
            }
        }
    }

    Ok(out)
}

const fn hex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Converts bytes in `charset` to a string.
///
/// Unknown charsets fall back to lossy UTF-8.
#[must_use]
pub fn decode_charset(charset: &str, bytes: &[u8]) -> String {
    let charset = charset.trim();
    if charset.is_empty()
        || charset.eq_ignore_ascii_case("utf-8")
        || charset.eq_ignore_ascii_case("utf8")
        || charset.eq_ignore_ascii_case("us-ascii")
    {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
        let (decoded, _, _) = encoding.decode(bytes);
        decoded.into_owned()
    } else {
        tracing::debug!(charset, "unknown charset, falling back to UTF-8 lossy");
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Decodes every RFC 2047 encoded word in a header value.
///
/// Whitespace between two adjacent encoded words is dropped. Malformed words
/// are left as they are.
#[must_use]
pub fn decode_rfc2047(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut pending_ws: Option<&str> = None;
    let mut last_was_word = false;

    while !rest.is_empty() {
        if let Some((decoded, consumed)) = decode_encoded_word(rest) {
            // Whitespace between two encoded words is not part of the text.
            if !last_was_word {
                if let Some(ws) = pending_ws {
                    out.push_str(ws);
                }
            }
            pending_ws = None;
            out.push_str(&decoded);
            rest = &rest[consumed..];
            last_was_word = true;
            continue;
        }

        let ws_len = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());
        if ws_len > 0 {
            if let Some(ws) = pending_ws.take() {
                out.push_str(ws);
            }
            pending_ws = Some(&rest[..ws_len]);
            rest = &rest[ws_len..];
            continue;
        }

        if let Some(ws) = pending_ws.take() {
            out.push_str(ws);
        }
        let first = rest.chars().next().map_or(1, char::len_utf8);
        let next = rest[first..]
            .find(|c: char| c.is_whitespace() || c == '=')
            .map_or(rest.len(), |n| n + first);
        out.push_str(&rest[..next]);
        rest = &rest[next..];
        last_was_word = false;
    }
    if let Some(ws) = pending_ws {
        out.push_str(ws);
    }
    out
}

/// Tries to decode one `=?charset?enc?text?=` word at the start of `s`.
/// Returns the decoded text and the number of bytes consumed.
fn decode_encoded_word(s: &str) -> Option<(String, usize)> {
    let inner = s.strip_prefix("=?")?;
    let (charset, inner) = inner.split_once('?')?;
    let (encoding, inner) = inner.split_once('?')?;
    let end = inner.find("?=")?;
    let payload = &inner[..end];
    if payload.contains(char::is_whitespace)
        || charset.is_empty()
        || charset.contains(char::is_whitespace)
    {
        return None;
    }
    // RFC 2231 allows `charset*language`.
    let charset = charset.split_once('*').map_or(charset, |(c, _)| c);

    let bytes = match encoding {
        "B" | "b" => LENIENT_BASE64.decode(payload).ok()?,
        "Q" | "q" => decode_q(payload)?,
        _ => return None,
    };
    let consumed = s.len() - inner[end + 2..].len();
    Some((decode_charset(charset, &bytes), consumed))
}

/// Q encoding: quoted-printable with `_` for space.
fn decode_q(payload: &str) -> Option<Vec<u8>> {
    let bytes = payload.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                out.push(b' ');
                i += 1;
            }
            b'=' => {
                let hi = hex(*bytes.get(i + 1)?)?;
                let lo = hex(*bytes.get(i + 2)?)?;
                out.push((hi << 4) | lo);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Some(out)
}

/// Decodes an RFC 2231 extended value: `charset'language'percent-encoded`.
///
/// A value without the two quotes is treated as percent-encoded UTF-8.
#[must_use]
pub fn decode_rfc2231(value: &str) -> String {
    let (charset, encoded) = split_rfc2231_charset(value);
    decode_charset(charset, &percent_decode(encoded))
}

/// Splits `charset'lang'rest` into charset and rest.
pub(crate) fn split_rfc2231_charset(value: &str) -> (&str, &str) {
    let mut parts = value.splitn(3, '\'');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(charset), Some(_lang), Some(rest)) => (charset, rest),
        _ => ("utf-8", value),
    }
}

/// Percent-decodes a string; malformed escapes are kept literally.
pub(crate) fn percent_decode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (
                bytes.get(i + 1).copied().and_then(hex),
                bytes.get(i + 2).copied().and_then(hex),
            ) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
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

    #[test]
    fn test_base64_with_line_breaks() {
        assert_eq!(
            decode_base64(b"SWQsTmFt\r\nZQoxLEZl\r\nbGl4\r\n").unwrap(),
            b"Id,Name\n1,Felix"
        );
    }

    #[test]
    fn test_base64_padding_per_line() {
        assert_eq!(decode_base64(b"YQ==\r\nYg==\r\n").unwrap(), b"ab");
        assert_eq!(decode_base64(b"aGk=aGk=").unwrap(), b"hihi");
    }

    #[test]
    fn test_base64_missing_padding() {
        assert_eq!(decode_base64(b"aGk").unwrap(), b"hi");
    }

    #[test]
    fn test_base64_garbage() {
        assert!(decode_base64(b"not*base64!").is_err());
    }

    #[test]
    fn test_quoted_printable() {
        assert_eq!(decode_quoted_printable(b"H=C3=A9llo").unwrap(), "Héllo".as_bytes());
        assert_eq!(
            decode_quoted_printable(b"soft=\r\nbreak=  \nhere").unwrap(),
            b"softbreakhere"
        );
        assert_eq!(decode_quoted_printable(b"a\r\nb").unwrap(), b"a\r\nb");
    }

    #[test]
    fn test_quoted_printable_stray_equals_kept() {
        assert_eq!(decode_quoted_printable(b"1+1=2").unwrap(), b"1+1=2");
        assert_eq!(decode_quoted_printable(b"bad=ZZ").unwrap(), b"bad=ZZ");
        assert_eq!(decode_quoted_printable(b"a=3D=4").unwrap(), b"a==4");
    }

    #[test]
    fn test_rfc2047_b_and_q() {
        assert_eq!(decode_rfc2047("=?utf-8?B?SMOpbGxv?="), "Héllo");
        assert_eq!(decode_rfc2047("=?UTF-8?Q?r=C3=A9sum=C3=A9_final.pdf?="), "résumé final.pdf");
    }

    #[test]
    fn test_rfc2047_adjacent_words_join() {
        assert_eq!(
            decode_rfc2047("=?utf-8?Q?test?= =?utf-8?Q?1.csv?="),
            "test1.csv"
        );
        assert_eq!(
            decode_rfc2047("Re: =?utf-8?Q?caf=C3=A9?= menu"),
            "Re: café menu"
        );
    }

    #[test]
    fn test_rfc2047_latin1() {
        assert_eq!(decode_rfc2047("=?iso-8859-1?Q?na=EFve.txt?="), "naïve.txt");
    }

    #[test]
    fn test_rfc2047_malformed_left_alone() {
        assert_eq!(decode_rfc2047("=?utf-8?X?abc?="), "=?utf-8?X?abc?=");
        assert_eq!(decode_rfc2047("plain = text"), "plain = text");
    }

    #[test]
    fn test_rfc2231_value() {
        assert_eq!(decode_rfc2231("utf-8''%E2%82%AC%20rates.csv"), "€ rates.csv");
        assert_eq!(decode_rfc2231("iso-8859-1'en'%E9t%E9.txt"), "été.txt");
        assert_eq!(decode_rfc2231("100%25"), "100%");
    }

    #[test]
    fn test_unknown_charset_falls_back() {
        assert_eq!(decode_charset("x-made-up", b"abc"), "abc");
    }

    proptest::proptest! {
        #[test]
        fn prop_decode_rfc2047_plain_ascii_unchanged(s in "[a-zA-Z0-9 .,_-]{0,40}") {
            proptest::prop_assert_eq!(decode_rfc2047(&s), s);
        }

        #[test]
        fn prop_qp_never_panics(data in proptest::collection::vec(proptest::num::u8::ANY, 0..128)) {
            let _ = decode_quoted_printable(&data);
        }
    }
}
