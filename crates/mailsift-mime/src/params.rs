//! Header parameter lists (`; key=value; key="quoted value"`).
//!
//! Shared by Content-Type and Content-Disposition. Values are resolved with
//! RFC 2231 rules: `key*` extended values and `key*0`, `key*1*`, ...
//! continuations take precedence over a plain `key`.

use crate::encoding::{decode_charset, decode_rfc2047, percent_decode, split_rfc2231_charset};

/// Ordered parameter list with lower-cased keys and unquoted values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Splits `value; a=b; c="d; e"` into the leading value and the parameters.
    pub fn split(header: &str) -> (&str, Self) {
        let (head, rest) = match find_unquoted(header, b';') {
            Some(i) => (&header[..i], &header[i + 1..]),
            None => (header, ""),
        };
        (head.trim(), Self::parse(rest))
    }

    fn parse(mut rest: &str) -> Self {
        let mut params = Vec::new();
        while !rest.is_empty() {
            let end = find_unquoted(rest, b';').unwrap_or(rest.len());
            let item = rest[..end].trim();
            rest = rest.get(end + 1..).unwrap_or("");

            let Some((key, value)) = item.split_once('=') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            if key.is_empty() {
                continue;
            }
            params.push((key, unquote(value.trim())));
        }
        Self(params)
    }

    /// Raw value of a parameter, exactly as written (unquoted).
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Fully decoded value of a parameter.
    ///
    /// Tries `key*`, then `key*0`/`key*0*` continuations, then plain `key`
    /// with any RFC 2047 encoded words decoded.
    #[must_use]
    pub fn decoded(&self, key: &str) -> Option<String> {
        let key = key.to_ascii_lowercase();
        if let Some(ext) = self.raw(&format!("{key}*")) {
            let (charset, encoded) = split_rfc2231_charset(ext);
            return Some(decode_charset(charset, &percent_decode(encoded)));
        }
        if let Some(joined) = self.continuations(&key) {
            return Some(joined);
        }
        self.raw(&key).map(decode_rfc2047)
    }

    /// Joins `key*0`, `key*1`, ... (each optionally extended with a trailing `*`).
    fn continuations(&self, key: &str) -> Option<String> {
        let prefix = format!("{key}*");
        let mut segments: Vec<(u32, bool, &str)> = self
            .0
            .iter()
            .filter_map(|(k, v)| {
                let section = k.strip_prefix(&prefix)?;
                let (index, extended) = section
                    .strip_suffix('*')
                    .map_or((section, false), |s| (s, true));
                Some((index.parse().ok()?, extended, v.as_str()))
            })
            .collect();
        if segments.is_empty() {
            return None;
        }
        segments.sort_by_key(|(index, _, _)| *index);

        let mut charset = "utf-8";
        let mut bytes = Vec::new();
        for (position, (_, extended, value)) in segments.into_iter().enumerate() {
            if extended {
                let encoded = if position == 0 {
                    let (cs, rest) = split_rfc2231_charset(value);
                    charset = cs;
                    rest
                } else {
                    value
                };
                bytes.extend(percent_decode(encoded));
            } else {
                bytes.extend_from_slice(value.as_bytes());
            }
        }
        Some(decode_charset(charset, &bytes))
    }
}

/// Index of the first `needle` outside a quoted string.
fn find_unquoted(s: &str, needle: u8) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, b) in s.bytes().enumerate() {
        match b {
            _ if escaped => escaped = false,
            b'\\' if in_quotes => escaped = true,
            b'"' => in_quotes = !in_quotes,
            _ if b == needle && !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

/// Strips surrounding quotes and backslash escapes.
fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .map(|v| v.strip_suffix('"').unwrap_or(v))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_quoted_semicolon() {
        let (head, params) = Params::split(r#"attachment; filename="a;b.csv"; size=12"#);
        assert_eq!(head, "attachment");
        assert_eq!(params.raw("filename"), Some("a;b.csv"));
        assert_eq!(params.raw("SIZE"), Some("12"));
    }

    #[test]
    fn test_escaped_quote() {
        let (_, params) = Params::split(r#"inline; filename="say \"hi\".txt""#);
        assert_eq!(params.raw("filename"), Some(r#"say "hi".txt"#));
    }

    #[test]
    fn test_extended_beats_plain() {
        let (_, params) =
            Params::split("attachment; filename=fallback.csv; filename*=UTF-8''%C3%BCber.csv");
        assert_eq!(params.decoded("filename").as_deref(), Some("über.csv"));
    }

    #[test]
    fn test_continuations() {
        let (_, params) = Params::split(
            "attachment; filename*1*=%20part%20two.txt; filename*0*=utf-8''first; filename*2=\"!\"",
        );
        assert_eq!(
            params.decoded("filename").as_deref(),
            Some("first part two.txt!")
        );
    }

    #[test]
    fn test_plain_with_encoded_word() {
        let (_, params) = Params::split("attachment; filename=\"=?UTF-8?B?dGVzdDEuY3N2?=\"");
        assert_eq!(params.decoded("filename").as_deref(), Some("test1.csv"));
    }

    #[test]
    fn test_missing_value_ignored() {
        let (head, params) = Params::split("attachment; ; junk; filename=x");
        assert_eq!(head, "attachment");
        assert_eq!(params.decoded("filename").as_deref(), Some("x"));
    }
}
