//! Wire serialization helpers for command arguments.

use super::{FetchAttribute, FetchItems, SearchCriteria};
use crate::error::{Error, Result};

/// Writes an astring: bare atom when possible, quoted string otherwise.
pub fn write_astring(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    if s.bytes().any(|b| matches!(b, b'\r' | b'\n' | 0)) {
        return Err(Error::Protocol(
            "string argument contains CR, LF or NUL".to_string(),
        ));
    }
    if s.is_empty() || s.bytes().any(needs_quoting) {
        buf.push(b'"');
        for b in s.bytes() {
            if b == b'"' || b == b'\\' {
                buf.push(b'\\');
            }
            buf.push(b);
        }
        buf.push(b'"');
    } else {
        buf.extend_from_slice(s.as_bytes());
    }
    Ok(())
}

const fn needs_quoting(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*' | b']'
    ) || b < 0x20
        || b >= 0x7F
}

pub fn write_fetch_items(buf: &mut Vec<u8>, items: &FetchItems) {
    match items {
        FetchItems::Fast => buf.extend_from_slice(b"FAST"),
        FetchItems::Items(attrs) if attrs.len() == 1 => write_fetch_attribute(buf, &attrs[0]),
        FetchItems::Items(attrs) => {
            buf.push(b'(');
            for (i, attr) in attrs.iter().enumerate() {
                if i > 0 {
                    buf.push(b' ');
                }
                write_fetch_attribute(buf, attr);
            }
            buf.push(b')');
        }
    }
}

fn write_fetch_attribute(buf: &mut Vec<u8>, attr: &FetchAttribute) {
    match attr {
        FetchAttribute::Uid => buf.extend_from_slice(b"UID"),
        FetchAttribute::Flags => buf.extend_from_slice(b"FLAGS"),
        FetchAttribute::Rfc822Size => buf.extend_from_slice(b"RFC822.SIZE"),
        FetchAttribute::Body { section, peek } => {
            let keyword: &[u8] = if *peek { b"BODY.PEEK[" } else { b"BODY[" };
            buf.extend_from_slice(keyword);
            if let Some(s) = section {
                buf.extend_from_slice(s.as_bytes());
            }
            buf.push(b']');
        }
    }
}

pub fn write_search_criteria(buf: &mut Vec<u8>, criteria: &SearchCriteria) -> Result<()> {
    match criteria {
        SearchCriteria::All => buf.extend_from_slice(b"ALL"),
        SearchCriteria::Unseen => buf.extend_from_slice(b"UNSEEN"),
        SearchCriteria::Seen => buf.extend_from_slice(b"SEEN"),
        SearchCriteria::Subject(s) => {
            buf.extend_from_slice(b"SUBJECT ");
            write_astring(buf, s)?;
        }
        SearchCriteria::From(s) => {
            buf.extend_from_slice(b"FROM ");
            write_astring(buf, s)?;
        }
        SearchCriteria::And(all) => {
            buf.push(b'(');
            for (i, c) in all.iter().enumerate() {
                if i > 0 {
                    buf.push(b' ');
                }
                write_search_criteria(buf, c)?;
            }
            buf.push(b')');
        }
        SearchCriteria::Not(inner) => {
            buf.extend_from_slice(b"NOT ");
            write_search_criteria(buf, inner)?;
        }
    }
    Ok(())
}
