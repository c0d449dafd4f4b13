//! FETCH response parsing.

use bytes::Bytes;

use crate::parser::lexer::{Lexer, Token};
use crate::types::Uid;
use crate::Result;

use super::helpers::parse_flag_list;
use super::types::FetchItem;

/// Parses the parenthesized item list of a FETCH response.
pub fn parse_fetch_response(lexer: &mut Lexer<'_>) -> Result<Vec<FetchItem>> {
    lexer.expect(Token::LParen)?;
    let mut items = Vec::new();

    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(name) => match name.to_ascii_uppercase().as_str() {
                "UID" => {
                    lexer.expect_space()?;
                    let n = lexer.read_number()?;
                    let uid = Uid::new(n).ok_or_else(|| lexer.error("UID cannot be 0"))?;
                    items.push(FetchItem::Uid(uid));
                }
                "FLAGS" => {
                    lexer.expect_space()?;
                    items.push(FetchItem::Flags(parse_flag_list(lexer)?));
                }
                "RFC822.SIZE" => {
                    lexer.expect_space()?;
                    items.push(FetchItem::Rfc822Size(lexer.read_number()?));
                }
                "BODY" | "BODY.PEEK" | "RFC822" | "BINARY" => {
                    let (section, origin) = parse_section_and_origin(lexer)?;
                    lexer.expect_space()?;
                    let data = match lexer.next_token()? {
                        Token::Literal(d) => Some(Bytes::copy_from_slice(d)),
                        Token::QuotedString(s) => Some(Bytes::from(s)),
                        Token::Nil => None,
                        token => {
                            return Err(
                                lexer.error(&format!("expected body content, got {token:?}"))
                            );
                        }
                    };
                    items.push(FetchItem::Body {
                        section,
                        origin,
                        data,
                    });
                }
                _ => {
                    lexer.expect_space()?;
                    skip_value(lexer)?;
                }
            },
            token => return Err(lexer.error(&format!("unexpected token in FETCH: {token:?}"))),
        }
    }

    Ok(items)
}

/// Parses the optional `[section]` and `<origin>` after BODY.
///
/// The section is read byte-wise because it may hold characters the lexer
/// would split (`HEADER.FIELDS (FROM)`).
fn parse_section_and_origin(lexer: &mut Lexer<'_>) -> Result<(Option<String>, Option<u32>)> {
    let mut section = None;
    if lexer.peek() == Some(b'[') {
        lexer.advance();
        let mut buf = String::new();
        loop {
            match lexer.advance() {
                Some(b']') => break,
                Some(b) => buf.push(char::from(b)),
                None => return Err(lexer.error("unterminated body section")),
            }
        }
        if !buf.is_empty() {
            section = Some(buf);
        }
    }

    let mut origin = None;
    if lexer.peek() == Some(b'<') {
        lexer.advance();
        let mut n: u32 = 0;
        loop {
            match lexer.advance() {
                Some(b'>') => break,
                Some(d @ b'0'..=b'9') => {
                    n = n
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(u32::from(d - b'0')))
                        .ok_or_else(|| lexer.error("body origin out of range"))?;
                }
                _ => return Err(lexer.error("invalid body origin")),
            }
        }
        origin = Some(n);
    }

    Ok((section, origin))
}

/// Skips one value: a single token or a balanced parenthesized list.
fn skip_value(lexer: &mut Lexer<'_>) -> Result<()> {
    let mut depth = 0usize;
    loop {
        match lexer.next_token()? {
            Token::LParen => depth += 1,
            Token::RParen if depth > 0 => depth -= 1,
            Token::Eof | Token::Crlf | Token::RParen => {
                return Err(lexer.error("unexpected end of FETCH item"));
            }
            _ => {}
        }
        if depth == 0 {
            return Ok(());
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

    #[test]
    fn test_full_body_literal() {
        let mut lexer = Lexer::new(b"(UID 42 BODY[] {11}\r\nSubject: x)");
        let items = parse_fetch_response(&mut lexer).unwrap();
        assert_eq!(items[0], FetchItem::Uid(Uid::new(42).unwrap()));
        assert_eq!(
            items[1],
            FetchItem::Body {
                section: None,
                origin: None,
                data: Some(Bytes::from_static(b"Subject: x")),
            }
        );
    }

    #[test]
    fn test_section_and_origin() {
        let mut lexer = Lexer::new(b"(BODY[1.MIME]<0> \"abc\")");
        let items = parse_fetch_response(&mut lexer).unwrap();
        assert_eq!(
            items[0],
            FetchItem::Body {
                section: Some("1.MIME".into()),
                origin: Some(0),
                data: Some(Bytes::from_static(b"abc")),
            }
        );
    }

    #[test]
    fn test_nil_body() {
        let mut lexer = Lexer::new(b"(BODY[] NIL)");
        let items = parse_fetch_response(&mut lexer).unwrap();
        assert!(matches!(&items[0], FetchItem::Body { data: None, .. }));
    }

    #[test]
    fn test_unknown_items_skipped() {
        let mut lexer = Lexer::new(
            b"(INTERNALDATE \"17-Jul-1996 02:44:25 -0700\" ENVELOPE (NIL \"s\" ((NIL NIL \"a\" \"b\"))) RFC822.SIZE 44827)",
        );
        let items = parse_fetch_response(&mut lexer).unwrap();
        assert_eq!(items, vec![FetchItem::Rfc822Size(44827)]);
    }

    #[test]
    fn test_flags_item() {
        let mut lexer = Lexer::new(b"(FLAGS (\\Seen))");
        let items = parse_fetch_response(&mut lexer).unwrap();
        assert_eq!(items, vec![FetchItem::Flags(vec!["\\Seen".into()])]);
    }
}
