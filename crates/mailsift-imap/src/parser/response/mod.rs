//! IMAP response parser.

#![allow(clippy::missing_errors_doc)]

mod fetch;
mod helpers;
mod types;

pub use types::{FetchItem, UntaggedResponse};

use crate::parser::lexer::{Lexer, Token};
use crate::types::{ResponseCode, SeqNum, Status, Tag};
use crate::{Error, Result};

use helpers::{parse_capability_data, parse_flag_list, parse_response_code, parse_search_response};

/// A parsed IMAP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Tagged response (command completion).
    Tagged {
        /// The command tag.
        tag: Tag,
        /// Response status.
        status: Status,
        /// Optional response code.
        code: Option<ResponseCode>,
        /// Human-readable text.
        text: String,
    },
    /// Untagged response (server data).
    Untagged(UntaggedResponse),
    /// Continuation request.
    Continuation {
        /// Optional text.
        text: Option<String>,
    },
}

/// Response parser.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses one complete response.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut lexer = Lexer::new(input);

        match lexer.next_token()? {
            Token::Asterisk => Self::parse_untagged(&mut lexer),
            Token::Plus => Ok(Self::parse_continuation(&mut lexer)),
            Token::Atom(tag) => Self::parse_tagged(&mut lexer, tag),
            token => Err(Error::Parse {
                position: 0,
                message: format!("expected *, + or tag, got {token:?}"),
            }),
        }
    }

    fn parse_tagged(lexer: &mut Lexer<'_>, tag: &str) -> Result<Response> {
        lexer.expect_space()?;
        let status = Self::parse_status(lexer)?;
        let (code, text) = Self::parse_resp_text(lexer)?;
        Ok(Response::Tagged {
            tag: Tag::new(tag),
            status,
            code,
            text,
        })
    }

    fn parse_untagged(lexer: &mut Lexer<'_>) -> Result<Response> {
        lexer.expect_space()?;

        let untagged = match lexer.next_token()? {
            Token::Atom(keyword) => {
                let upper = keyword.to_ascii_uppercase();
                if let Some(status) = Status::parse(&upper) {
                    let (code, text) = Self::parse_resp_text(lexer)?;
                    match status {
                        Status::Ok => UntaggedResponse::Ok { code, text },
                        Status::No => UntaggedResponse::No { code, text },
                        Status::Bad => UntaggedResponse::Bad { code, text },
                        Status::PreAuth => UntaggedResponse::PreAuth { code, text },
                        Status::Bye => UntaggedResponse::Bye { code, text },
                    }
                } else {
                    match upper.as_str() {
                        "CAPABILITY" => UntaggedResponse::Capability(parse_capability_data(lexer)?),
                        "FLAGS" => {
                            lexer.expect_space()?;
                            UntaggedResponse::Flags(parse_flag_list(lexer)?)
                        }
                        "SEARCH" => UntaggedResponse::Search(parse_search_response(lexer)?),
                        _ => UntaggedResponse::Other { keyword: upper },
                    }
                }
            }
            Token::Number(n) => {
                lexer.expect_space()?;
                let keyword = lexer.read_atom()?.to_ascii_uppercase();
                match keyword.as_str() {
                    "EXISTS" => UntaggedResponse::Exists(n),
                    "RECENT" => UntaggedResponse::Recent(n),
                    "EXPUNGE" => UntaggedResponse::Expunge(Self::seq(lexer, n)?),
                    "FETCH" => {
                        let seq = Self::seq(lexer, n)?;
                        lexer.expect_space()?;
                        let items = fetch::parse_fetch_response(lexer)?;
                        UntaggedResponse::Fetch { seq, items }
                    }
                    _ => UntaggedResponse::Other { keyword },
                }
            }
            token => {
                return Err(lexer.error(&format!("unexpected token in untagged response: {token:?}")));
            }
        };

        Ok(Response::Untagged(untagged))
    }

    fn seq(lexer: &Lexer<'_>, n: u32) -> Result<SeqNum> {
        SeqNum::new(n).ok_or_else(|| lexer.error("invalid sequence number 0"))
    }

    fn parse_continuation(lexer: &mut Lexer<'_>) -> Response {
        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }
        let text = lexer.read_text_until_crlf();
        Response::Continuation {
            text: (!text.is_empty()).then_some(text),
        }
    }

    fn parse_status(lexer: &mut Lexer<'_>) -> Result<Status> {
        let s = lexer.read_atom()?;
        Status::parse(s).ok_or_else(|| lexer.error(&format!("invalid status: {s}")))
    }

    /// Parses `[code] text` after a status keyword. The leading space is
    /// optional because some servers send a bare `A1 OK\r\n`.
    fn parse_resp_text(lexer: &mut Lexer<'_>) -> Result<(Option<ResponseCode>, String)> {
        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }
        let code = if lexer.peek() == Some(b'[') {
            Some(parse_response_code(lexer)?)
        } else {
            None
        };
        if lexer.peek() == Some(b' ') {
            lexer.advance();
        }
        Ok((code, lexer.read_text_until_crlf()))
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
    use crate::types::Capability;

    use super::*;

    #[test]
    fn test_parse_greeting() {
        let response = ResponseParser::parse(b"* OK IMAP4rev1 server ready\r\n").unwrap();
        match response {
            Response::Untagged(UntaggedResponse::Ok { code, text }) => {
                assert!(code.is_none());
                assert_eq!(text, "IMAP4rev1 server ready");
            }
            _ => panic!("expected untagged OK"),
        }
    }

    #[test]
    fn test_parse_tagged_no_with_code() {
        let response =
            ResponseParser::parse(b"A0001 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n")
                .unwrap();
        assert_eq!(
            response,
            Response::Tagged {
                tag: Tag::new("A0001"),
                status: Status::No,
                code: Some(ResponseCode::AuthenticationFailed),
                text: "Invalid credentials".into(),
            }
        );
    }

    #[test]
    fn test_parse_bare_tagged_ok() {
        let response = ResponseParser::parse(b"A0002 OK\r\n").unwrap();
        assert!(matches!(
            response,
            Response::Tagged {
                status: Status::Ok,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_capability() {
        let response =
            ResponseParser::parse(b"* CAPABILITY IMAP4rev1 STARTTLS AUTH=PLAIN\r\n").unwrap();
        let Response::Untagged(UntaggedResponse::Capability(caps)) = response else {
            panic!("expected capability");
        };
        assert!(caps.contains(&Capability::StartTls));
        assert!(caps.contains(&Capability::Auth("PLAIN".into())));
    }

    #[test]
    fn test_parse_exists_and_search() {
        assert_eq!(
            ResponseParser::parse(b"* 23 EXISTS\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Exists(23))
        );
        let Response::Untagged(UntaggedResponse::Search(nums)) =
            ResponseParser::parse(b"* SEARCH 4 9\r\n").unwrap()
        else {
            panic!("expected search");
        };
        assert_eq!(nums.len(), 2);
    }

    #[test]
    fn test_parse_empty_search() {
        assert_eq!(
            ResponseParser::parse(b"* SEARCH\r\n").unwrap(),
            Response::Untagged(UntaggedResponse::Search(vec![]))
        );
    }

    #[test]
    fn test_parse_fetch_with_literal() {
        let response = ResponseParser::parse(b"* 1 FETCH (BODY[] {5}\r\nhello)\r\n").unwrap();
        let Response::Untagged(UntaggedResponse::Fetch { seq, items }) = response else {
            panic!("expected fetch");
        };
        assert_eq!(seq.get(), 1);
        assert_eq!(
            items,
            vec![FetchItem::Body {
                section: None,
                origin: None,
                data: Some(bytes::Bytes::from_static(b"hello")),
            }]
        );
    }

    #[test]
    fn test_unknown_untagged_is_kept() {
        let response = ResponseParser::parse(b"* LIST (\\HasNoChildren) \"/\" INBOX\r\n").unwrap();
        assert_eq!(
            response,
            Response::Untagged(UntaggedResponse::Other {
                keyword: "LIST".into()
            })
        );
    }

    #[test]
    fn test_continuation() {
        assert_eq!(
            ResponseParser::parse(b"+ Ready for literal\r\n").unwrap(),
            Response::Continuation {
                text: Some("Ready for literal".into())
            }
        );
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            ResponseParser::parse(b")oops\r\n"),
            Err(Error::Parse { .. })
        ));
    }

    proptest::proptest! {
        #[test]
        fn prop_parse_never_panics(input in proptest::collection::vec(proptest::num::u8::ANY, 0..256)) {
            let _ = ResponseParser::parse(&input);
        }

        #[test]
        fn prop_tagged_text_survives(text in "[a-zA-Z0-9.,!?-][ -~]{0,59}") {
            let line = format!("A0001 OK {text}\r\n");
            let response = ResponseParser::parse(line.as_bytes()).unwrap();
            proptest::prop_assert_eq!(
                response,
                Response::Tagged {
                    tag: Tag::new("A0001"),
                    status: Status::Ok,
                    code: None,
                    text,
                }
            );
        }
    }
}
