//! IMAP protocol parser.
//!
//! A sans-I/O parser for server responses: it works on one complete response
//! (literals included) and never touches the network.
//!
//! # Example
//!
//! ```
//! use mailsift_imap::parser::{Response, ResponseParser, UntaggedResponse};
//!
//! let response = ResponseParser::parse(b"* OK IMAP4rev1 server ready\r\n").unwrap();
//! match response {
//!     Response::Untagged(UntaggedResponse::Ok { text, .. }) => {
//!         assert!(text.contains("IMAP4rev1"));
//!     }
//!     _ => panic!("expected untagged OK"),
//! }
//! ```

pub mod lexer;
pub mod response;

pub use lexer::{Lexer, Token};
pub use response::{FetchItem, Response, ResponseParser, UntaggedResponse};
