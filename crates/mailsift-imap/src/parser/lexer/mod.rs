//! IMAP lexer for tokenizing server responses.
//!
//! Breaks one complete response (as delivered by the framed stream, literals
//! included) into tokens for the response parser.

#![allow(clippy::missing_errors_doc)]

mod token;

pub use token::Token;

use crate::{Error, Result};

/// IMAP lexer state.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Returns the current position in the input.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns true if at end of input.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peeks at the current byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Advances by one byte and returns it.
    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Reads the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let Some(byte) = self.peek() else {
            return Ok(Token::Eof);
        };

        let single = match byte {
            b' ' => Some(Token::Space),
            b'(' => Some(Token::LParen),
            b')' => Some(Token::RParen),
            b'[' => Some(Token::LBracket),
            b']' => Some(Token::RBracket),
            b'*' => Some(Token::Asterisk),
            b'+' => Some(Token::Plus),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        match byte {
            b'\r' if self.peek_at(1) == Some(b'\n') => {
                self.skip(2);
                Ok(Token::Crlf)
            }
            b'\r' => Err(self.error("expected LF after CR")),
            b'"' => self.read_quoted_string(),
            b'{' => self.read_literal(),
            _ if is_atom_char(byte) => Ok(self.read_atom_or_number()),
            _ => Err(self.error(&format!("unexpected character: {byte:#04x}"))),
        }
    }

    fn read_quoted_string(&mut self) -> Result<Token<'a>> {
        self.advance();
        let mut out = Vec::new();

        loop {
            match self.advance() {
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(c @ (b'"' | b'\\')) => out.push(c),
                    Some(c) => return Err(self.error(&format!("invalid escape: \\{}", c as char))),
                    None => return Err(self.error("unexpected end of quoted string")),
                },
                Some(b'\r' | b'\n') | None => {
                    return Err(self.error("unterminated quoted string"));
                }
                Some(c) => out.push(c),
            }
        }

        String::from_utf8(out)
            .map(Token::QuotedString)
            .map_err(|_| self.error("invalid UTF-8 in quoted string"))
    }

    fn read_literal(&mut self) -> Result<Token<'a>> {
        self.advance();
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }
        let size: usize = std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| self.error("invalid literal size"))?;

        // LITERAL+ marker, only ever seen in client-to-server text but harmless.
        if self.peek() == Some(b'+') {
            self.advance();
        }
        if self.advance() != Some(b'}') {
            return Err(self.error("expected } after literal size"));
        }
        if self.advance() != Some(b'\r') || self.advance() != Some(b'\n') {
            return Err(self.error("expected CRLF after literal size"));
        }

        let end = self
            .pos
            .checked_add(size)
            .filter(|&end| end <= self.input.len())
            .ok_or_else(|| self.error("incomplete literal data"))?;
        let data = &self.input[self.pos..end];
        self.pos = end;
        Ok(Token::Literal(data))
    }

    fn read_atom_or_number(&mut self) -> Token<'a> {
        let start = self.pos;
        while self.peek().is_some_and(is_atom_char) {
            self.advance();
        }
        let bytes = &self.input[start..self.pos];
        // Atom chars are a subset of ASCII.
        let s = std::str::from_utf8(bytes).unwrap_or_default();

        if bytes.iter().all(u8::is_ascii_digit) {
            if let Ok(n) = s.parse() {
                return Token::Number(n);
            }
        }
        if s.eq_ignore_ascii_case("NIL") {
            Token::Nil
        } else {
            Token::Atom(s)
        }
    }

    /// Creates a parse error at the current position.
    pub(crate) fn error(&self, message: &str) -> Error {
        Error::Parse {
            position: self.pos,
            message: message.to_string(),
        }
    }

    /// Expects and consumes a specific kind of token.
    #[allow(clippy::needless_pass_by_value)]
    pub fn expect(&mut self, expected: Token<'_>) -> Result<()> {
        let token = self.next_token()?;
        if std::mem::discriminant(&token) == std::mem::discriminant(&expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {expected:?}, got {token:?}")))
        }
    }

    /// Expects and consumes a space.
    pub fn expect_space(&mut self) -> Result<()> {
        self.expect(Token::Space)
    }

    /// Reads a number.
    pub fn read_number(&mut self) -> Result<u32> {
        match self.next_token()? {
            Token::Number(n) => Ok(n),
            token => Err(self.error(&format!("expected number, got {token:?}"))),
        }
    }

    /// Reads an atom and returns it as a string slice.
    pub fn read_atom(&mut self) -> Result<&'a str> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s),
            token => Err(self.error(&format!("expected atom, got {token:?}"))),
        }
    }

    /// Consumes everything up to (not including) the next CRLF and returns
    /// it as text, replacing invalid UTF-8.
    pub fn read_text_until_crlf(&mut self) -> String {
        let start = self.pos;
        while !self.is_eof() && !(self.peek() == Some(b'\r') && self.peek_at(1) == Some(b'\n')) {
            self.advance();
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }
}

/// Returns true for bytes allowed in an atom.
///
/// `\` is allowed so that flags like `\Seen` lex as one atom; `[` and `]`
/// are excluded so `BODY[` splits into `BODY` and a bracket.
#[must_use]
pub const fn is_atom_char(b: u8) -> bool {
    b > 0x20
        && b < 0x7F
        && !matches!(b, b'(' | b')' | b'{' | b'"' | b'%' | b'*' | b'[' | b']')
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

    fn tokens(input: &[u8]) -> Vec<Token<'_>> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token == Token::Eof {
                break;
            }
            out.push(token);
        }
        out
    }

    #[test]
    fn test_untagged_line() {
        assert_eq!(
            tokens(b"* 12 EXISTS\r\n"),
            vec![
                Token::Asterisk,
                Token::Space,
                Token::Number(12),
                Token::Space,
                Token::Atom("EXISTS"),
                Token::Crlf,
            ]
        );
    }

    #[test]
    fn test_quoted_string_escapes() {
        assert_eq!(
            tokens(br#""say \"hi\" \\ now""#),
            vec![Token::QuotedString(r#"say "hi" \ now"#.to_string())]
        );
    }

    #[test]
    fn test_unterminated_quoted_string() {
        let mut lexer = Lexer::new(b"\"abc\r\n");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn test_literal_borrows_payload() {
        let input = b"{5}\r\nhello)";
        let toks = tokens(input);
        assert_eq!(toks[0], Token::Literal(b"hello"));
        assert_eq!(toks[1], Token::RParen);
    }

    #[test]
    fn test_literal_may_contain_crlf() {
        let toks = tokens(b"{4}\r\na\r\nb");
        assert_eq!(toks, vec![Token::Literal(b"a\r\nb")]);
    }

    #[test]
    fn test_incomplete_literal() {
        let mut lexer = Lexer::new(b"{10}\r\nshort");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn test_nil_and_flags() {
        assert_eq!(
            tokens(b"nil \\Seen"),
            vec![Token::Nil, Token::Space, Token::Atom("\\Seen")]
        );
    }

    #[test]
    fn test_body_section_splits() {
        assert_eq!(
            tokens(b"BODY[]"),
            vec![Token::Atom("BODY"), Token::LBracket, Token::RBracket]
        );
    }

    #[test]
    fn test_number_overflow_becomes_atom() {
        assert_eq!(tokens(b"99999999999"), vec![Token::Atom("99999999999")]);
    }

    #[test]
    fn test_text_until_crlf() {
        let mut lexer = Lexer::new(b"LOGIN completed\r\n");
        assert_eq!(lexer.read_text_until_crlf(), "LOGIN completed");
        assert_eq!(lexer.next_token().unwrap(), Token::Crlf);
    }
}
