//! Lexer token types.

/// A token produced by the [`Lexer`](super::Lexer).
///
/// Atoms and literal payloads borrow from the input buffer; only quoted
/// strings allocate, because escapes have to be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Atom (unquoted string without special characters).
    Atom(&'a str),
    /// Quoted string with escapes resolved.
    QuotedString(String),
    /// Literal payload following a `{n}` prefix.
    Literal(&'a [u8]),
    /// Number.
    Number(u32),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// A single space.
    Space,
    /// `*`, the untagged response prefix.
    Asterisk,
    /// `+`, the continuation prefix.
    Plus,
    /// `NIL`
    Nil,
    /// CRLF line ending.
    Crlf,
    /// End of input.
    Eof,
}
