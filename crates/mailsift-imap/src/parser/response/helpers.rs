//! Parser helper functions.

use crate::parser::lexer::{Lexer, Token};
use crate::types::{Capability, ResponseCode, SeqNum};
use crate::Result;

/// Parses a `[code]` response code.
pub fn parse_response_code(lexer: &mut Lexer<'_>) -> Result<ResponseCode> {
    lexer.expect(Token::LBracket)?;

    let atom = lexer.read_atom()?;
    let code = match atom.to_ascii_uppercase().as_str() {
        "ALERT" => ResponseCode::Alert,
        "AUTHENTICATIONFAILED" => ResponseCode::AuthenticationFailed,
        "NONEXISTENT" => ResponseCode::Nonexistent,
        "PARSE" => ResponseCode::Parse,
        "READ-ONLY" => ResponseCode::ReadOnly,
        "READ-WRITE" => ResponseCode::ReadWrite,
        "TRYCREATE" => ResponseCode::TryCreate,
        "UIDNEXT" => {
            lexer.expect_space()?;
            ResponseCode::UidNext(lexer.read_number()?)
        }
        "UIDVALIDITY" => {
            lexer.expect_space()?;
            ResponseCode::UidValidity(lexer.read_number()?)
        }
        "UNSEEN" => {
            lexer.expect_space()?;
            ResponseCode::Unseen(lexer.read_number()?)
        }
        "CAPABILITY" => ResponseCode::Capability(parse_capability_data(lexer)?),
        _ => ResponseCode::Unknown(atom.to_string()),
    };

    // Skip whatever arguments an unknown code carries.
    while lexer.peek() != Some(b']') && !lexer.is_eof() {
        lexer.advance();
    }
    lexer.expect(Token::RBracket)?;

    Ok(code)
}

/// Parses space-separated capability atoms.
pub fn parse_capability_data(lexer: &mut Lexer<'_>) -> Result<Vec<Capability>> {
    let mut caps = Vec::new();
    while lexer.peek() == Some(b' ') {
        lexer.advance();
        match lexer.next_token()? {
            Token::Atom(s) => caps.push(Capability::parse(s)),
            Token::Number(n) => caps.push(Capability::Other(n.to_string())),
            _ => break,
        }
    }
    Ok(caps)
}

/// Parses a parenthesized flag list.
pub fn parse_flag_list(lexer: &mut Lexer<'_>) -> Result<Vec<String>> {
    lexer.expect(Token::LParen)?;
    let mut flags = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(s) => flags.push(s.to_string()),
            // `\*` lexes as a lone `\` atom followed by an asterisk.
            Token::Asterisk => match flags.last_mut() {
                Some(last) if last == "\\" => last.push('*'),
                _ => flags.push("*".to_string()),
            },
            token => {
                return Err(lexer.error(&format!("unexpected token in flag list: {token:?}")));
            }
        }
    }
    Ok(flags)
}

/// Parses the numbers of a SEARCH response; zeros are dropped.
pub fn parse_search_response(lexer: &mut Lexer<'_>) -> Result<Vec<SeqNum>> {
    let mut nums = Vec::new();
    while lexer.peek() == Some(b' ') {
        lexer.advance();
        match lexer.next_token()? {
            Token::Number(n) => nums.extend(SeqNum::new(n)),
            // Trailing space before CRLF, or a MODSEQ clause we do not request.
            _ => break,
        }
    }
    Ok(nums)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_uidvalidity_code() {
        let mut lexer = Lexer::new(b"[UIDVALIDITY 3857529045]");
        assert_eq!(
            parse_response_code(&mut lexer).unwrap(),
            ResponseCode::UidValidity(3_857_529_045)
        );
    }

    #[test]
    fn test_unknown_code_skips_arguments() {
        let mut lexer = Lexer::new(b"[PERMANENTFLAGS (\\Deleted \\Seen \\*)] rest");
        assert_eq!(
            parse_response_code(&mut lexer).unwrap(),
            ResponseCode::Unknown("PERMANENTFLAGS".into())
        );
        assert_eq!(lexer.read_text_until_crlf(), " rest");
    }

    #[test]
    fn test_flag_list() {
        let mut lexer = Lexer::new(b"(\\Answered \\Seen $Forwarded)");
        assert_eq!(
            parse_flag_list(&mut lexer).unwrap(),
            vec!["\\Answered", "\\Seen", "$Forwarded"]
        );
    }

    #[test]
    fn test_search_numbers() {
        let mut lexer = Lexer::new(b" 2 3 5\r\n");
        let nums: Vec<u32> = parse_search_response(&mut lexer)
            .unwrap()
            .into_iter()
            .map(SeqNum::get)
            .collect();
        assert_eq!(nums, vec![2, 3, 5]);
    }
}
