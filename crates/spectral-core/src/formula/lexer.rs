use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    /// `**`
    Pow,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character in the source.
    pub pos: usize,
}

pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let kind = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'+' => {
                i += 1;
                TokenKind::Plus
            }
            b'-' => {
                i += 1;
                TokenKind::Minus
            }
            b'/' => {
                i += 1;
                TokenKind::Slash
            }
            b'(' => {
                i += 1;
                TokenKind::LParen
            }
            b')' => {
                i += 1;
                TokenKind::RParen
            }
            b'*' => {
                if bytes.get(i + 1) == Some(&b'*') {
                    i += 2;
                    TokenKind::Pow
                } else {
                    i += 1;
                    TokenKind::Star
                }
            }
            c if c.is_ascii_digit() || c == b'.' => {
                i = scan_number(bytes, i);
                let text = &src[start..i];
                let n = text.parse::<f64>().map_err(|_| Error::Formula {
                    formula: src.to_string(),
                    position: start,
                    message: format!("invalid number {text:?}"),
                })?;
                TokenKind::Number(n)
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                TokenKind::Ident(src[start..i].to_string())
            }
            _ => {
                let ch = src[start..].chars().next().unwrap_or('?');
                return Err(Error::Formula {
                    formula: src.to_string(),
                    position: start,
                    message: format!("unexpected character {ch:?}"),
                });
            }
        };
        tokens.push(Token { kind, pos: start });
    }

    Ok(tokens)
}

/// Digits with an optional fraction and an optional `e[+-]digits` exponent.
fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn double_star_is_power_not_two_multiplies() {
        assert_eq!(
            kinds("N**2*R"),
            vec![
                TokenKind::Ident("N".into()),
                TokenKind::Pow,
                TokenKind::Number(2.0),
                TokenKind::Star,
                TokenKind::Ident("R".into()),
            ]
        );
    }

    #[test]
    fn numbers_with_exponent() {
        assert_eq!(kinds("1.5e-3"), vec![TokenKind::Number(0.0015)]);
        assert_eq!(kinds("2E2"), vec![TokenKind::Number(200.0)]);
    }

    #[test]
    fn identifiers_keep_digits_and_case() {
        assert_eq!(
            kinds("RE1 + lambdaN"),
            vec![
                TokenKind::Ident("RE1".into()),
                TokenKind::Plus,
                TokenKind::Ident("lambdaN".into()),
            ]
        );
    }

    #[test]
    fn unexpected_character_reports_offset() {
        match tokenize("N + $R") {
            Err(Error::Formula { position, .. }) => assert_eq!(position, 4),
            other => panic!("expected formula error, got {other:?}"),
        }
    }
}
