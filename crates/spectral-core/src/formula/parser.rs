//! Recursive-descent parser for catalog formulas.
//!
//! Grammar (Python operator precedence):
//!
//! ```text
//! expr   = term (('+' | '-') term)*
//! term   = unary (('*' | '/') unary)*
//! unary  = ('-' | '+') unary | power
//! power  = atom ('**' unary)?
//! atom   = number | ident | '(' expr ')'
//! ```
//!
//! `**` binds tighter than a leading minus (`-N ** 2` is `-(N ** 2)`) and is
//! right-associative (`2 ** 3 ** 2` is `2 ** 9`).

use super::lexer::{Token, TokenKind};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(String),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

pub(crate) struct Parser<'s> {
    src: &'s str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'s> Parser<'s> {
    pub fn new(src: &'s str, tokens: Vec<Token>) -> Self {
        Self { src, tokens, pos: 0 }
    }

    /// Parse the whole token stream as a single expression.
    pub fn parse(mut self) -> Result<Expr> {
        if self.tokens.is_empty() {
            return Err(self.error(0, "empty formula"));
        }
        let expr = self.parse_expr()?;
        if let Some(tok) = self.peek() {
            return Err(self.error(tok.pos, format!("unexpected {:?} after expression", tok.kind)));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn end_pos(&self) -> usize {
        self.src.len()
    }

    fn error(&self, position: usize, message: impl Into<String>) -> Error {
        Error::Formula {
            formula: self.src.to_string(),
            position,
            message: message.into(),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek_kind() {
            Some(TokenKind::Minus) => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            Some(TokenKind::Plus) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_atom()?;
        if let Some(TokenKind::Pow) = self.peek_kind() {
            self.advance();
            // Right operand goes back through unary so `2 ** -1` and
            // `2 ** 3 ** 2` both parse.
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        let Some(tok) = self.advance() else {
            return Err(self.error(self.end_pos(), "unexpected end of formula"));
        };
        match tok.kind {
            TokenKind::Number(n) => Ok(Expr::Num(n)),
            TokenKind::Ident(name) => Ok(Expr::Var(name)),
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some(Token { kind: TokenKind::RParen, .. }) => Ok(inner),
                    Some(other) => Err(self.error(other.pos, "expected closing parenthesis")),
                    None => Err(self.error(self.end_pos(), "expected closing parenthesis")),
                }
            }
            other => Err(self.error(tok.pos, format!("unexpected {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse(src: &str) -> Result<Expr> {
        Parser::new(src, tokenize(src)?).parse()
    }

    fn var(n: &str) -> Box<Expr> {
        Box::new(Expr::Var(n.into()))
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let e = parse("N + R * L").unwrap();
        assert_eq!(
            e,
            Expr::Binary {
                op: BinOp::Add,
                left: var("N"),
                right: Box::new(Expr::Binary { op: BinOp::Mul, left: var("R"), right: var("L") }),
            }
        );
    }

    #[test]
    fn leading_minus_applies_after_power() {
        let e = parse("-N ** 2").unwrap();
        assert_eq!(
            e,
            Expr::Neg(Box::new(Expr::Binary {
                op: BinOp::Pow,
                left: var("N"),
                right: Box::new(Expr::Num(2.0)),
            }))
        );
    }

    #[test]
    fn unbalanced_parenthesis_is_an_error() {
        assert!(matches!(parse("(N - R"), Err(Error::Formula { .. })));
        assert!(matches!(parse("N - R)"), Err(Error::Formula { .. })));
    }

    #[test]
    fn dangling_operator_is_an_error() {
        match parse("N -") {
            Err(Error::Formula { position, message, .. }) => {
                assert_eq!(position, 3);
                assert!(message.contains("end of formula"));
            }
            other => panic!("expected formula error, got {other:?}"),
        }
    }

    #[test]
    fn empty_formula_is_an_error() {
        assert!(parse("   ").is_err());
    }
}
