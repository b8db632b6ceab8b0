//! Recursive-descent parser for the expression language.
//!
//! Precedence, loosest first: `||`, `&&`, `== !=`, `< <= > >=`, `+ -`,
//! `* /`, unary `-`. Primaries are numeric literals, bare identifiers,
//! `input_expr[i]` references and parenthesized expressions.

use logos::{Logos, Span};

use crate::error::ParseError;
use crate::lex::Token;
use crate::rewrite::INPUT_HANDLE;

/// A parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Number(f64),
    /// Bare identifier, resolved against a named environment.
    Param(String),
    /// Positional reference produced by rewriting.
    InputRef(usize),
    Neg(Box<Ast>),
    Binary(BinOp, Box<Ast>, Box<Ast>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

struct Parser<'src> {
    src: &'src str,
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

/// Parse one expression; trailing tokens are an error.
pub fn parse_expression(src: &str) -> Result<Ast, ParseError> {
    let tokens: Vec<_> = Token::lexer(src).spanned().collect();
    let mut parser = Parser {
        src,
        tokens,
        pos: 0,
    };
    let ast = parser.or_expr()?;
    match parser.peek() {
        None => Ok(ast),
        Some(_) => Err(ParseError::UnexpectedToken(parser.slice().to_string())),
    }
}

impl<'src> Parser<'src> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(token, _)| *token)
    }

    fn slice(&self) -> &'src str {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| &self.src[span.clone()])
            .unwrap_or("")
    }

    fn bump(&mut self) -> Option<(Token, &'src str)> {
        let (token, span) = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        Some((token, &self.src[span]))
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), ParseError> {
        match self.peek() {
            Some(found) if found == token => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(ParseError::Expected {
                expected,
                found: self.slice().to_string(),
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn binary_chain(
        &mut self,
        operand: fn(&mut Self) -> Result<Ast, ParseError>,
        op_for: fn(Token) -> Option<BinOp>,
    ) -> Result<Ast, ParseError> {
        let mut lhs = operand(self)?;
        while let Some(op) = self.peek().and_then(op_for) {
            self.pos += 1;
            let rhs = operand(self)?;
            lhs = Ast::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn or_expr(&mut self) -> Result<Ast, ParseError> {
        self.binary_chain(Self::and_expr, |token| {
            (token == Token::OrOr).then_some(BinOp::Or)
        })
    }

    fn and_expr(&mut self) -> Result<Ast, ParseError> {
        self.binary_chain(Self::equality, |token| {
            (token == Token::AndAnd).then_some(BinOp::And)
        })
    }

    fn equality(&mut self) -> Result<Ast, ParseError> {
        self.binary_chain(Self::comparison, |token| match token {
            Token::EqEq => Some(BinOp::Eq),
            Token::NotEq => Some(BinOp::Ne),
            _ => None,
        })
    }

    fn comparison(&mut self) -> Result<Ast, ParseError> {
        self.binary_chain(Self::additive, |token| match token {
            Token::Less => Some(BinOp::Lt),
            Token::LessEq => Some(BinOp::Le),
            Token::Greater => Some(BinOp::Gt),
            Token::GreaterEq => Some(BinOp::Ge),
            _ => None,
        })
    }

    fn additive(&mut self) -> Result<Ast, ParseError> {
        self.binary_chain(Self::multiplicative, |token| match token {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    fn multiplicative(&mut self) -> Result<Ast, ParseError> {
        self.binary_chain(Self::unary, |token| match token {
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            _ => None,
        })
    }

    fn unary(&mut self) -> Result<Ast, ParseError> {
        if self.peek() == Some(Token::Minus) {
            self.pos += 1;
            return Ok(Ast::Neg(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Ast, ParseError> {
        let (token, slice) = self.bump().ok_or(ParseError::UnexpectedEnd)?;
        match token {
            Token::Int | Token::Float => slice
                .parse::<f64>()
                .map(Ast::Number)
                .map_err(|_| ParseError::InvalidNumber(slice.to_string())),
            Token::Ident if slice == INPUT_HANDLE => {
                self.expect(Token::BracketOpen, "'['")?;
                let (token, index) = self.bump().ok_or(ParseError::UnexpectedEnd)?;
                if token != Token::Int {
                    return Err(ParseError::Expected {
                        expected: "input index",
                        found: index.to_string(),
                    });
                }
                let index = index
                    .parse::<usize>()
                    .map_err(|_| ParseError::InvalidNumber(index.to_string()))?;
                self.expect(Token::BracketClose, "']'")?;
                Ok(Ast::InputRef(index))
            }
            Token::Ident => Ok(Ast::Param(slice.to_string())),
            Token::Open => {
                let inner = self.or_expr()?;
                self.expect(Token::Close, "')'")?;
                Ok(inner)
            }
            _ => Err(ParseError::UnexpectedToken(slice.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let ast = parse_expression("1 + 2 * 3").unwrap();
        assert_eq!(
            ast,
            Ast::Binary(
                BinOp::Add,
                Box::new(Ast::Number(1.0)),
                Box::new(Ast::Binary(
                    BinOp::Mul,
                    Box::new(Ast::Number(2.0)),
                    Box::new(Ast::Number(3.0))
                ))
            )
        );
    }

    #[test]
    fn test_comparison_binds_looser_than_arithmetic() {
        let ast = parse_expression("a + 1 <= b * 2").unwrap();
        match ast {
            Ast::Binary(BinOp::Le, _, _) => {}
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn test_input_reference() {
        let ast = parse_expression("input_expr[2] - input_expr[0]").unwrap();
        assert_eq!(
            ast,
            Ast::Binary(
                BinOp::Sub,
                Box::new(Ast::InputRef(2)),
                Box::new(Ast::InputRef(0))
            )
        );
    }

    #[test]
    fn test_unary_minus() {
        let ast = parse_expression("-a * b").unwrap();
        match ast {
            Ast::Binary(BinOp::Mul, lhs, _) => {
                assert_eq!(*lhs, Ast::Neg(Box::new(Ast::Param("a".to_string()))));
            }
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_paren() {
        assert_eq!(
            parse_expression("(a + b").unwrap_err(),
            ParseError::UnexpectedEnd
        );
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert_eq!(
            parse_expression("a b").unwrap_err(),
            ParseError::UnexpectedToken("b".to_string())
        );
    }
}
