//! Expression lexer.

use logos::Logos;

#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Token {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,
    #[regex(r"[0-9]+")]
    Int,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEq,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,

    #[token("(")]
    Open,
    #[token(")")]
    Close,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(",")]
    Comma,

    // Logos requires one token variant to handle errors; whitespace is
    // skipped through it as well.
    #[error]
    #[regex(r"[ \t\r\n]+", logos::skip)]
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tokens() {
        let lexer = Token::lexer("(lhs_2 + 10) * input_expr[0] <= 2.5, a != b && c || d");
        let tokens: Vec<_> = lexer.collect();
        assert_eq!(
            tokens,
            [
                Token::Open,
                Token::Ident,
                Token::Plus,
                Token::Int,
                Token::Close,
                Token::Star,
                Token::Ident,
                Token::BracketOpen,
                Token::Int,
                Token::BracketClose,
                Token::LessEq,
                Token::Float,
                Token::Comma,
                Token::Ident,
                Token::NotEq,
                Token::Ident,
                Token::AndAnd,
                Token::Ident,
                Token::OrOr,
                Token::Ident,
            ]
        );
    }

    #[test]
    fn test_unsupported_text() {
        let lexer = Token::lexer("a % b");
        assert!(lexer.into_iter().any(|t| t == Token::Error));
    }
}
