//! Symbol rewriting: parameter names to positional input references.
//!
//! Replacement is token-based, so only whole identifiers are touched and a
//! parameter whose name is a prefix of another (`lhs` vs `lhs_2`) can never
//! be corrupted. Everything between tokens is preserved byte for byte.

use logos::Logos;

use crate::error::RewriteError;
use crate::lex::Token;

/// The reserved handle that rewritten references index into.
pub const INPUT_HANDLE: &str = "input_expr";

/// Split a raw tuple expression on depth-zero commas, one segment per
/// output.
pub fn split_top_level(raw: &str) -> Result<Vec<String>, RewriteError> {
    let mut segments = Vec::new();
    let mut depth = 0i32;
    let mut segment_start = 0;
    let mut lexer = Token::lexer(raw);
    while let Some(token) = lexer.next() {
        match token {
            Token::Open | Token::BracketOpen => depth += 1,
            Token::Close | Token::BracketClose => depth -= 1,
            Token::Comma if depth == 0 => {
                segments.push(&raw[segment_start..lexer.span().start]);
                segment_start = lexer.span().end;
            }
            Token::Error => {
                return Err(RewriteError::UnsupportedToken(lexer.slice().to_string()));
            }
            _ => {}
        }
    }
    segments.push(&raw[segment_start..]);

    segments
        .into_iter()
        .map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() {
                Err(RewriteError::EmptySubExpression)
            } else {
                Ok(segment.to_string())
            }
        })
        .collect()
}

/// Rewrite every parameter identifier into `input_expr[i]`, `i` being the
/// parameter's position. Any other identifier is a free variable and is
/// rejected.
pub fn rewrite_expression(expr: &str, params: &[String]) -> Result<String, RewriteError> {
    let mut rewritten = String::with_capacity(expr.len());
    let mut copied_to = 0;
    let mut lexer = Token::lexer(expr);
    while let Some(token) = lexer.next() {
        let span = lexer.span();
        rewritten.push_str(&expr[copied_to..span.start]);
        copied_to = span.end;
        match token {
            Token::Ident => {
                let ident = lexer.slice();
                if ident == INPUT_HANDLE {
                    return Err(RewriteError::ReservedIdentifier);
                }
                match params.iter().position(|param| param == ident) {
                    Some(position) => {
                        rewritten.push_str(&format!("{INPUT_HANDLE}[{position}]"));
                    }
                    None => return Err(RewriteError::FreeVariable(ident.to_string())),
                }
            }
            Token::Error => {
                return Err(RewriteError::UnsupportedToken(lexer.slice().to_string()));
            }
            _ => rewritten.push_str(lexer.slice()),
        }
    }
    rewritten.push_str(&expr[copied_to..]);
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_positional_references() {
        let rewritten = rewrite_expression("(a + b) * c", &params(&["a", "b", "c"])).unwrap();
        assert_eq!(rewritten, "(input_expr[0] + input_expr[1]) * input_expr[2]");
    }

    #[test]
    fn test_prefix_names_are_not_corrupted() {
        // `lhs` is a strict prefix of `lhs_2`; each occurrence must map to
        // its own position.
        let rewritten = rewrite_expression("lhs_2 + lhs", &params(&["lhs", "lhs_2"])).unwrap();
        assert_eq!(rewritten, "input_expr[1] + input_expr[0]");
    }

    #[test]
    fn test_spacing_preserved() {
        let rewritten = rewrite_expression("a+b  * 2", &params(&["a", "b"])).unwrap();
        assert_eq!(rewritten, "input_expr[0]+input_expr[1]  * 2");
    }

    #[test]
    fn test_free_variable_rejected() {
        assert_eq!(
            rewrite_expression("a + missing", &params(&["a"])).unwrap_err(),
            RewriteError::FreeVariable("missing".to_string())
        );
    }

    #[test]
    fn test_reserved_handle_rejected() {
        assert_eq!(
            rewrite_expression("input_expr + a", &params(&["a"])).unwrap_err(),
            RewriteError::ReservedIdentifier
        );
    }

    #[test]
    fn test_unsupported_text_rejected() {
        assert_eq!(
            rewrite_expression("a % b", &params(&["a", "b"])).unwrap_err(),
            RewriteError::UnsupportedToken("%".to_string())
        );
    }

    #[test]
    fn test_split_respects_nesting() {
        let segments = split_top_level("(a + b) * c, a * (b - c)").unwrap();
        assert_eq!(segments, ["(a + b) * c", "a * (b - c)"]);

        // No depth-zero comma: single segment.
        let segments = split_top_level("(a, b)").unwrap();
        assert_eq!(segments, ["(a, b)"]);
    }

    #[test]
    fn test_split_rejects_trailing_comma() {
        assert_eq!(
            split_top_level("a + b,").unwrap_err(),
            RewriteError::EmptySubExpression
        );
    }
}
