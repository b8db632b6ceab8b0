//! Expression extraction from function source text.
//!
//! The harness accepts the source of a single-expression function,
//!
//! ```text
//! fn cal(a, b, c) {
//!     return (a + b) * c, a * (b - c)
//! }
//! ```
//!
//! and recovers the ordered parameter names and the text between the first
//! `return` and the end of that line. Anything past the line break is not
//! interpreted; preconditions that would make that a silent truncation
//! (a second `return`, a continuation line, block punctuation inside the
//! expression) are checked and rejected.

use crate::error::ExtractionError;

/// A function signature and its single return expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFunction {
    pub name: String,
    /// Formal parameter names in declaration order; position is the graph
    /// input index.
    pub params: Vec<String>,
    pub raw_expression: String,
}

fn is_ident(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Byte offset just past the first whole-word occurrence of `keyword` at or
/// after `from`, or `None`.
fn find_keyword(source: &str, keyword: &str, from: usize) -> Option<usize> {
    let mut search = from;
    while let Some(found) = source[search..].find(keyword) {
        let start = search + found;
        let end = start + keyword.len();
        let bounded_left = start == 0
            || !source[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        let bounded_right = !source[end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        if bounded_left && bounded_right {
            return Some(end);
        }
        search = end;
    }
    None
}

fn delimiters_balanced(text: &str) -> bool {
    let mut parens = 0i32;
    let mut brackets = 0i32;
    for c in text.chars() {
        match c {
            '(' => parens += 1,
            ')' => parens -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            _ => {}
        }
        if parens < 0 || brackets < 0 {
            return false;
        }
    }
    parens == 0 && brackets == 0
}

/// Extract the parameter list and raw return expression from function
/// source text.
pub fn extract_function(source: &str) -> Result<ExtractedFunction, ExtractionError> {
    let sig_start = find_keyword(source, "fn", 0).ok_or(ExtractionError::NoSignature)?;
    let open = source[sig_start..]
        .find('(')
        .map(|i| sig_start + i)
        .ok_or(ExtractionError::NoSignature)?;
    let name = source[sig_start..open].trim().to_string();
    if !is_ident(&name) {
        return Err(ExtractionError::NoSignature);
    }
    let close = source[open..]
        .find(')')
        .map(|i| open + i)
        .ok_or(ExtractionError::NoSignature)?;

    let param_text = &source[open + 1..close];
    let mut params = Vec::new();
    if !param_text.trim().is_empty() {
        for param in param_text.split(',') {
            let param = param.trim();
            if !is_ident(param) {
                return Err(ExtractionError::InvalidParameter(param.to_string()));
            }
            params.push(param.to_string());
        }
    }

    let expr_start = find_keyword(source, "return", close).ok_or(ExtractionError::NoReturn)?;
    let expr_end = source[expr_start..]
        .find('\n')
        .map(|i| expr_start + i)
        .unwrap_or(source.len());
    let raw_expression = source[expr_start..expr_end].trim().to_string();

    if raw_expression.is_empty() {
        return Err(ExtractionError::EmptyExpression);
    }
    if find_keyword(source, "return", expr_start).is_some() {
        return Err(ExtractionError::MultipleReturns);
    }
    if raw_expression.contains(['{', '}', ';']) {
        return Err(ExtractionError::BlockPunctuation);
    }
    if !delimiters_balanced(&raw_expression) {
        return Err(ExtractionError::UnbalancedDelimiters);
    }

    Ok(ExtractedFunction {
        name,
        params,
        raw_expression,
    })
}
