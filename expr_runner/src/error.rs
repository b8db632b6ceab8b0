//! Error taxonomy for the harness.
//!
//! Extraction, rewriting and parsing fail before any graph exists; engine
//! failures are passed through unmodified inside [`PipelineError`].

/// Error type for locating a function's single return expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    /// No `fn name(...)` signature was found in the source.
    #[error("source contains no function signature")]
    NoSignature,
    /// A parameter in the signature is not a plain identifier.
    #[error("invalid parameter name '{0}'")]
    InvalidParameter(String),
    /// The body contains no `return` keyword.
    #[error("no 'return' found in function body")]
    NoReturn,
    /// The captured expression is empty.
    #[error("empty return expression")]
    EmptyExpression,
    /// The body contains a second `return`; only single-expression
    /// functions are supported.
    #[error("function body contains more than one 'return'")]
    MultipleReturns,
    /// The captured line has unbalanced delimiters, i.e. the expression
    /// continues past the line break.
    #[error("return expression has unbalanced delimiters")]
    UnbalancedDelimiters,
    /// The captured line contains `{`, `}` or `;`.
    #[error("return expression contains block punctuation")]
    BlockPunctuation,
}

/// Error type for rewriting parameter names into positional references.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// The expression uses an identifier that is not a declared parameter.
    #[error("expression references undeclared identifier '{0}'")]
    FreeVariable(String),
    /// The expression already uses the reserved reference handle.
    #[error("'input_expr' is reserved for rewritten references")]
    ReservedIdentifier,
    /// The expression contains text outside the supported token set.
    #[error("expression contains unsupported text '{0}'")]
    UnsupportedToken(String),
    /// A tuple return has an empty sub-expression.
    #[error("empty sub-expression in tuple return")]
    EmptySubExpression,
}

/// Error type for parsing a (rewritten) expression into a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The expression ended where a term was expected.
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    /// A token that cannot start or continue the expression at this point.
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    /// A numeric literal that does not parse.
    #[error("invalid numeric literal '{0}'")]
    InvalidNumber(String),
    /// A specific token was required.
    #[error("expected {expected}, found '{found}'")]
    Expected {
        expected: &'static str,
        found: String,
    },
}

/// Error type for evaluating an expression tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// `input_expr[i]` with `i` beyond the declared inputs.
    #[error("input reference index {index} exceeds {count} declared inputs")]
    InputIndexOutOfRange { index: usize, count: usize },
    /// A bare identifier with no binding in the evaluation environment.
    #[error("unresolved identifier '{0}'")]
    UnresolvedIdentifier(String),
    /// Vector-valued parameters of unequal length.
    #[error("vector parameter '{name}' has length {len}, expected {expected}")]
    LengthMismatch {
        name: String,
        len: usize,
        expected: usize,
    },
}

/// An engine failure, passed through unmodified from the graph pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Compile(#[from] fhe_dag::CompileError),
    #[error(transparent)]
    KeyGen(#[from] fhe_dag::KeyGenError),
    #[error(transparent)]
    Encrypt(#[from] fhe_dag::EncryptError),
    #[error(transparent)]
    Execute(#[from] fhe_dag::ExecuteError),
    #[error(transparent)]
    Decrypt(#[from] fhe_dag::DecryptError),
}

/// Top-level harness failure.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("expression extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("expression rewriting failed: {0}")]
    Rewrite(#[from] RewriteError),
    #[error("expression parsing failed: {0}")]
    Parse(#[from] ParseError),
    #[error("expression evaluation failed: {0}")]
    Eval(#[from] EvalError),
    #[error("encrypted pipeline failed: {0}")]
    Pipeline(#[from] PipelineError),
    /// Caller-provided inputs that do not fit the extracted signature.
    #[error("{0}")]
    InvalidInput(String),
    /// The decrypted result disagrees with the plaintext evaluation.
    #[error("decrypted output '{output}' is {decrypted}, plaintext evaluation is {expected}")]
    ResultMismatch {
        output: String,
        decrypted: f64,
        expected: f64,
    },
}
