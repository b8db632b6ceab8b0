//! Expression-to-graph harness for encrypted evaluation.
//!
//! Takes the source of a single-expression function, rewrites its
//! parameters into positional graph-input references, builds the
//! computation graph through [`fhe_dag`], drives the full pipeline
//! (compile, key generation, encryption, execution, decryption) on sampled
//! test inputs, and checks the decrypted results against a plaintext
//! evaluation of the same expression.
//!
//! Two computation shapes are supported: plain arithmetic with one output
//! per comma-separated sub-expression ([`MathHarness`]), and
//! predicate-weighted sums over an encoded payload ([`QueryHarness`]).

mod error;
mod eval;
mod extract;
mod harness;
mod lex;
mod parse;
mod rewrite;

pub use error::{
    EvalError, ExtractionError, HarnessError, ParseError, PipelineError, RewriteError,
};
pub use eval::{build_graph_value, eval_plain_scalar, eval_plain_vector};
pub use extract::{ExtractedFunction, extract_function};
pub use harness::{
    DEFAULT_MATH_DAG_SIZE, DEFAULT_QUERY_DAG_SIZE, DEFAULT_QUERY_PAYLOAD, HarnessOptions,
    MathHarness, MathReport, QueryHarness, QueryReport,
};
pub use parse::{Ast, BinOp, parse_expression};
pub use rewrite::{INPUT_HANDLE, rewrite_expression, split_top_level};
