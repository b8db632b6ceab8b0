//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
pub(crate) struct Args {
    /// Function source file. If not specified, reads from stdin.
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Computation shape to run.
    #[arg(long, value_enum, default_value_t = Shape::Math)]
    pub shape: Shape,

    /// Run name; also the artifact directory when --save is set.
    #[arg(short, long, default_value = "encrypt")]
    pub name: String,

    /// Maximum slot width of the graph. Defaults per shape.
    #[arg(long)]
    pub dag_size: Option<usize>,

    /// Seed for deterministic input sampling.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Persist graph, algorithm info, inputs and outputs after execution.
    #[arg(long)]
    pub save: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// Scalar arithmetic; each comma-separated sub-expression is an output.
    Math,
    /// Predicate-weighted sum over an encoded payload.
    Query,
}
