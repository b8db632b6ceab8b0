use std::fs::read_to_string;

use anyhow::{Result, anyhow};
use clap::Parser;
use expr_runner::{extract_function, rewrite_expression, split_top_level};

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, long)]
    source_path: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let source = read_to_string(&args.source_path)
        .map_err(|e| anyhow!("failed to read source file '{}': {e}", args.source_path))?;
    let function = extract_function(&source)
        .map_err(|e| anyhow!("failed to extract expression from '{}': {e}", args.source_path))?;
    let segments = split_top_level(&function.raw_expression)
        .map_err(|e| anyhow!("failed to rewrite expression from '{}': {e}", args.source_path))?;
    for segment in &segments {
        rewrite_expression(segment, &function.params).map_err(|e| {
            anyhow!("failed to rewrite expression from '{}': {e}", args.source_path)
        })?;
    }

    Ok(())
}
