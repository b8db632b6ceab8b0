use std::fs::read_to_string;
use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Parser;
use expr_runner::{
    DEFAULT_MATH_DAG_SIZE, DEFAULT_QUERY_DAG_SIZE, HarnessOptions, MathHarness, QueryHarness,
};
use rand::{SeedableRng, rngs::StdRng};

mod cli;

use cli::{Args, Shape};

fn read_source(args: &Args) -> Result<String> {
    match &args.source {
        Some(path) => read_to_string(path)
            .with_context(|| format!("failed to read source file '{}'", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read source from stdin")?;
            Ok(buffer)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let source = read_source(&args)?;

    let default_size = match args.shape {
        Shape::Math => DEFAULT_MATH_DAG_SIZE,
        Shape::Query => DEFAULT_QUERY_DAG_SIZE,
    };
    let options = HarnessOptions {
        name: args.name.clone(),
        enable_save: args.save,
        dag_size: args.dag_size.unwrap_or(default_size),
    };

    match args.shape {
        Shape::Math => {
            let harness = MathHarness::new(options);
            let report = match args.seed {
                Some(seed) => harness.run_with_rng(&source, &mut StdRng::seed_from_u64(seed)),
                None => harness.run(&source),
            }
            .context("math harness run failed")?;

            println!("expression: {}", report.raw_expression);
            for rewritten in &report.rewritten {
                println!("rewritten: {rewritten}");
            }
            for (name, value) in &report.inputs {
                println!("input {name} = {value}");
            }
            for (index, (decrypted, plaintext)) in
                report.decrypted.iter().zip(&report.plaintext).enumerate()
            {
                println!("output_{index}: decrypted={decrypted} plaintext={plaintext}");
            }
        }
        Shape::Query => {
            let harness = QueryHarness::new(options);
            let report = match args.seed {
                Some(seed) => harness.run_with_rng(&source, &mut StdRng::seed_from_u64(seed)),
                None => harness.run(&source),
            }
            .context("query harness run failed")?;

            println!("expression: {}", report.raw_expression);
            println!("rewritten: {}", report.rewritten);
            for (name, values) in &report.inputs {
                println!("input {name} = {values:?}");
            }
            println!("payload = {:?}", report.payload);
            println!(
                "masked sum: decrypted={} plaintext={}",
                report.decrypted_sum, report.plaintext_sum
            );
        }
    }

    Ok(())
}
