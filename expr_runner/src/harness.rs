//! Harness orchestration for the two computation shapes.
//!
//! [`MathHarness`] drives plain scalar expressions: every parameter becomes
//! a plaintext graph input and every depth-zero comma-separated
//! sub-expression becomes a numbered output. [`QueryHarness`] drives
//! predicate-weighted sums: the whole expression is one boolean term whose
//! mask filters a frequency-encoded payload before reduction.
//!
//! Both run the full pipeline on sampled (or caller-provided) inputs, then
//! evaluate the original expression in plaintext and fail on any
//! disagreement.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use fhe_dag::{
    Dag, DataTag, DecryptError, Expr, PlainValue, Valuation, decode_frequency_domain_outputs,
    encode_comparable, encode_frequency_domain, query_sum,
};
use log::{info, warn};
use rand::Rng;

use crate::error::{HarnessError, PipelineError};
use crate::eval::{build_graph_value, eval_plain_scalar, eval_plain_vector};
use crate::extract::{ExtractedFunction, extract_function};
use crate::parse::{Ast, parse_expression};
use crate::rewrite::{rewrite_expression, split_top_level};

/// Default graph width for the arithmetic shape.
pub const DEFAULT_MATH_DAG_SIZE: usize = 1024;

/// Default graph width for the query shape.
pub const DEFAULT_QUERY_DAG_SIZE: usize = 4096;

/// Sampling range for arithmetic self-test inputs.
const MATH_SAMPLE_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Sampling range for query self-test record values.
const QUERY_SAMPLE_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

/// Default payload the query shape sums over.
pub const DEFAULT_QUERY_PAYLOAD: [i64; 5] = [200, 22, 2, 100, 1];

/// Absolute tolerance when comparing decrypted against plaintext results.
const RESULT_TOLERANCE: f64 = 1e-6;

/// Harness configuration.
#[derive(Debug, Clone)]
pub struct HarnessOptions {
    /// Run name; doubles as the artifact directory when saving is enabled.
    pub name: String,
    /// Persist graph, algorithm info, inputs and outputs after execution.
    pub enable_save: bool,
    /// Maximum slot width of the graph.
    pub dag_size: usize,
}

impl HarnessOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enable_save: false,
            dag_size: DEFAULT_MATH_DAG_SIZE,
        }
    }
}

/// Graph name derived from the run name: final path component, extension
/// stripped.
fn dag_name(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = base.split('.').find(|part| !part.is_empty()).unwrap_or("");
    if stem.is_empty() { "encrypt" } else { stem }
}

/// Write the four pipeline artifacts under `dir`, collecting failures
/// instead of aborting: artifact saving is diagnostic, not the computation.
fn save_artifacts(dag: &Dag, dir: &str, failures: &mut Vec<String>) {
    let dir = Path::new(dir);
    if let Err(e) = fs::create_dir_all(dir) {
        let message = format!("failed to create artifact directory '{}': {e}", dir.display());
        warn!("{message}");
        failures.push(message);
        return;
    }
    let results = [
        ("dag.bin", dag.save_graph(dir.join("dag.bin"))),
        ("algorithm.bin", dag.save_algorithm_info(dir.join("algorithm.bin"))),
        ("inputs.bin", dag.save_inputs(dir.join("inputs.bin"))),
        ("outputs.bin", dag.save_outputs(dir.join("outputs.bin"))),
    ];
    for (file, result) in results {
        if let Err(e) = result {
            let message = format!("failed to save artifact '{file}': {e}");
            warn!("{message}");
            failures.push(message);
        }
    }
    info!("Saved pipeline artifacts under '{}'", dir.display());
}

/// Result of one arithmetic harness run.
#[derive(Debug, Clone)]
pub struct MathReport {
    pub raw_expression: String,
    /// One rewritten expression per output, in textual order.
    pub rewritten: Vec<String>,
    /// Sampled or provided input per parameter, in declaration order.
    pub inputs: Vec<(String, i64)>,
    /// Decrypted value per output.
    pub decrypted: Vec<f64>,
    /// Plaintext evaluation per output.
    pub plaintext: Vec<f64>,
    /// Non-fatal artifact-saving failures, if saving was enabled.
    pub save_failures: Vec<String>,
}

/// Orchestrator for the arithmetic shape.
pub struct MathHarness {
    options: HarnessOptions,
}

impl MathHarness {
    pub fn new(options: HarnessOptions) -> Self {
        Self { options }
    }

    /// Run with inputs sampled from the process RNG.
    pub fn run(&self, source: &str) -> Result<MathReport, HarnessError> {
        self.run_with_rng(source, &mut rand::rng())
    }

    /// Run with inputs sampled from the given RNG, for reproducible rounds.
    pub fn run_with_rng(
        &self,
        source: &str,
        rng: &mut impl Rng,
    ) -> Result<MathReport, HarnessError> {
        let function = extract_function(source)?;
        let values: Vec<i64> = function
            .params
            .iter()
            .map(|_| rng.random_range(MATH_SAMPLE_RANGE))
            .collect();
        self.run_function(function, values)
    }

    /// Run on explicit inputs, one per parameter in declaration order.
    pub fn run_with_inputs(
        &self,
        source: &str,
        values: &[i64],
    ) -> Result<MathReport, HarnessError> {
        let function = extract_function(source)?;
        if values.len() != function.params.len() {
            return Err(HarnessError::InvalidInput(format!(
                "{} inputs provided for {} parameters",
                values.len(),
                function.params.len()
            )));
        }
        self.run_function(function, values.to_vec())
    }

    fn run_function(
        &self,
        function: ExtractedFunction,
        values: Vec<i64>,
    ) -> Result<MathReport, HarnessError> {
        info!(
            "Extracted expression '{}' from function '{}'",
            function.raw_expression, function.name
        );

        let segments = split_top_level(&function.raw_expression)?;
        let rewritten: Vec<String> = segments
            .iter()
            .map(|segment| rewrite_expression(segment, &function.params))
            .collect::<Result<_, _>>()?;
        for text in &rewritten {
            info!("Rewritten expression: {text}");
        }
        let trees: Vec<Ast> = rewritten
            .iter()
            .map(|text| parse_expression(text))
            .collect::<Result<_, _>>()?;

        let mut dag = Dag::new(dag_name(&self.options.name), self.options.dag_size);
        let input_expr: Vec<Expr> = function
            .params
            .iter()
            .map(|param| dag.declare_input(param, DataTag::Plaintext))
            .collect();
        for (index, tree) in trees.iter().enumerate() {
            let value = build_graph_value(&dag, tree, &input_expr)?;
            dag.declare_output(&format!("output_{index}"), &value);
        }

        dag.compile().map_err(PipelineError::Compile)?;
        dag.generate_keys().map_err(PipelineError::KeyGen)?;

        let inputs: Vec<(String, i64)> = function.params.iter().cloned().zip(values).collect();
        info!("Sampled test inputs: {inputs:?}");
        let valuation: Valuation = inputs
            .iter()
            .map(|(name, value)| (name.clone(), (*value).into()))
            .collect();
        dag.encrypt_inputs(&valuation).map_err(PipelineError::Encrypt)?;
        dag.execute().map_err(PipelineError::Execute)?;

        let mut save_failures = Vec::new();
        if self.options.enable_save {
            save_artifacts(&dag, &self.options.name, &mut save_failures);
        }

        let outputs = dag.decrypt_outputs().map_err(PipelineError::Decrypt)?;
        let mut decrypted = Vec::with_capacity(trees.len());
        for index in 0..trees.len() {
            let name = format!("output_{index}");
            decrypted.push(scalar_output(&outputs, &name).map_err(PipelineError::Decrypt)?);
        }
        info!("Decrypted outputs: {decrypted:?}");

        // The plaintext leg evaluates the original, unrewritten expression
        // on the same inputs.
        let env: BTreeMap<String, f64> = inputs
            .iter()
            .map(|(name, value)| (name.clone(), *value as f64))
            .collect();
        let mut plaintext = Vec::with_capacity(segments.len());
        for segment in &segments {
            let tree = parse_expression(segment)?;
            plaintext.push(eval_plain_scalar(&tree, &env)?);
        }
        info!("Plaintext results: {plaintext:?}");

        for (index, (got, want)) in decrypted.iter().zip(&plaintext).enumerate() {
            if (got - want).abs() > RESULT_TOLERANCE {
                return Err(HarnessError::ResultMismatch {
                    output: format!("output_{index}"),
                    decrypted: *got,
                    expected: *want,
                });
            }
        }

        Ok(MathReport {
            raw_expression: function.raw_expression,
            rewritten,
            inputs,
            decrypted,
            plaintext,
            save_failures,
        })
    }
}

fn scalar_output(outputs: &Valuation, name: &str) -> Result<f64, DecryptError> {
    let value = outputs
        .get(name)
        .ok_or_else(|| DecryptError::UnknownOutput(name.to_string()))?;
    match value {
        PlainValue::Scalar(v) => Ok(*v),
        PlainValue::Vector(v) => Err(DecryptError::ShapeMismatch {
            name: name.to_string(),
            width: v.len(),
            expected: 1,
        }),
    }
}

/// Result of one query harness run.
#[derive(Debug, Clone)]
pub struct QueryReport {
    /// The extracted expression, wrapped as a single term.
    pub raw_expression: String,
    pub rewritten: String,
    /// Record values per parameter, in declaration order.
    pub inputs: Vec<(String, Vec<i64>)>,
    /// The payload summed under the predicate mask.
    pub payload: Vec<i64>,
    pub decrypted_sum: i64,
    pub plaintext_sum: i64,
    /// Non-fatal artifact-saving failures, if saving was enabled.
    pub save_failures: Vec<String>,
}

/// Orchestrator for the predicate-weighted-sum shape.
pub struct QueryHarness {
    options: HarnessOptions,
}

impl QueryHarness {
    pub fn new(options: HarnessOptions) -> Self {
        Self { options }
    }

    /// Run over the default payload with record values sampled from the
    /// process RNG.
    pub fn run(&self, source: &str) -> Result<QueryReport, HarnessError> {
        self.run_with_rng(source, &mut rand::rng())
    }

    /// Run with record values sampled from the given RNG.
    pub fn run_with_rng(
        &self,
        source: &str,
        rng: &mut impl Rng,
    ) -> Result<QueryReport, HarnessError> {
        let function = extract_function(source)?;
        let payload = DEFAULT_QUERY_PAYLOAD.to_vec();
        let values: Vec<Vec<i64>> = function
            .params
            .iter()
            .map(|_| {
                (0..payload.len())
                    .map(|_| rng.random_range(QUERY_SAMPLE_RANGE))
                    .collect()
            })
            .collect();
        self.run_function(function, values, payload)
    }

    /// Run on explicit record vectors (one per parameter, all of payload
    /// length) and an explicit payload.
    pub fn run_with_inputs(
        &self,
        source: &str,
        values: &[Vec<i64>],
        payload: &[i64],
    ) -> Result<QueryReport, HarnessError> {
        let function = extract_function(source)?;
        if values.len() != function.params.len() {
            return Err(HarnessError::InvalidInput(format!(
                "{} input vectors provided for {} parameters",
                values.len(),
                function.params.len()
            )));
        }
        if let Some(bad) = values.iter().find(|v| v.len() != payload.len()) {
            return Err(HarnessError::InvalidInput(format!(
                "input vector of length {} does not match payload length {}",
                bad.len(),
                payload.len()
            )));
        }
        self.run_function(function, values.to_vec(), payload.to_vec())
    }

    fn run_function(
        &self,
        function: ExtractedFunction,
        values: Vec<Vec<i64>>,
        payload: Vec<i64>,
    ) -> Result<QueryReport, HarnessError> {
        // The whole expression is one boolean term.
        let raw_expression = format!("({})", function.raw_expression);
        info!(
            "Extracted query term '{raw_expression}' from function '{}'",
            function.name
        );
        let rewritten = rewrite_expression(&raw_expression, &function.params)?;
        info!("Rewritten query term: {rewritten}");
        let tree = parse_expression(&rewritten)?;

        let records = payload.len();
        let mut dag = Dag::new(dag_name(&self.options.name), self.options.dag_size);
        dag.set_record_count(records);

        let fft_real = dag.declare_input("fft_real", DataTag::Ciphertext);
        let fft_imag = dag.declare_input("fft_imag", DataTag::Ciphertext);
        let input_expr: Vec<Expr> = function
            .params
            .iter()
            .map(|param| dag.declare_input(param, DataTag::Ciphertext))
            .collect();

        let term = build_graph_value(&dag, &tree, &input_expr)?;
        dag.declare_output("output_real", &query_sum(&fft_real, &term));
        dag.declare_output("output_imag", &query_sum(&fft_imag, &term));

        dag.compile().map_err(PipelineError::Compile)?;
        dag.generate_keys().map_err(PipelineError::KeyGen)?;

        let inputs: Vec<(String, Vec<i64>)> = function.params.iter().cloned().zip(values).collect();
        info!("Sampled test inputs: {inputs:?}");
        info!("Payload: {payload:?}");

        let mut valuation = Valuation::new();
        for (name, record_values) in &inputs {
            valuation.insert(name.clone(), encode_comparable(record_values, name).into());
        }
        let (real, imag) = encode_frequency_domain(&payload);
        valuation.insert("fft_real".to_string(), real.into());
        valuation.insert("fft_imag".to_string(), imag.into());

        dag.encrypt_inputs(&valuation).map_err(PipelineError::Encrypt)?;
        dag.execute().map_err(PipelineError::Execute)?;

        let mut save_failures = Vec::new();
        if self.options.enable_save {
            save_artifacts(&dag, &self.options.name, &mut save_failures);
        }

        let decrypted_sum =
            decode_frequency_domain_outputs(&dag, records, "output_real", "output_imag")
                .map_err(PipelineError::Decrypt)?;
        info!("Decrypted masked sum: {decrypted_sum}");

        // Plaintext leg: elementwise predicate mask dotted with the payload.
        let env: BTreeMap<String, Vec<f64>> = inputs
            .iter()
            .map(|(name, record_values)| {
                let slots = record_values.iter().map(|&v| v as f64).collect();
                (name.clone(), slots)
            })
            .collect();
        let mask = eval_plain_vector(&parse_expression(&raw_expression)?, &env, records)?;
        let plaintext_sum: i64 = mask
            .iter()
            .zip(&payload)
            .map(|(mask, value)| if *mask > 0.5 { *value } else { 0 })
            .sum();
        info!("Plaintext masked sum: {plaintext_sum}");

        if decrypted_sum != plaintext_sum {
            return Err(HarnessError::ResultMismatch {
                output: "output_real".to_string(),
                decrypted: decrypted_sum as f64,
                expected: plaintext_sum as f64,
            });
        }

        Ok(QueryReport {
            raw_expression,
            rewritten,
            inputs,
            payload,
            decrypted_sum,
            plaintext_sum,
            save_failures,
        })
    }
}
