//! Reference execution engine.
//!
//! Stands in for the external homomorphic backend behind the pipeline
//! interface: key material is an opaque id, a ciphertext is a key-tagged
//! slot vector, and execution evaluates the compiled graph slotwise with
//! the semantics a real scheme provides (elementwise arithmetic, 0/1
//! comparisons, slot rotation, width-1 broadcast for scalars).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CMP_EPSILON;
use crate::compile::Plan;
use crate::error::{EncryptError, ExecuteError};
use crate::graph::Graph;
use crate::op::{ConstantValue, DataTag, Op};
use crate::wire::Valuation;

/// Key material for one pipeline run. Opaque to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct KeySet {
    pub key_id: u64,
}

impl KeySet {
    pub fn generate() -> Self {
        Self {
            key_id: rand::random(),
        }
    }
}

/// A value bound to an input slot, after encryption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum SlotValue {
    /// Plaintext-tagged input, carried as-is.
    Plain(Vec<f64>),
    /// Ciphertext-tagged input, bound to the generating key.
    Cipher { key_id: u64, slots: Vec<f64> },
}

impl SlotValue {
    fn slots(&self) -> &[f64] {
        match self {
            SlotValue::Plain(slots) => slots,
            SlotValue::Cipher { slots, .. } => slots,
        }
    }
}

/// All input slots of one execution round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EncryptedInputs {
    pub key_id: u64,
    pub values: BTreeMap<String, SlotValue>,
}

/// Raw output slots of one execution, still bound to the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ExecutionResult {
    pub key_id: u64,
    pub outputs: BTreeMap<String, Vec<f64>>,
}

/// Bind a valuation to the graph's declared inputs.
///
/// Every declared input must be present, nothing extra may be present, and
/// vector values must fit the graph width. Vectors are zero-padded to the
/// full width so rotations are well-defined; scalars stay width 1 and
/// broadcast.
pub(crate) fn encrypt(
    graph: &Graph,
    keys: &KeySet,
    inputs: &Valuation,
) -> Result<EncryptedInputs, EncryptError> {
    for name in inputs.keys() {
        if !graph.inputs.iter().any(|(input, _, _)| input == name) {
            return Err(EncryptError::UnknownInput(name.clone()));
        }
    }

    let mut values = BTreeMap::new();
    for (name, tag, _) in &graph.inputs {
        let value = inputs
            .get(name)
            .ok_or_else(|| EncryptError::MissingInput(name.clone()))?;
        let mut slots = value.slots();
        if slots.len() > graph.size {
            return Err(EncryptError::ShapeMismatch {
                name: name.clone(),
                len: slots.len(),
                size: graph.size,
            });
        }
        if slots.len() > 1 {
            slots.resize(graph.size, 0.0);
        }
        let value = match tag {
            DataTag::Plaintext => SlotValue::Plain(slots),
            DataTag::Ciphertext => SlotValue::Cipher {
                key_id: keys.key_id,
                slots,
            },
        };
        values.insert(name.clone(), value);
    }

    Ok(EncryptedInputs {
        key_id: keys.key_id,
        values,
    })
}

fn binary_slotwise(
    node: usize,
    lhs: &[f64],
    rhs: &[f64],
    f: impl Fn(f64, f64) -> f64,
) -> Result<Vec<f64>, ExecuteError> {
    let width = if lhs.len() == rhs.len() {
        lhs.len()
    } else if lhs.len() == 1 || rhs.len() == 1 {
        lhs.len().max(rhs.len())
    } else {
        return Err(ExecuteError::WidthMismatch {
            node,
            lhs: lhs.len(),
            rhs: rhs.len(),
        });
    };
    let at = |slots: &[f64], i: usize| slots[if slots.len() == 1 { 0 } else { i }];
    Ok((0..width).map(|i| f(at(lhs, i), at(rhs, i))).collect())
}

fn as_bool(v: f64) -> f64 {
    if v > 0.5 { 1.0 } else { 0.0 }
}

/// Evaluate the compiled graph over the encrypted inputs.
pub(crate) fn execute(
    graph: &Graph,
    plan: &Plan,
    inputs: &EncryptedInputs,
) -> Result<ExecutionResult, ExecuteError> {
    let eq = |a: f64, b: f64| f64::from((a - b).abs() <= CMP_EPSILON);

    let mut values: Vec<Vec<f64>> = Vec::with_capacity(plan.node_count);
    for (id, node) in graph.nodes.iter().enumerate().take(plan.node_count) {
        let slots = match &node.op {
            Op::Input { name, .. } => match inputs.values.get(name) {
                Some(value) => value.slots().to_vec(),
                None => return Err(ExecuteError::MissingInput(name.clone())),
            },
            Op::Constant(ConstantValue::Scalar(v)) => vec![*v],
            Op::Constant(ConstantValue::Vector(v)) => v.clone(),
            Op::Negate => values[node.operands[0]].iter().map(|v| -v).collect(),
            Op::RotateLeft(step) => {
                let operand = &values[node.operands[0]];
                if operand.len() != graph.size {
                    return Err(ExecuteError::RotateNarrowOperand {
                        node: id,
                        width: operand.len(),
                    });
                }
                (0..operand.len())
                    .map(|i| operand[(i + step) % operand.len()])
                    .collect()
            }
            op => {
                let lhs = &values[node.operands[0]];
                let rhs = &values[node.operands[1]];
                match op {
                    Op::Add => binary_slotwise(id, lhs, rhs, |a, b| a + b)?,
                    Op::Sub => binary_slotwise(id, lhs, rhs, |a, b| a - b)?,
                    Op::Mul => binary_slotwise(id, lhs, rhs, |a, b| a * b)?,
                    Op::Div => binary_slotwise(id, lhs, rhs, |a, b| a / b)?,
                    Op::Equal => binary_slotwise(id, lhs, rhs, eq)?,
                    Op::NotEqual => binary_slotwise(id, lhs, rhs, |a, b| 1.0 - eq(a, b))?,
                    Op::Less => {
                        binary_slotwise(id, lhs, rhs, |a, b| f64::from(b - a > CMP_EPSILON))?
                    }
                    Op::LessEqual => {
                        binary_slotwise(id, lhs, rhs, |a, b| f64::from(b - a > -CMP_EPSILON))?
                    }
                    Op::Greater => {
                        binary_slotwise(id, lhs, rhs, |a, b| f64::from(a - b > CMP_EPSILON))?
                    }
                    Op::GreaterEqual => {
                        binary_slotwise(id, lhs, rhs, |a, b| f64::from(a - b > -CMP_EPSILON))?
                    }
                    Op::And => {
                        binary_slotwise(id, lhs, rhs, |a, b| as_bool(a) * as_bool(b))?
                    }
                    Op::Or => binary_slotwise(id, lhs, rhs, |a, b| {
                        let (a, b) = (as_bool(a), as_bool(b));
                        a + b - a * b
                    })?,
                    _ => unreachable!("unary ops handled above"),
                }
            }
        };
        values.push(slots);
    }

    let outputs = graph
        .outputs
        .iter()
        .map(|(name, node)| (name.clone(), values[*node].clone()))
        .collect();
    Ok(ExecutionResult {
        key_id: inputs.key_id,
        outputs,
    })
}
