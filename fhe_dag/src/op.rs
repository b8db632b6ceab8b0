//! Operation kinds, data tags and constant values for graph nodes.

use serde::{Deserialize, Serialize};

/// Whether an input slot carries plaintext or ciphertext data.
///
/// The tag is fixed when the input is declared and determines whether the
/// engine wraps the value in key material at encryption time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataTag {
    Plaintext,
    Ciphertext,
}

/// A literal attached to a constant node.
///
/// Scalars broadcast against any operand width; vectors (reduction masks,
/// encoded payloads) carry their own width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstantValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl ConstantValue {
    /// Slot width of the constant. Scalars occupy a single slot.
    pub fn width(&self) -> usize {
        match self {
            ConstantValue::Scalar(_) => 1,
            ConstantValue::Vector(v) => v.len(),
        }
    }
}

/// The operation performed by one graph node.
///
/// Relational operations produce 0/1-valued slots so predicates can be
/// combined algebraically with arithmetic (mask times payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Named graph input; declaration order fixes its positional index.
    Input { name: String, tag: DataTag },
    /// Literal constant.
    Constant(ConstantValue),
    Negate,
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    /// Logical conjunction of 0/1 masks.
    And,
    /// Logical disjunction of 0/1 masks.
    Or,
    /// Rotate slots left by a fixed step.
    RotateLeft(usize),
}

impl Op {
    /// Short name used in logs and algorithm-info op counts.
    pub fn name(&self) -> &'static str {
        match self {
            Op::Input { .. } => "Input",
            Op::Constant(_) => "Constant",
            Op::Negate => "Negate",
            Op::Add => "Add",
            Op::Sub => "Sub",
            Op::Mul => "Mul",
            Op::Div => "Div",
            Op::Equal => "Equal",
            Op::NotEqual => "NotEqual",
            Op::Less => "Less",
            Op::LessEqual => "LessEqual",
            Op::Greater => "Greater",
            Op::GreaterEqual => "GreaterEqual",
            Op::And => "And",
            Op::Or => "Or",
            Op::RotateLeft(_) => "RotateLeft",
        }
    }

    /// True for operations that take exactly two operands.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            Op::Add
                | Op::Sub
                | Op::Mul
                | Op::Div
                | Op::Equal
                | Op::NotEqual
                | Op::Less
                | Op::LessEqual
                | Op::Greater
                | Op::GreaterEqual
                | Op::And
                | Op::Or
        )
    }

    /// True for operations that consume a multiplicative level in a
    /// leveled homomorphic scheme.
    pub fn is_multiplicative(&self) -> bool {
        matches!(self, Op::Mul | Op::Div | Op::And | Op::Or)
    }
}
