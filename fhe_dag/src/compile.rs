//! Graph validation and lowering into an execution plan.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::graph::Graph;
use crate::op::Op;

/// Lowered form of a compiled graph.
///
/// Nodes are appended after their operands, so the node vector itself is a
/// valid evaluation order and the plan only needs the validated bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Plan {
    pub node_count: usize,
}

/// Summary of a compiled graph, saved as the algorithm-info artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmInfo {
    pub name: String,
    pub size: usize,
    pub record_count: Option<usize>,
    pub node_count: usize,
    pub input_count: usize,
    pub output_count: usize,
    /// Number of nodes per operation name.
    pub op_counts: BTreeMap<String, u32>,
    /// Longest chain of multiplicative operations from any input to any
    /// output, the budget a leveled scheme must provision for.
    pub multiplicative_depth: u32,
}

/// Validate the graph and lower it. Fails on duplicate slot names, missing
/// outputs, and out-of-range rotations or constants.
pub(crate) fn compile(graph: &Graph) -> Result<(Plan, AlgorithmInfo), CompileError> {
    if graph.outputs.is_empty() {
        return Err(CompileError::NoOutputs);
    }

    let mut seen = BTreeSet::new();
    for (name, _, _) in &graph.inputs {
        if !seen.insert(name.as_str()) {
            return Err(CompileError::DuplicateInput(name.clone()));
        }
    }
    let mut seen = BTreeSet::new();
    for (name, _) in &graph.outputs {
        if !seen.insert(name.as_str()) {
            return Err(CompileError::DuplicateOutput(name.clone()));
        }
    }

    for node in &graph.nodes {
        match &node.op {
            Op::RotateLeft(step) => {
                if *step == 0 || *step >= graph.size {
                    return Err(CompileError::InvalidRotation {
                        step: *step,
                        size: graph.size,
                    });
                }
            }
            Op::Constant(value) => {
                if value.width() > graph.size {
                    return Err(CompileError::ConstantTooWide {
                        width: value.width(),
                        size: graph.size,
                    });
                }
            }
            _ => {}
        }
    }

    let mut op_counts: BTreeMap<String, u32> = BTreeMap::new();
    for node in &graph.nodes {
        *op_counts.entry(node.op.name().to_string()).or_insert(0) += 1;
    }

    // Node ids are already topological, so one forward pass suffices.
    let mut depth = vec![0u32; graph.nodes.len()];
    for (id, node) in graph.nodes.iter().enumerate() {
        let operand_depth = node
            .operands
            .iter()
            .map(|&operand| depth[operand])
            .max()
            .unwrap_or(0);
        depth[id] = operand_depth + u32::from(node.op.is_multiplicative());
    }
    let multiplicative_depth = graph
        .outputs
        .iter()
        .map(|&(_, node)| depth[node])
        .max()
        .unwrap_or(0);

    let info = AlgorithmInfo {
        name: graph.name.clone(),
        size: graph.size,
        record_count: graph.record_count,
        node_count: graph.nodes.len(),
        input_count: graph.inputs.len(),
        output_count: graph.outputs.len(),
        op_counts,
        multiplicative_depth,
    };
    let plan = Plan {
        node_count: graph.nodes.len(),
    };
    Ok((plan, info))
}
