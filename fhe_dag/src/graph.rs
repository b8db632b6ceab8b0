//! Append-only node store behind [`Dag`](crate::Dag) and [`Expr`](crate::Expr).

use serde::{Deserialize, Serialize};

use crate::op::{ConstantValue, DataTag, Op};

/// Index of a node within its graph.
///
/// Nodes are appended strictly after their operands, so ids double as a
/// topological order.
pub(crate) type NodeId = usize;

/// One graph node: an operation plus the ids of its operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Node {
    pub op: Op,
    pub operands: Vec<NodeId>,
}

/// The growing computation graph.
///
/// Shared between the owning [`Dag`](crate::Dag) and every [`Expr`](crate::Expr)
/// handle; all mutation is appending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Graph {
    pub name: String,
    /// Declared maximum slot width of any value in the graph.
    pub size: usize,
    /// Number of records covered by the query reductions. `None` until set;
    /// defaults to one record per block over the full width.
    pub record_count: Option<usize>,
    pub nodes: Vec<Node>,
    /// Input declarations in positional order.
    pub inputs: Vec<(String, DataTag, NodeId)>,
    /// Output declarations in declaration order.
    pub outputs: Vec<(String, NodeId)>,
}

impl Graph {
    pub fn new(name: &str, size: usize) -> Self {
        Self {
            name: name.to_string(),
            size,
            record_count: None,
            nodes: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    fn push(&mut self, op: Op, operands: Vec<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node { op, operands });
        id
    }

    pub fn add_input(&mut self, name: &str, tag: DataTag) -> NodeId {
        let id = self.push(
            Op::Input {
                name: name.to_string(),
                tag,
            },
            Vec::new(),
        );
        self.inputs.push((name.to_string(), tag, id));
        id
    }

    pub fn add_output(&mut self, name: &str, node: NodeId) {
        self.outputs.push((name.to_string(), node));
    }

    pub fn add_constant(&mut self, value: ConstantValue) -> NodeId {
        self.push(Op::Constant(value), Vec::new())
    }

    pub fn add_unary(&mut self, op: Op, operand: NodeId) -> NodeId {
        self.push(op, vec![operand])
    }

    pub fn add_binary(&mut self, op: Op, lhs: NodeId, rhs: NodeId) -> NodeId {
        debug_assert!(op.is_binary());
        self.push(op, vec![lhs, rhs])
    }

    /// Records covered by query reductions, defaulting to the full width.
    pub fn records(&self) -> usize {
        self.record_count
            .unwrap_or(self.size / crate::QUERY_BLOCK)
            .max(1)
    }
}
