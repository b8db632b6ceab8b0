//! Operator-overloaded graph-value handles.
//!
//! An [`Expr`] is a cheap handle to one node of a shared graph. Applying an
//! operator appends a node and returns a new handle; the operands are never
//! modified. Evaluation is fully deferred to the execution engine.

use std::cell::RefCell;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

use crate::QUERY_BLOCK;
use crate::graph::{Graph, NodeId};
use crate::op::{ConstantValue, Op};

/// Handle to one node in a computation graph.
#[derive(Debug, Clone)]
pub struct Expr {
    pub(crate) graph: Rc<RefCell<Graph>>,
    pub(crate) node: NodeId,
}

/// Anything usable as the second operand of a graph operation: another
/// handle, or a literal that becomes a constant node.
pub trait IntoOperand {
    fn into_node(self, graph: &Rc<RefCell<Graph>>) -> NodeId;
}

impl IntoOperand for &Expr {
    fn into_node(self, graph: &Rc<RefCell<Graph>>) -> NodeId {
        debug_assert!(
            Rc::ptr_eq(&self.graph, graph),
            "operands must belong to the same graph"
        );
        self.node
    }
}

impl IntoOperand for Expr {
    fn into_node(self, graph: &Rc<RefCell<Graph>>) -> NodeId {
        (&self).into_node(graph)
    }
}

impl IntoOperand for f64 {
    fn into_node(self, graph: &Rc<RefCell<Graph>>) -> NodeId {
        graph.borrow_mut().add_constant(ConstantValue::Scalar(self))
    }
}

impl IntoOperand for i64 {
    fn into_node(self, graph: &Rc<RefCell<Graph>>) -> NodeId {
        (self as f64).into_node(graph)
    }
}

impl IntoOperand for Vec<f64> {
    fn into_node(self, graph: &Rc<RefCell<Graph>>) -> NodeId {
        graph.borrow_mut().add_constant(ConstantValue::Vector(self))
    }
}

impl Expr {
    pub(crate) fn new(graph: Rc<RefCell<Graph>>, node: NodeId) -> Self {
        Self { graph, node }
    }

    fn binary(&self, op: Op, rhs: impl IntoOperand) -> Expr {
        let rhs = rhs.into_node(&self.graph);
        let node = self.graph.borrow_mut().add_binary(op, self.node, rhs);
        Expr::new(Rc::clone(&self.graph), node)
    }

    /// 0/1 node that is 1 where the operands are equal.
    pub fn equals(&self, rhs: impl IntoOperand) -> Expr {
        self.binary(Op::Equal, rhs)
    }

    /// 0/1 node that is 1 where the operands differ.
    pub fn not_equals(&self, rhs: impl IntoOperand) -> Expr {
        self.binary(Op::NotEqual, rhs)
    }

    /// 0/1 node for `self < rhs`.
    pub fn less_than(&self, rhs: impl IntoOperand) -> Expr {
        self.binary(Op::Less, rhs)
    }

    /// 0/1 node for `self <= rhs`.
    pub fn less_equal(&self, rhs: impl IntoOperand) -> Expr {
        self.binary(Op::LessEqual, rhs)
    }

    /// 0/1 node for `self > rhs`.
    pub fn greater_than(&self, rhs: impl IntoOperand) -> Expr {
        self.binary(Op::Greater, rhs)
    }

    /// 0/1 node for `self >= rhs`.
    pub fn greater_equal(&self, rhs: impl IntoOperand) -> Expr {
        self.binary(Op::GreaterEqual, rhs)
    }

    /// Conjunction of two 0/1 masks.
    pub fn and(&self, rhs: impl IntoOperand) -> Expr {
        self.binary(Op::And, rhs)
    }

    /// Disjunction of two 0/1 masks.
    pub fn or(&self, rhs: impl IntoOperand) -> Expr {
        self.binary(Op::Or, rhs)
    }

    /// Rotate slots left by `step`.
    pub fn rotate_left(&self, step: usize) -> Expr {
        let node = self
            .graph
            .borrow_mut()
            .add_unary(Op::RotateLeft(step), self.node);
        Expr::new(Rc::clone(&self.graph), node)
    }
}

macro_rules! impl_arith_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: IntoOperand> $trait<T> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: T) -> Expr {
                self.binary($op, rhs)
            }
        }

        impl<T: IntoOperand> $trait<T> for Expr {
            type Output = Expr;
            fn $method(self, rhs: T) -> Expr {
                self.binary($op, rhs)
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                let lhs = self.into_node(&rhs.graph);
                let node = rhs.graph.borrow_mut().add_binary($op, lhs, rhs.node);
                Expr::new(Rc::clone(&rhs.graph), node)
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                self.$method(rhs.clone())
            }
        }

        impl $trait<Expr> for i64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                (self as f64).$method(rhs)
            }
        }

        impl $trait<&Expr> for i64 {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                (self as f64).$method(rhs.clone())
            }
        }
    };
}

impl_arith_op!(Add, add, Op::Add);
impl_arith_op!(Sub, sub, Op::Sub);
impl_arith_op!(Mul, mul, Op::Mul);
impl_arith_op!(Div, div, Op::Div);

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        let node = self.graph.borrow_mut().add_unary(Op::Negate, self.node);
        Expr::new(Rc::clone(&self.graph), node)
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        -&self
    }
}

/// Sum a per-record value across all records.
///
/// Accumulates block-rotated copies of the operand, then masks the first
/// block, so slots `0..QUERY_BLOCK` of the result carry the sum over every
/// record's block.
fn sum_records(expr: &Expr) -> Expr {
    let (records, size) = {
        let graph = expr.graph.borrow();
        (graph.records(), graph.size)
    };
    let mut acc = expr.clone();
    for record in 1..records {
        acc = acc + expr.rotate_left(record * QUERY_BLOCK);
    }
    let mut mask = vec![0.0; size];
    for slot in mask.iter_mut().take(QUERY_BLOCK.min(size)) {
        *slot = 1.0;
    }
    acc * mask
}

/// Predicate-weighted sum: the 0/1 `mask` filters `payload` per record and
/// the surviving blocks are reduced into the first block.
pub fn query_sum(payload: &Expr, mask: &Expr) -> Expr {
    sum_records(&(payload * mask))
}

/// Count of records where the 0/1 `mask` is set.
pub fn query_count(mask: &Expr) -> Expr {
    sum_records(mask)
}
