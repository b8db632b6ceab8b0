//! Expression-tree interpreters.
//!
//! One builds graph values against the positional input handles (the
//! encrypted path); the others evaluate plaintext scalars or vectors for
//! the comparison step. Relational results are 0/1 in all three, matching
//! the engine's mask semantics.

use std::collections::BTreeMap;

use fhe_dag::{Dag, Expr};

use crate::error::EvalError;
use crate::parse::{Ast, BinOp};
use crate::rewrite::INPUT_HANDLE;

/// Build a graph value for a rewritten expression tree.
pub fn build_graph_value(dag: &Dag, ast: &Ast, input_expr: &[Expr]) -> Result<Expr, EvalError> {
    match ast {
        Ast::Number(value) => Ok(dag.constant(*value)),
        Ast::Param(name) => Err(EvalError::UnresolvedIdentifier(name.clone())),
        Ast::InputRef(index) => {
            input_expr
                .get(*index)
                .cloned()
                .ok_or(EvalError::InputIndexOutOfRange {
                    index: *index,
                    count: input_expr.len(),
                })
        }
        Ast::Neg(inner) => Ok(-build_graph_value(dag, inner, input_expr)?),
        Ast::Binary(op, lhs, rhs) => {
            let lhs = build_graph_value(dag, lhs, input_expr)?;
            let rhs = build_graph_value(dag, rhs, input_expr)?;
            Ok(match op {
                BinOp::Add => lhs + rhs,
                BinOp::Sub => lhs - rhs,
                BinOp::Mul => lhs * rhs,
                BinOp::Div => lhs / rhs,
                BinOp::Eq => lhs.equals(rhs),
                BinOp::Ne => lhs.not_equals(rhs),
                BinOp::Lt => lhs.less_than(rhs),
                BinOp::Le => lhs.less_equal(rhs),
                BinOp::Gt => lhs.greater_than(rhs),
                BinOp::Ge => lhs.greater_equal(rhs),
                BinOp::And => lhs.and(rhs),
                BinOp::Or => lhs.or(rhs),
            })
        }
    }
}

fn apply(op: BinOp, lhs: f64, rhs: f64) -> f64 {
    match op {
        BinOp::Add => lhs + rhs,
        BinOp::Sub => lhs - rhs,
        BinOp::Mul => lhs * rhs,
        BinOp::Div => lhs / rhs,
        BinOp::Eq => f64::from(lhs == rhs),
        BinOp::Ne => f64::from(lhs != rhs),
        BinOp::Lt => f64::from(lhs < rhs),
        BinOp::Le => f64::from(lhs <= rhs),
        BinOp::Gt => f64::from(lhs > rhs),
        BinOp::Ge => f64::from(lhs >= rhs),
        BinOp::And => f64::from(lhs > 0.5 && rhs > 0.5),
        BinOp::Or => f64::from(lhs > 0.5 || rhs > 0.5),
    }
}

/// Evaluate a raw expression tree over named scalar parameters.
pub fn eval_plain_scalar(ast: &Ast, env: &BTreeMap<String, f64>) -> Result<f64, EvalError> {
    match ast {
        Ast::Number(value) => Ok(*value),
        Ast::Param(name) => env
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UnresolvedIdentifier(name.clone())),
        Ast::InputRef(_) => Err(EvalError::UnresolvedIdentifier(INPUT_HANDLE.to_string())),
        Ast::Neg(inner) => Ok(-eval_plain_scalar(inner, env)?),
        Ast::Binary(op, lhs, rhs) => Ok(apply(
            *op,
            eval_plain_scalar(lhs, env)?,
            eval_plain_scalar(rhs, env)?,
        )),
    }
}

/// Evaluate a raw expression tree elementwise over named vector parameters
/// of length `len`.
pub fn eval_plain_vector(
    ast: &Ast,
    env: &BTreeMap<String, Vec<f64>>,
    len: usize,
) -> Result<Vec<f64>, EvalError> {
    for (name, values) in env {
        if values.len() != len {
            return Err(EvalError::LengthMismatch {
                name: name.clone(),
                len: values.len(),
                expected: len,
            });
        }
    }
    (0..len)
        .map(|index| {
            let scalars = env
                .iter()
                .map(|(name, values)| (name.clone(), values[index]))
                .collect();
            eval_plain_scalar(ast, &scalars)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_expression;

    #[test]
    fn test_plain_scalar() {
        let ast = parse_expression("(a + b) * c").unwrap();
        let env = [("a", 4.0), ("b", 5.0), ("c", 9.0)]
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        assert_eq!(eval_plain_scalar(&ast, &env).unwrap(), 81.0);
    }

    #[test]
    fn test_plain_scalar_predicate() {
        let ast = parse_expression("(a <= b) * (c != d)").unwrap();
        let env = [("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0)]
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        assert_eq!(eval_plain_scalar(&ast, &env).unwrap(), 1.0);
    }

    #[test]
    fn test_plain_vector_mask() {
        let ast = parse_expression("a <= b").unwrap();
        let env = [
            ("a".to_string(), vec![1.0, 5.0, 3.0]),
            ("b".to_string(), vec![2.0, 4.0, 3.0]),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            eval_plain_vector(&ast, &env, 3).unwrap(),
            vec![1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_unknown_name() {
        let ast = parse_expression("a + b").unwrap();
        let env = [("a".to_string(), 1.0)].into_iter().collect();
        assert_eq!(
            eval_plain_scalar(&ast, &env).unwrap_err(),
            EvalError::UnresolvedIdentifier("b".to_string())
        );
    }
}
