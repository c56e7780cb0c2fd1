use std::cell::OnceCell;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{BinOp, Expr, UnOp},
    field,
    functions::{self, ReviewRequests},
    record::PullRequest,
    value::{Value, parse_timestamp, type_name},
};

/// Evaluation context for one record.
///
/// Holds values derived from the record that several calls may need. A
/// fresh context is created for every record evaluation, so nothing derived
/// from one record is ever seen while evaluating another.
#[derive(Debug)]
pub struct EvalContext<'r> {
    /// The record under test
    pub record: &'r PullRequest,
    /// The instant relative times are measured from
    pub now: DateTime<Utc>,
    review_requests: OnceCell<ReviewRequests>,
}

impl<'r> EvalContext<'r> {
    pub fn new(record: &'r PullRequest, now: DateTime<Utc>) -> Self {
        EvalContext {
            record,
            now,
            review_requests: OnceCell::new(),
        }
    }

    /// Outstanding review requests, derived once per context.
    pub fn review_requests(&self) -> &ReviewRequests {
        self.review_requests
            .get_or_init(|| functions::outstanding_review_requests(self.record))
    }
}

/// Errors that abort the evaluation of a predicate.
///
/// Operand type mismatches are not errors: they make the comparison false.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Call to a function that does not exist
    #[error("Invalid function `{name}` (while evaluating record {record})")]
    InvalidFunction { name: String, record: String },

    /// Function called with an unusable argument
    #[error("Invalid argument to `{function}`: {message}")]
    InvalidArgument { function: String, message: String },
}

/// Evaluates parsed query expressions against records.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    now: DateTime<Utc>,
}

impl Evaluator {
    pub fn new(now: DateTime<Utc>) -> Self {
        Evaluator { now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Evaluates an expression against one record.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use prq::{Evaluator, PullRequest, Value, parser::parse_query};
    ///
    /// let pr: PullRequest = serde_json::from_value(serde_json::json!({
    ///     "id": "PR_1", "number": 7, "title": "Fix", "org": "acme", "repo": "api",
    ///     "state": "OPEN", "author": { "login": "octocat" },
    ///     "createdAt": "2025-09-30T07:27:08Z", "updatedAt": "2025-09-30T08:06:53Z"
    /// }))
    /// .unwrap();
    ///
    /// let expr = parse_query("author = OCTOCAT").unwrap();
    /// let result = Evaluator::new(Utc::now()).eval_expression(&expr, &pr).unwrap();
    /// assert_eq!(result, Value::Boolean(true));
    /// ```
    pub fn eval_expression(&self, expr: &Expr, record: &PullRequest) -> Result<Value, EvalError> {
        let ctx = EvalContext::new(record, self.now);
        self.eval_expr(expr, &ctx)
    }

    /// Whether the record satisfies the expression.
    pub fn matches(&self, expr: &Expr, record: &PullRequest) -> Result<bool, EvalError> {
        Ok(self.eval_expression(expr, record)?.is_truthy())
    }

    pub fn eval_expr(&self, expr: &Expr, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        match expr {
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Identifier(name) => Ok(field::resolve(ctx.record, name)),
            Expr::UnaryOp { op, operand } => {
                let value = self.eval_expr(operand, ctx)?;
                Ok(apply_unary(*op, &value))
            }
            Expr::BinaryOp { op, left, right } => {
                let left_val = self.eval_expr(left, ctx)?;
                let right_val = if op.is_comparison() {
                    self.eval_operand(right, ctx)?
                } else {
                    self.eval_expr(right, ctx)?
                };
                Ok(self.apply_binop(*op, left_val, right_val))
            }
            Expr::Sequence(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match self.eval_operand(item, ctx)? {
                        Value::List(inner) => values.extend(inner),
                        value => values.push(value),
                    }
                }
                Ok(Value::List(values))
            }
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_operand(arg, ctx)?);
                }
                functions::call(name, &values, ctx)
            }
            Expr::Compound(parts) => {
                let mut all = true;
                for part in parts {
                    all &= self.eval_expr(part, ctx)?.is_truthy();
                }
                Ok(Value::Boolean(all))
            }
        }
    }

    /// Operand position: a bare identifier is the string of its own name.
    fn eval_operand(&self, expr: &Expr, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        match expr {
            Expr::Identifier(name) => Ok(Value::String(name.clone())),
            other => self.eval_expr(other, ctx),
        }
    }

    fn apply_binop(&self, op: BinOp, left: Value, right: Value) -> Value {
        match op {
            BinOp::And => Value::Boolean(left.is_truthy() && right.is_truthy()),
            BinOp::Or => Value::Boolean(left.is_truthy() || right.is_truthy()),
            BinOp::Add | BinOp::Subtract => apply_arithmetic(op, &left, &right),
            _ => {
                let left = left.unwrap_singleton();
                let right = right.unwrap_singleton();
                Value::Boolean(self.compare(op, &left, &right))
            }
        }
    }

    fn compare(&self, op: BinOp, left: &Value, right: &Value) -> bool {
        match op {
            BinOp::Equal => equals(left, right),
            BinOp::NotEqual => !equals(left, right),
            BinOp::Contains => contains(left, right),
            BinOp::LessThan | BinOp::LessEqual | BinOp::GreaterThan | BinOp::GreaterEqual => {
                let (Some(a), Some(b)) = (left.to_timestamp(self.now), right.to_timestamp(self.now))
                else {
                    trace!(
                        ?op,
                        left = type_name(left),
                        right = type_name(right),
                        "ordering operands do not resolve to timestamps"
                    );
                    return false;
                };
                match op {
                    BinOp::LessThan => a < b,
                    BinOp::LessEqual => a <= b,
                    BinOp::GreaterThan => a > b,
                    _ => a >= b,
                }
            }
            BinOp::In | BinOp::NotIn => {
                let candidates = right.clone().into_list();
                let hit = match left {
                    Value::List(items) => items.iter().any(|item| is_member(item, &candidates)),
                    scalar => is_member(scalar, &candidates),
                };
                if op == BinOp::In { hit } else { !hit }
            }
            BinOp::Add | BinOp::Subtract | BinOp::And | BinOp::Or => {
                unreachable!("handled in apply_binop")
            }
        }
    }
}

/// `=`: list membership when the left side is a list, value equality otherwise.
fn equals(left: &Value, right: &Value) -> bool {
    match left {
        Value::List(items) => items.iter().any(|item| values_equal(item, right)),
        scalar => values_equal(scalar, right),
    }
}

fn is_member(value: &Value, candidates: &[Value]) -> bool {
    candidates.iter().any(|candidate| values_equal(value, candidate))
}

/// Equality of two scalars; strings compare case-insensitively.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.to_lowercase() == y.to_lowercase(),
        (Value::Integer(x), Value::Integer(y)) => x == y,
        (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
            a.as_float() == b.as_float()
        }
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Timestamp(x), Value::Timestamp(y)) => x == y,
        (Value::Timestamp(t), Value::String(s)) | (Value::String(s), Value::Timestamp(t)) => {
            parse_timestamp(s) == Some(*t)
        }
        (Value::Null, Value::Null) => true,
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| values_equal(p, q))
        }
        _ => false,
    }
}

fn contains(left: &Value, right: &Value) -> bool {
    if matches!(left, Value::Null) || matches!(right, Value::Null) {
        return false;
    }
    let haystack = left.as_string().to_lowercase();
    let needle = right.as_string().to_lowercase();
    haystack.contains(&needle)
}

fn apply_unary(op: UnOp, value: &Value) -> Value {
    match (op, value) {
        (UnOp::Negate, Value::Integer(n)) => n.checked_neg().map(Value::Integer).unwrap_or(Value::Null),
        (UnOp::Negate, Value::Float(n)) => Value::Float(-n),
        (UnOp::Plus, Value::Integer(_) | Value::Float(_)) => value.clone(),
        (op, other) => match other.as_float() {
            Some(n) if op == UnOp::Negate => number(-n),
            Some(n) => number(n),
            None => {
                trace!(?op, operand = type_name(other), "unary operand is not numeric");
                Value::Null
            }
        },
    }
}

/// `+` adds and `-` subtracts, keeping integers when the result is whole.
fn apply_arithmetic(op: BinOp, left: &Value, right: &Value) -> Value {
    if let (Value::Integer(a), Value::Integer(b)) = (left, right) {
        let result = if op == BinOp::Add {
            a.checked_add(*b)
        } else {
            a.checked_sub(*b)
        };
        return result.map(Value::Integer).unwrap_or(Value::Null);
    }

    let (Some(a), Some(b)) = (left.as_float(), right.as_float()) else {
        trace!(
            ?op,
            left = type_name(left),
            right = type_name(right),
            "arithmetic operands are not numeric"
        );
        return Value::Null;
    };

    if let Some(ad) = Decimal::from_f64(a)
        && let Some(bd) = Decimal::from_f64(b)
    {
        let rd = if op == BinOp::Add { ad + bd } else { ad - bd };
        if rd.is_integer()
            && let Some(r) = rd.to_i64()
        {
            return Value::Integer(r);
        } else if let Some(r) = rd.to_f64() {
            return Value::Float(r);
        }
    }
    number(if op == BinOp::Add { a + b } else { a - b })
}

fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Integer(n as i64)
    } else {
        Value::Float(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_compare_case_insensitively() {
        assert!(values_equal(&Value::from("OPEN"), &Value::from("open")));
        assert!(!values_equal(&Value::from("3"), &Value::Integer(3)));
    }

    #[test]
    fn mixed_numbers_compare_by_value() {
        assert!(values_equal(&Value::Integer(3), &Value::Float(3.0)));
    }

    #[test]
    fn decimal_arithmetic_keeps_whole_results_integral() {
        let sum = apply_arithmetic(BinOp::Add, &Value::Float(0.1), &Value::Float(0.2));
        assert_eq!(sum, Value::Float(0.3));
        let diff = apply_arithmetic(BinOp::Subtract, &Value::Float(2.5), &Value::Float(0.5));
        assert_eq!(diff, Value::Integer(2));
    }

    #[test]
    fn arithmetic_on_non_numbers_is_null() {
        let result = apply_arithmetic(BinOp::Subtract, &Value::from("abc"), &Value::Integer(1));
        assert_eq!(result, Value::Null);
    }
}
