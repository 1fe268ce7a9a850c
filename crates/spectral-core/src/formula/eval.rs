//! Image-algebra evaluation of a parsed formula.
//!
//! Values are either scalars or per-pixel arrays. Scalar op scalar stays a
//! scalar; anything involving an array is applied element-wise, broadcasting
//! the scalar side.
//!
//! Numeric policy, per operator:
//! - `a / b` with `b == 0.0` yields the caller's no-data sentinel.
//! - `a ** b` follows `f64::powf` (negative base, fractional exponent: NaN).
//! - NaN operands propagate through every operator.

use std::borrow::Cow;

use super::parser::{BinOp, Expr};

/// A value bound to a formula variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand<'a> {
    Scalar(f64),
    Array(&'a [f64]),
}

/// Intermediate and final result of evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Scalar(f64),
    Array(Cow<'a, [f64]>),
}

impl<'a> Value<'a> {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Array(_) => None,
        }
    }

    /// Materialise as an owned band of `len` pixels, repeating a scalar.
    pub fn into_vec(self, len: usize) -> Vec<f64> {
        match self {
            Value::Scalar(v) => vec![v; len],
            Value::Array(a) => a.into_owned(),
        }
    }
}

impl<'a> From<Operand<'a>> for Value<'a> {
    fn from(op: Operand<'a>) -> Self {
        match op {
            Operand::Scalar(v) => Value::Scalar(v),
            Operand::Array(a) => Value::Array(Cow::Borrowed(a)),
        }
    }
}

#[inline]
fn apply(op: BinOp, a: f64, b: f64, nodata: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                nodata
            } else {
                a / b
            }
        }
        BinOp::Pow => a.powf(b),
    }
}

fn combine<'a>(op: BinOp, left: Value<'a>, right: Value<'a>, nodata: f64) -> Value<'a> {
    match (left, right) {
        (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(apply(op, a, b, nodata)),
        (Value::Scalar(a), Value::Array(b)) => {
            Value::Array(Cow::Owned(b.iter().map(|&y| apply(op, a, y, nodata)).collect()))
        }
        (Value::Array(a), Value::Scalar(b)) => {
            Value::Array(Cow::Owned(a.iter().map(|&x| apply(op, x, b, nodata)).collect()))
        }
        (Value::Array(a), Value::Array(b)) => {
            debug_assert_eq!(a.len(), b.len());
            Value::Array(Cow::Owned(
                a.iter().zip(b.iter()).map(|(&x, &y)| apply(op, x, y, nodata)).collect(),
            ))
        }
    }
}

/// Evaluate `expr`, resolving variables through `lookup`.
/// Returns the name of the first unbound variable on failure.
pub(crate) fn eval<'a, F>(expr: &Expr, lookup: &F, nodata: f64) -> Result<Value<'a>, String>
where
    F: Fn(&str) -> Option<Operand<'a>>,
{
    match expr {
        Expr::Num(n) => Ok(Value::Scalar(*n)),
        Expr::Var(name) => lookup(name).map(Value::from).ok_or_else(|| name.clone()),
        Expr::Neg(inner) => Ok(match eval(inner, lookup, nodata)? {
            Value::Scalar(v) => Value::Scalar(-v),
            Value::Array(a) => Value::Array(Cow::Owned(a.iter().map(|v| -v).collect())),
        }),
        Expr::Binary { op, left, right } => {
            let l = eval(left, lookup, nodata)?;
            let r = eval(right, lookup, nodata)?;
            Ok(combine(*op, l, r, nodata))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_and_array_broadcast_both_ways() {
        let a = [1.0, 2.0, 3.0];
        let l = combine(BinOp::Sub, Value::Scalar(10.0), Value::Array(Cow::Borrowed(&a)), f64::NAN);
        assert_eq!(l.into_vec(3), vec![9.0, 8.0, 7.0]);
        let r = combine(BinOp::Sub, Value::Array(Cow::Borrowed(&a)), Value::Scalar(10.0), f64::NAN);
        assert_eq!(r.into_vec(3), vec![-9.0, -8.0, -7.0]);
    }

    #[test]
    fn zero_divisor_yields_sentinel_per_pixel() {
        let num = [1.0, 2.0];
        let den = [0.0, 4.0];
        let v = combine(
            BinOp::Div,
            Value::Array(Cow::Borrowed(&num)),
            Value::Array(Cow::Borrowed(&den)),
            -9999.0,
        );
        assert_eq!(v.into_vec(2), vec![-9999.0, 0.5]);
    }

    #[test]
    fn nan_propagates() {
        assert!(apply(BinOp::Add, f64::NAN, 1.0, 0.0).is_nan());
        assert!(apply(BinOp::Pow, -8.0, 0.5, 0.0).is_nan());
    }

    #[test]
    fn scalar_result_materialises_to_requested_length() {
        assert_eq!(Value::Scalar(0.25).into_vec(3), vec![0.25; 3]);
    }
}
