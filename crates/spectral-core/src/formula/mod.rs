//! Arithmetic formulas over named variables, as written in the index catalog.
//!
//! A [`Formula`] is parsed once and evaluated many times, against scalars or
//! whole bands. See [`parser`] for the grammar and [`eval`] for the numeric
//! policy.

mod eval;
mod lexer;
pub mod parser;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

pub use eval::{Operand, Value};
pub use parser::{BinOp, Expr};

/// A parsed formula together with its source text and free variables.
#[derive(Debug, Clone)]
pub struct Formula {
    source: String,
    expr: Expr,
    /// Free variables in order of first appearance.
    variables: Vec<String>,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = lexer::tokenize(source)?;
        let expr = parser::Parser::new(source, tokens).parse()?;
        let mut variables = Vec::new();
        collect_variables(&expr, &mut variables);
        Ok(Self { source: source.to_string(), expr, variables })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Evaluate with `lookup` resolving each variable. Division by zero
    /// writes `nodata`.
    ///
    /// Fails with [`Error::MissingVariable`] (the formula text standing in
    /// for the index name) when `lookup` has no value for a variable.
    pub fn evaluate<'a, F>(&self, lookup: F, nodata: f64) -> Result<Value<'a>>
    where
        F: Fn(&str) -> Option<Operand<'a>>,
    {
        eval::eval(&self.expr, &lookup, nodata).map_err(|variable| Error::MissingVariable {
            index: self.source.clone(),
            variable,
        })
    }
}

fn collect_variables(expr: &Expr, names: &mut Vec<String>) {
    match expr {
        Expr::Var(name) => {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        Expr::Binary { left, right, .. } => {
            collect_variables(left, names);
            collect_variables(right, names);
        }
        Expr::Neg(inner) => collect_variables(inner, names),
        Expr::Num(_) => {}
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Formula {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Formula::parse(s)
    }
}

impl Serialize for Formula {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Formula {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let source = String::deserialize(d)?;
        Formula::parse(&source).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_relative_eq;

    use super::*;

    fn scalar_eval(src: &str, vars: &[(&str, f64)]) -> f64 {
        let env: HashMap<&str, f64> = vars.iter().copied().collect();
        Formula::parse(src)
            .unwrap()
            .evaluate(|name| env.get(name).map(|&v| Operand::Scalar(v)), f64::NAN)
            .unwrap()
            .as_scalar()
            .unwrap()
    }

    #[test]
    fn variables_in_first_appearance_order_without_duplicates() {
        let f = Formula::parse("(1.0 + L) * (N - R) / (N + R + L)").unwrap();
        assert_eq!(f.variables(), &["L", "N", "R"]);
    }

    #[test]
    fn ndvi_on_scalars() {
        let v = scalar_eval("(N - R) / (N + R)", &[("N", 0.5), ("R", 0.2)]);
        assert_relative_eq!(v, 0.3 / 0.7, epsilon = 1e-12);
    }

    #[test]
    fn power_is_right_associative_and_beats_negation() {
        assert_relative_eq!(scalar_eval("2 ** 3 ** 2", &[]), 512.0);
        assert_relative_eq!(scalar_eval("-2 ** 2", &[]), -4.0);
        assert_relative_eq!(scalar_eval("(-2) ** 2", &[]), 4.0);
        assert_relative_eq!(scalar_eval("2 ** -1", &[]), 0.5);
    }

    #[test]
    fn division_by_zero_gives_nodata() {
        assert!(scalar_eval("N / (N - N)", &[("N", 0.3)]).is_nan());
    }

    #[test]
    fn array_operands_evaluate_element_wise() {
        let n = [0.5, 0.8];
        let r = [0.2, 0.2];
        let f = Formula::parse("(N - R) / (N + R)").unwrap();
        let out = f
            .evaluate(
                |name| match name {
                    "N" => Some(Operand::Array(&n)),
                    "R" => Some(Operand::Array(&r)),
                    _ => None,
                },
                f64::NAN,
            )
            .unwrap()
            .into_vec(2);
        assert_relative_eq!(out[0], 0.3 / 0.7, epsilon = 1e-12);
        assert_relative_eq!(out[1], 0.6, epsilon = 1e-12);
    }

    #[test]
    fn unbound_variable_is_reported_by_name() {
        let f = Formula::parse("N * G").unwrap();
        match f.evaluate(|name| (name == "N").then_some(Operand::Scalar(1.0)), f64::NAN) {
            Err(Error::MissingVariable { variable, .. }) => assert_eq!(variable, "G"),
            other => panic!("expected missing variable, got {other:?}"),
        }
    }

    #[test]
    fn serde_round_trips_through_source_text() {
        let f: Formula = serde_json::from_str("\"N / R\"").unwrap();
        assert_eq!(serde_json::to_string(&f).unwrap(), "\"N / R\"");
        assert!(serde_json::from_str::<Formula>("\"N / \"").is_err());
    }
}
