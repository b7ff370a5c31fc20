// SPDX-License-Identifier: MPL-2.0
//! Boolean filter expressions evaluated over feature properties.
//!
//! Layers attach an optional expression to decide which features of
//! their source they render. The vocabulary is the small set the viewer
//! needs: property lookup, numeric coercion and ordered comparison,
//! combined with `all`.

use serde_json::{Map, Value};

/// Property bag of a single feature.
pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A constant value.
    Literal(Value),
    /// Looks up a property by key; `Null` when absent.
    Get(String),
    /// `true` when the property key is present.
    Has(String),
    /// Coerces the inner expression to a number; `Null` when it cannot
    /// be interpreted as one.
    ToNumber(Box<Expression>),
    /// `left >= right` over numbers; `false` when either side is not
    /// numeric.
    Gte(Box<Expression>, Box<Expression>),
    /// `left < right` over numbers; `false` when either side is not
    /// numeric.
    Lt(Box<Expression>, Box<Expression>),
    /// `true` when every operand evaluates truthy.
    All(Vec<Expression>),
}

pub fn literal(value: impl Into<Value>) -> Expression {
    Expression::Literal(value.into())
}

pub fn get(key: impl Into<String>) -> Expression {
    Expression::Get(key.into())
}

pub fn has(key: impl Into<String>) -> Expression {
    Expression::Has(key.into())
}

pub fn to_number(inner: Expression) -> Expression {
    Expression::ToNumber(Box::new(inner))
}

pub fn gte(left: Expression, right: Expression) -> Expression {
    Expression::Gte(Box::new(left), Box::new(right))
}

pub fn lt(left: Expression, right: Expression) -> Expression {
    Expression::Lt(Box::new(left), Box::new(right))
}

pub fn all(operands: impl IntoIterator<Item = Expression>) -> Expression {
    Expression::All(operands.into_iter().collect())
}

impl Expression {
    /// Evaluates the expression against a feature's properties.
    pub fn evaluate(&self, properties: &Properties) -> Value {
        match self {
            Expression::Literal(value) => value.clone(),
            Expression::Get(key) => properties.get(key).cloned().unwrap_or(Value::Null),
            Expression::Has(key) => Value::Bool(properties.contains_key(key)),
            Expression::ToNumber(inner) => match as_number(&inner.evaluate(properties)) {
                Some(n) => number_value(n),
                None => Value::Null,
            },
            Expression::Gte(left, right) => compare(left, right, properties, |a, b| a >= b),
            Expression::Lt(left, right) => compare(left, right, properties, |a, b| a < b),
            Expression::All(operands) => Value::Bool(
                operands
                    .iter()
                    .all(|op| is_truthy(&op.evaluate(properties))),
            ),
        }
    }

    /// Evaluates as a layer filter: `true` when the feature passes.
    pub fn matches(&self, properties: &Properties) -> bool {
        is_truthy(&self.evaluate(properties))
    }
}

fn compare(
    left: &Expression,
    right: &Expression,
    properties: &Properties,
    ordering: fn(f64, f64) -> bool,
) -> Value {
    let result = match (
        as_number(&left.evaluate(properties)),
        as_number(&right.evaluate(properties)),
    ) {
        (Some(a), Some(b)) => ordering(a, b),
        _ => false,
    };
    Value::Bool(result)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(true) => Some(1.0),
        Value::Bool(false) => Some(0.0),
        _ => None,
    }
}

fn number_value(n: f64) -> Value {
    serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
