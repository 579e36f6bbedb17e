//! Restriction value model.
//!
//! A relvar's restriction list is AND-combined by the compiler. Each entry
//! is one of: a raw SQL expression (trusted, inserted verbatim), a tuple
//! value set, another relvar (semijoin, or union/negation carried as a
//! node), or a negation token applying to exactly the next value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ast::Relvar;
use crate::error::{RelError, RelResult};

/// A scalar literal in a tuple record or a decoded result field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    Str(String),
    /// Multiple values; never encodable as a single literal
    Array(Vec<Value>),
}

impl Value {
    /// Convert a JSON value into a scalar value.
    pub fn from_json(value: &serde_json::Value) -> RelResult<Value> {
        match value {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else {
                    Ok(Value::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(s) => Ok(Value::Str(s.clone())),
            serde_json::Value::Array(items) => Ok(Value::Array(
                items.iter().map(Value::from_json).collect::<RelResult<_>>()?,
            )),
            serde_json::Value::Object(_) => Err(RelError::shape(
                "nested objects are not scalar field values",
            )),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Array(items) => {
                write!(f, "(")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

/// One tuple record: field name to scalar literal.
///
/// An ordered map so encoded statements are deterministic.
pub type Row = BTreeMap<String, Value>;

/// A single restriction on a relvar.
#[derive(Debug, Clone, PartialEq)]
pub enum Restriction {
    /// Raw SQL boolean expression, trusted and unescaped.
    Expr(String),
    /// An accepted-value set. The declared field list is carried separately
    /// from the records so a set with known fields and zero records stays
    /// distinguishable from one sharing no fields with the header.
    Tuples { fields: Vec<String>, rows: Vec<Row> },
    /// Another relvar: a semijoin subquery, or a union/negation node.
    Relvar(Relvar),
    /// Negation token; applies to exactly the next value in the list.
    Not,
}

impl Restriction {
    /// A raw SQL expression restriction.
    pub fn expr(expr: impl Into<String>) -> Self {
        Restriction::Expr(expr.into())
    }

    /// A tuple-set restriction; declared fields are the union of the record
    /// keys (sorted, as the records themselves are).
    pub fn rows(rows: Vec<Row>) -> Self {
        let mut fields: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !fields.contains(key) {
                    fields.push(key.clone());
                }
            }
        }
        fields.sort();
        Restriction::Tuples { fields, rows }
    }

    /// A single-record tuple-set restriction.
    pub fn tuple(row: Row) -> Self {
        Self::rows(vec![row])
    }

    /// A tuple-set restriction with an explicit field list. With no records
    /// this is the "known fields, empty set" case.
    pub fn value_set(fields: Vec<String>, rows: Vec<Row>) -> Self {
        Restriction::Tuples { fields, rows }
    }

    /// Interpret a JSON-shaped restriction argument.
    ///
    /// A string is a raw expression, an object a one-record tuple set, an
    /// array of objects a tuple set. Anything else cannot be interpreted.
    pub fn from_json(value: serde_json::Value) -> RelResult<Restriction> {
        match value {
            serde_json::Value::String(s) => Ok(Restriction::Expr(s)),
            serde_json::Value::Object(map) => Ok(Restriction::tuple(json_row(&map)?)),
            serde_json::Value::Array(items) => {
                let mut rows = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        serde_json::Value::Object(map) => rows.push(json_row(&map)?),
                        other => {
                            return Err(RelError::shape(format!(
                                "tuple-set element is not an object: {}",
                                other
                            )));
                        }
                    }
                }
                Ok(Restriction::rows(rows))
            }
            other => Err(RelError::shape(format!(
                "expected an expression string, a record, or a record list, got {}",
                other
            ))),
        }
    }
}

fn json_row(map: &serde_json::Map<String, serde_json::Value>) -> RelResult<Row> {
    let mut row = Row::new();
    for (key, value) in map {
        row.insert(key.clone(), Value::from_json(value)?);
    }
    Ok(row)
}

impl From<&str> for Restriction {
    fn from(expr: &str) -> Self {
        Restriction::Expr(expr.to_string())
    }
}

impl From<String> for Restriction {
    fn from(expr: String) -> Self {
        Restriction::Expr(expr)
    }
}

impl From<Relvar> for Restriction {
    fn from(relvar: Relvar) -> Self {
        Restriction::Relvar(relvar)
    }
}

impl From<Row> for Restriction {
    fn from(row: Row) -> Self {
        Restriction::tuple(row)
    }
}
