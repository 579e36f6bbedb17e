//! Literal encoder: tuple value sets to SQL predicates.
//!
//! Encodes a non-empty record sequence as
//! `(f1=v1 AND f2=v2) OR (f1=v1' AND ...)`, one parenthesized group per
//! record (a single record stays bare). Fields have already been projected
//! onto the header by the restriction evaluator.

use crate::error::{RelError, RelResult};
use crate::header::{quote, Header, SqlType};
use crate::restriction::{Row, Value};

/// Record count above which a subquery restriction is advised instead.
pub const VALUE_SET_ADVISORY_LIMIT: usize = 512;

/// Encode a tuple value set over the given fields.
pub fn encode(header: &Header, fields: &[String], rows: &[Row]) -> RelResult<String> {
    if rows.len() > VALUE_SET_ADVISORY_LIMIT {
        tracing::warn!(
            records = rows.len(),
            limit = VALUE_SET_ADVISORY_LIMIT,
            "large literal value set; a subquery restriction would compile to a smaller statement"
        );
    }

    let mut clauses: Vec<String> = Vec::with_capacity(rows.len());
    for row in rows {
        let mut parts: Vec<String> = Vec::new();
        for field in fields {
            let Some(value) = row.get(field) else {
                continue;
            };
            let attr = header
                .get(field)
                .ok_or_else(|| RelError::UnknownAttribute(field.clone()))?;
            if attr.sql_type == SqlType::Blob {
                return Err(RelError::BlobInRestriction(field.clone()));
            }
            parts.push(format!("{}={}", quote(field), encode_value(field, value)?));
        }
        if parts.is_empty() {
            // a record constraining no visible field admits every tuple
            clauses.push("TRUE".to_string());
        } else {
            clauses.push(parts.join(" AND "));
        }
    }

    if clauses.len() == 1 {
        Ok(clauses.remove(0))
    } else {
        Ok(clauses
            .iter()
            .map(|c| format!("({})", c))
            .collect::<Vec<_>>()
            .join(" OR "))
    }
}

fn encode_value(field: &str, value: &Value) -> RelResult<String> {
    match value {
        Value::Str(s) => Ok(quote_str(s)),
        Value::Int(n) => Ok(n.to_string()),
        // f64 Display is shortest-round-trip
        Value::Float(x) => Ok(x.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("NULL".to_string()),
        Value::Array(_) => Err(RelError::NonScalarLiteral(field.to_string())),
    }
}

/// Quote a string literal: backslashes doubled to neutralize escape
/// processing, then single quotes doubled.
pub fn quote_str(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Attribute;
    use pretty_assertions::assert_eq;

    fn header() -> Header {
        Header::new(vec![
            Attribute::new("a", SqlType::Numeric, true),
            Attribute::new("b", SqlType::Text, false),
            Attribute::new("data", SqlType::Blob, false),
        ])
    }

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_single_record_single_field() {
        let sql = encode(&header(), &["a".into()], &[row(&[("a", Value::Int(3))])]).unwrap();
        assert_eq!(sql, "`a`=3");
    }

    #[test]
    fn test_two_records_or_combined() {
        let rows = vec![
            row(&[("a", Value::Int(1)), ("b", Value::Str("x".into()))]),
            row(&[("a", Value::Int(2)), ("b", Value::Str("y".into()))]),
        ];
        let sql = encode(&header(), &["a".into(), "b".into()], &rows).unwrap();
        assert_eq!(sql, "(`a`=1 AND `b`='x') OR (`a`=2 AND `b`='y')");
    }

    #[test]
    fn test_string_escaping_round_trips() {
        let sql = encode(
            &header(),
            &["b".into()],
            &[row(&[("b", Value::Str("O'Brien\\".into()))])],
        )
        .unwrap();
        assert_eq!(sql, "`b`='O''Brien\\\\'");
    }

    #[test]
    fn test_blob_field_rejected() {
        let err = encode(
            &header(),
            &["data".into()],
            &[row(&[("data", Value::Str("x".into()))])],
        )
        .unwrap_err();
        assert!(matches!(err, RelError::BlobInRestriction(name) if name == "data"));
    }

    #[test]
    fn test_array_value_rejected() {
        let err = encode(
            &header(),
            &["a".into()],
            &[row(&[("a", Value::Array(vec![Value::Int(1)]))])],
        )
        .unwrap_err();
        assert!(matches!(err, RelError::NonScalarLiteral(name) if name == "a"));
    }

    #[test]
    fn test_bool_and_float_formatting() {
        let rows = vec![row(&[("a", Value::Float(0.1)), ("b", Value::Bool(true))])];
        let sql = encode(&header(), &["a".into(), "b".into()], &rows).unwrap();
        assert_eq!(sql, "`a`=0.1 AND `b`=true");
    }

    #[test]
    fn test_record_without_common_fields_admits_all() {
        let rows = vec![row(&[("a", Value::Int(1))]), Row::new()];
        let sql = encode(&header(), &["a".into()], &rows).unwrap();
        assert_eq!(sql, "(`a`=1) OR (TRUE)");
    }
}
