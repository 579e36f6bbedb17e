//! Attribute-specifier parser using nom.
//!
//! Projections, aggregations and fetches all take the same specifier
//! grammar:
//!
//! ```text
//! name          plain inclusion
//! *             wildcard (everything not otherwise consumed)
//! old->new      rename
//! expr->new     compute (any non-identifier left side)
//! ```

use nom::{
    bytes::complete::{take_while, take_while1},
    combinator::{all_consuming, recognize},
    sequence::pair,
    IResult,
};

use serde::{Deserialize, Serialize};

/// A single attribute specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrSpec {
    /// All attributes not consumed by another specifier (`*`).
    All,
    /// A named attribute.
    Name(String),
    /// Rename an existing attribute (`old->new`).
    Rename { from: String, to: String },
    /// A computed attribute (`expr->new`).
    Compute { expr: String, to: String },
}

impl AttrSpec {
    /// The output name this specifier produces, if it has a single one.
    pub fn target(&self) -> Option<&str> {
        match self {
            AttrSpec::All => None,
            AttrSpec::Name(name) => Some(name),
            AttrSpec::Rename { to, .. } | AttrSpec::Compute { to, .. } => Some(to),
        }
    }
}

impl std::fmt::Display for AttrSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrSpec::All => write!(f, "*"),
            AttrSpec::Name(name) => write!(f, "{}", name),
            AttrSpec::Rename { from, to } => write!(f, "{}->{}", from, to),
            AttrSpec::Compute { expr, to } => write!(f, "{}->{}", expr, to),
        }
    }
}

/// Parse an identifier (attribute or column name).
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))(input)
}

/// Whether the whole string is a single identifier.
fn is_identifier(input: &str) -> bool {
    all_consuming(identifier)(input).is_ok()
}

/// Parse one attribute specifier.
///
/// The split is on the last `->` so compute expressions may themselves
/// contain the arrow (e.g. JSON operators). A left side that is a bare
/// identifier is a rename; anything else is a compute.
pub fn parse_spec(input: &str) -> AttrSpec {
    let spec = input.trim();
    if spec == "*" {
        return AttrSpec::All;
    }
    if let Some((lhs, rhs)) = spec.rsplit_once("->") {
        let (lhs, rhs) = (lhs.trim(), rhs.trim());
        if is_identifier(rhs) {
            if is_identifier(lhs) {
                return AttrSpec::Rename {
                    from: lhs.to_string(),
                    to: rhs.to_string(),
                };
            }
            return AttrSpec::Compute {
                expr: lhs.to_string(),
                to: rhs.to_string(),
            };
        }
    }
    AttrSpec::Name(spec.to_string())
}

/// Parse a list of attribute specifiers.
pub fn parse_specs(inputs: &[&str]) -> Vec<AttrSpec> {
    inputs.iter().map(|s| parse_spec(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard() {
        assert_eq!(parse_spec("*"), AttrSpec::All);
        assert_eq!(parse_spec("  *  "), AttrSpec::All);
    }

    #[test]
    fn test_plain_name() {
        assert_eq!(parse_spec("email"), AttrSpec::Name("email".to_string()));
    }

    #[test]
    fn test_rename() {
        assert_eq!(
            parse_spec("id->user_id"),
            AttrSpec::Rename {
                from: "id".to_string(),
                to: "user_id".to_string(),
            }
        );
    }

    #[test]
    fn test_compute() {
        assert_eq!(
            parse_spec("COUNT(*)->total"),
            AttrSpec::Compute {
                expr: "COUNT(*)".to_string(),
                to: "total".to_string(),
            }
        );
    }

    #[test]
    fn test_compute_with_inner_arrow() {
        // only the last arrow splits
        assert_eq!(
            parse_spec("doc->>'$.name'->label"),
            AttrSpec::Compute {
                expr: "doc->>'$.name'".to_string(),
                to: "label".to_string(),
            }
        );
    }

    #[test]
    fn test_arrow_without_identifier_target_is_a_name() {
        assert_eq!(
            parse_spec("a->b c"),
            AttrSpec::Name("a->b c".to_string())
        );
    }

    #[test]
    fn test_targets() {
        assert_eq!(parse_spec("x").target(), Some("x"));
        assert_eq!(parse_spec("x->y").target(), Some("y"));
        assert_eq!(parse_spec("*").target(), None);
    }
}
