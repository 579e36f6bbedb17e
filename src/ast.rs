//! Operator tree for relvars.
//!
//! A [`Relvar`] is an operator node plus its restriction list. Combinators
//! return new value trees; the only in-place mutation is appending to the
//! receiver's own restriction list via [`Relvar::restrict`].

use std::sync::Arc;

use crate::error::{RelError, RelResult};
use crate::parser::{parse_specs, AttrSpec};
use crate::restriction::Restriction;
use crate::schema::TableDef;

/// An operator node in a relvar tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A leaf over external table metadata.
    Table(Arc<TableDef>),
    /// Projection/rename/compute over one child.
    Project {
        input: Box<Relvar>,
        specs: Vec<AttrSpec>,
    },
    /// Projection with grouping over a second relvar.
    Aggregate {
        input: Box<Relvar>,
        grouping: Box<Relvar>,
        specs: Vec<AttrSpec>,
    },
    /// Natural join of two children.
    Join(Box<Relvar>, Box<Relvar>),
    /// OR-combination of restriction operands; only valid as a restriction.
    Union(Vec<Restriction>),
    /// Negation of one child; only valid as a restriction.
    Negation(Box<Relvar>),
}

/// A relational variable: an operator node and its restrictions.
#[derive(Debug, Clone, PartialEq)]
pub struct Relvar {
    node: Node,
    restrictions: Vec<Restriction>,
}

impl Relvar {
    fn from_node(node: Node) -> Self {
        Self {
            node,
            restrictions: Vec::new(),
        }
    }

    /// A leaf relvar over a table definition.
    pub fn table(def: &TableDef) -> Self {
        Self::from_node(Node::Table(Arc::new(def.clone())))
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    /// Project/rename/compute. An empty specifier list keeps the key alone.
    pub fn project(&self, specs: &[&str]) -> Relvar {
        Self::from_node(Node::Project {
            input: Box::new(self.clone()),
            specs: parse_specs(specs),
        })
    }

    /// Natural join with another relvar.
    pub fn join(&self, other: &Relvar) -> Relvar {
        Self::from_node(Node::Join(Box::new(self.clone()), Box::new(other.clone())))
    }

    /// Projection with grouping: the receiver is grouped by its primary key
    /// and paired with `grouping`; the specifiers may compute aggregate
    /// expressions over the pairing.
    pub fn aggregate(&self, specs: &[&str], grouping: &Relvar) -> Relvar {
        Self::from_node(Node::Aggregate {
            input: Box::new(self.clone()),
            grouping: Box::new(grouping.clone()),
            specs: parse_specs(specs),
        })
    }

    /// Conjoin a restriction onto a copy of this relvar.
    pub fn and(&self, restriction: impl Into<Restriction>) -> Relvar {
        let mut derived = self.clone();
        derived.restrictions.push(restriction.into());
        derived
    }

    /// Antijoin: conjoin a negated restriction onto a copy of this relvar.
    pub fn minus(&self, restriction: impl Into<Restriction>) -> Relvar {
        let mut derived = self.clone();
        derived.restrictions.push(Restriction::Not);
        derived.restrictions.push(restriction.into());
        derived
    }

    /// An OR-combination of restriction operands. Nested restriction-free
    /// unions are absorbed, never left nested.
    pub fn union(operands: impl IntoIterator<Item = Restriction>) -> RelResult<Relvar> {
        let mut flat: Vec<Restriction> = Vec::new();
        for operand in operands {
            match operand {
                Restriction::Not => {
                    return Err(RelError::shape(
                        "a bare negation token is not a union operand",
                    ));
                }
                Restriction::Relvar(rv)
                    if matches!(rv.node, Node::Union(_)) && rv.restrictions.is_empty() =>
                {
                    if let Node::Union(inner) = rv.node {
                        flat.extend(inner);
                    }
                }
                other => flat.push(other),
            }
        }
        if flat.len() < 2 {
            return Err(RelError::shape("a union requires at least two operands"));
        }
        Ok(Self::from_node(Node::Union(flat)))
    }

    /// Negate this relvar. Negating a negation returns the original child.
    pub fn negate(self) -> Relvar {
        match self {
            Relvar {
                node: Node::Negation(child),
                restrictions,
            } if restrictions.is_empty() => *child,
            other => Self::from_node(Node::Negation(Box::new(other))),
        }
    }

    /// Append a restriction in place.
    pub fn restrict(&mut self, restriction: impl Into<Restriction>) {
        self.restrictions.push(restriction.into());
    }

    /// Append a JSON-shaped restriction in place.
    pub fn restrict_json(&mut self, value: serde_json::Value) -> RelResult<()> {
        self.restrictions.push(Restriction::from_json(value)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableDef;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn users() -> Relvar {
        Relvar::table(
            &TableDef::new("users")
                .pk("id", "int")
                .column("email", "varchar"),
        )
    }

    #[test]
    fn test_and_leaves_receiver_untouched() {
        let base = users();
        let restricted = base.and("active = 1");
        assert!(base.restrictions().is_empty());
        assert_eq!(restricted.restrictions().len(), 1);
    }

    #[test]
    fn test_minus_prepends_negation_token() {
        let derived = users().minus("active = 1");
        assert_eq!(derived.restrictions()[0], Restriction::Not);
        assert_eq!(
            derived.restrictions()[1],
            Restriction::Expr("active = 1".into())
        );
    }

    #[test]
    fn test_restrict_mutates_in_place() {
        let mut rv = users();
        rv.restrict("role = 'admin'");
        rv.restrict_json(json!({"id": 3})).unwrap();
        let mut row = crate::restriction::Row::new();
        row.insert("email".into(), "x@y.z".into());
        rv.restrict(row);
        assert_eq!(rv.restrictions().len(), 3);
    }

    #[test]
    fn test_restrict_json_rejects_bad_shapes() {
        let mut rv = users();
        let err = rv.restrict_json(json!(true)).unwrap_err();
        assert!(matches!(err, RelError::MultiRestrictionShape(_)));
        assert!(rv.restrictions().is_empty());
    }

    #[test]
    fn test_double_negation_cancels() {
        let rv = users().and("active = 1");
        let back = rv.clone().negate().negate();
        assert_eq!(back, rv);
    }

    #[test]
    fn test_union_flattens_nested_unions() {
        let inner = Relvar::union([
            Restriction::expr("a = 1"),
            Restriction::expr("a = 2"),
        ])
        .unwrap();
        let outer = Relvar::union([inner.into(), Restriction::expr("a = 3")]).unwrap();
        match outer.node() {
            Node::Union(ops) => assert_eq!(ops.len(), 3),
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_union_rejects_negation_token() {
        let err =
            Relvar::union([Restriction::Not, Restriction::expr("a = 1")]).unwrap_err();
        assert!(matches!(err, RelError::MultiRestrictionShape(_)));
    }

    #[test]
    fn test_union_requires_two_operands() {
        let err = Relvar::union([Restriction::expr("a = 1")]).unwrap_err();
        assert!(matches!(err, RelError::MultiRestrictionShape(_)));
    }
}
