//! SQL transpiler for relvar operator trees.
//!
//! Walks a tree bottom-up, producing a `(Header, FROM-fragment)` pair per
//! node. Fragments may carry a trailing `WHERE`; the enclosure rules wrap a
//! fragment as a named subquery whenever it is about to be consumed in a
//! position where that would not parse, or when pending rename/compute
//! names must become real columns.

use crate::ast::{Node, Relvar};
use crate::error::{RelError, RelResult};
use crate::header::{quote, Header, SqlType};
use crate::literal;
use crate::restriction::Restriction;

/// Enclosure mode for one compile step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enclose {
    /// Never enclose.
    Never,
    /// Enclose only if the result still has unresolved aliases.
    IfAliased,
    /// Enclose unless the node is a bare table or join with no restrictions.
    UnlessBase,
    /// Enclose only if the node is an aggregation.
    IfAggregate,
}

/// Per-statement compilation context.
///
/// Owns the subquery alias counter, so generated aliases are unique within
/// one statement and unrelated compilations never contend.
#[derive(Debug, Default)]
pub struct Compiler {
    counter: u32,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_alias(&mut self) -> String {
        self.counter += 1;
        format!("t{:x}", self.counter)
    }

    /// Wrap a fragment as a named subquery, materializing pending names.
    fn enclose(&mut self, header: &mut Header, fragment: String) -> String {
        let alias = self.next_alias();
        let wrapped = format!("(SELECT {} FROM {}) AS {}", header.select_list(), fragment, alias);
        header.strip_aliases();
        wrapped
    }

    /// Compile a relvar into its header and FROM-fragment.
    pub fn compile(&mut self, rv: &Relvar, mode: Enclose) -> RelResult<(Header, String)> {
        let (mut header, mut fragment) = match rv.node() {
            Node::Table(def) => {
                let mut h = def.header();
                h.strip_aliases();
                (h, def.qualified_name())
            }
            Node::Project { input, specs } => {
                let (h, f) = self.compile(input, Enclose::IfAliased)?;
                (h.project(specs)?, f)
            }
            Node::Join(left, right) => {
                let (lh, lf) = self.compile(left, Enclose::UnlessBase)?;
                let (rh, rf) = self.compile(right, Enclose::UnlessBase)?;
                (Header::join(&lh, &rh)?, format!("{} NATURAL JOIN {}", lf, rf))
            }
            Node::Aggregate {
                input,
                grouping,
                specs,
            } => {
                let (lh, lf) = self.compile(input, Enclose::UnlessBase)?;
                let (rh, rf) = self.compile(grouping, Enclose::UnlessBase)?;
                for attr in &lh.attrs {
                    if let Some(other) = rh.get(&attr.name) {
                        if attr.sql_type == SqlType::Blob || other.sql_type == SqlType::Blob {
                            return Err(RelError::BlobJoinKey(attr.name.clone()));
                        }
                    }
                }
                let group_cols = lh
                    .primary_key()
                    .iter()
                    .map(|c| quote(c))
                    .collect::<Vec<_>>()
                    .join(", ");
                let header = lh.project(specs)?;
                if !header.has_aliases() {
                    return Err(RelError::AggregateRequiresComputation);
                }
                (
                    header,
                    format!("{} NATURAL JOIN {} GROUP BY {}", lf, rf, group_cols),
                )
            }
            Node::Union(_) => return Err(RelError::InvalidStandaloneOperator("union")),
            Node::Negation(_) => return Err(RelError::InvalidStandaloneOperator("negation")),
        };

        // Restrictions. WHERE-clause field references must resolve to real
        // column names, so pending names are materialized first.
        let mut has_where = false;
        if !rv.restrictions().is_empty() {
            if header.has_aliases() {
                fragment = self.enclose(&mut header, fragment);
            }
            let clause = self.where_clause(rv.restrictions(), &header)?;
            if !clause.is_empty() {
                fragment = format!("{} WHERE {}", fragment, clause);
                has_where = true;
            }
        }

        let needs_enclosure = match mode {
            Enclose::Never => false,
            Enclose::IfAliased => header.has_aliases(),
            Enclose::UnlessBase => {
                !(matches!(rv.node(), Node::Table(_) | Node::Join(..)) && !has_where)
            }
            Enclose::IfAggregate => matches!(rv.node(), Node::Aggregate { .. }),
        };
        if needs_enclosure {
            fragment = self.enclose(&mut header, fragment);
        }

        Ok((header, fragment))
    }

    /// Build one AND-combined boolean expression from a restriction list.
    ///
    /// Empty result means no WHERE clause at all.
    pub fn where_clause(
        &mut self,
        restrictions: &[Restriction],
        header: &Header,
    ) -> RelResult<String> {
        let mut clauses: Vec<String> = Vec::new();
        let mut negate = false;
        for restriction in restrictions {
            if matches!(restriction, Restriction::Not) {
                negate = !negate;
                continue;
            }
            if let Some(clause) = self.eval(restriction, negate, header)? {
                clauses.push(clause);
            }
            negate = false;
        }
        Ok(clauses.join(" AND "))
    }

    /// Evaluate one restriction value. `None` is a no-op (matches every
    /// tuple and contributes nothing).
    fn eval(
        &mut self,
        restriction: &Restriction,
        negated: bool,
        header: &Header,
    ) -> RelResult<Option<String>> {
        match restriction {
            Restriction::Not => Err(RelError::shape("dangling negation token")),
            Restriction::Expr(expr) => Ok(Some(if negated {
                format!("NOT({})", expr)
            } else {
                expr.clone()
            })),
            Restriction::Tuples { fields, rows } => {
                let common: Vec<String> = fields
                    .iter()
                    .filter(|f| header.get(f).is_some())
                    .cloned()
                    .collect();
                if common.is_empty() {
                    // nothing to match on: everything passes, unless negated
                    return Ok(negated.then(|| "FALSE".to_string()));
                }
                if rows.is_empty() {
                    // known fields, empty set: nothing passes, unless negated
                    return Ok((!negated).then(|| "FALSE".to_string()));
                }
                let body = literal::encode(header, &common, rows)?;
                Ok(Some(if negated {
                    format!("NOT({})", body)
                } else {
                    body
                }))
            }
            Restriction::Relvar(rv) => match rv.node() {
                Node::Union(operands) => {
                    let mut parts: Vec<String> = Vec::new();
                    for operand in operands {
                        if let Some(clause) = self.eval(operand, false, header)? {
                            parts.push(clause);
                        }
                    }
                    if parts.is_empty() {
                        return Ok(None);
                    }
                    let joined = parts.join(" OR ");
                    Ok(Some(match (negated, parts.len() > 1) {
                        (true, _) => format!("NOT({})", joined),
                        (false, true) => format!("({})", joined),
                        (false, false) => joined,
                    }))
                }
                Node::Negation(child) => {
                    let inner = self.where_clause(child.restrictions(), header)?;
                    if negated {
                        // NOT NOT x: back to the child's own condition
                        return Ok((!inner.is_empty()).then_some(inner));
                    }
                    if inner.is_empty() {
                        // the child admits everything; its negation admits nothing
                        return Ok(Some("FALSE".to_string()));
                    }
                    Ok(Some(format!("NOT({})", inner)))
                }
                _ => self.eval_subquery(rv, negated, header),
            },
        }
    }

    /// Semijoin/antijoin against another relvar.
    fn eval_subquery(
        &mut self,
        rv: &Relvar,
        negated: bool,
        header: &Header,
    ) -> RelResult<Option<String>> {
        let (mut inner_header, mut inner_fragment) = self.compile(rv, Enclose::UnlessBase)?;
        if matches!(rv.node(), Node::Project { .. } | Node::Aggregate { .. })
            && rv.restrictions().is_empty()
            && inner_header.has_aliases()
        {
            inner_fragment = self.enclose(&mut inner_header, inner_fragment);
        }
        let common = header.common_non_blob(&inner_header);
        if common.is_empty() {
            return Ok(negated.then(|| "FALSE".to_string()));
        }
        let cols = common
            .iter()
            .map(|c| quote(c))
            .collect::<Vec<_>>()
            .join(", ");
        let keyword = if negated { "NOT IN" } else { "IN" };
        Ok(Some(format!(
            "({}) {} (SELECT {} FROM {})",
            cols, keyword, cols, inner_fragment
        )))
    }
}
