//! Header (schema) algebra.
//!
//! A [`Header`] is the ordered attribute list describing a relvar at a point
//! in the operator tree. Projection, renaming, computation and natural-join
//! unification are all header operations; the compiler only decides when to
//! materialize pending names as subquery columns.

use serde::{Deserialize, Serialize};

use crate::error::{RelError, RelResult};
use crate::parser::AttrSpec;

/// SQL type tag of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    /// Character data.
    Text,
    /// Numeric or boolean data.
    Numeric,
    /// Large opaque values, excluded from join keys and literal restrictions.
    Blob,
    /// Anything else, including not-yet-materialized computed columns.
    Other,
}

impl SqlType {
    /// Whether two attributes of these types may be unified by a join.
    pub fn compatible(self, other: SqlType) -> bool {
        self == other || self == SqlType::Other || other == SqlType::Other
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlType::Text => write!(f, "text"),
            SqlType::Numeric => write!(f, "numeric"),
            SqlType::Blob => write!(f, "blob"),
            SqlType::Other => write!(f, "other"),
        }
    }
}

/// Quote an identifier for the target engine.
pub fn quote(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// A single attribute of a header.
///
/// `name` is the column name, or the raw expression text while `computed`
/// is set. A non-empty `alias` marks the attribute unresolved: it must be
/// materialized through a subquery wrap before a WHERE clause may reference
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub sql_type: SqlType,
    pub is_key: bool,
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub computed: bool,
}

impl Attribute {
    /// Create a resolved attribute with the given name, type and key flag.
    pub fn new(name: impl Into<String>, sql_type: SqlType, is_key: bool) -> Self {
        Self {
            name: name.into(),
            sql_type,
            is_key,
            nullable: !is_key,
            default: None,
            comment: String::new(),
            alias: None,
            computed: false,
        }
    }

    /// The name this attribute will carry once materialized.
    pub fn effective_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Render this attribute as a select-list item.
    pub fn select_item(&self) -> String {
        match &self.alias {
            None => quote(&self.name),
            Some(alias) if self.computed => format!("{} AS {}", self.name, quote(alias)),
            Some(alias) => format!("{} AS {}", quote(&self.name), quote(alias)),
        }
    }
}

/// The ordered attribute list of a relvar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Header {
    pub attrs: Vec<Attribute>,
}

impl Header {
    pub fn new(attrs: Vec<Attribute>) -> Self {
        Self { attrs }
    }

    /// Look up a resolved attribute by column name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| !a.computed && a.name == name)
    }

    /// Names of the primary-key attributes.
    pub fn primary_key(&self) -> Vec<&str> {
        self.attrs
            .iter()
            .filter(|a| a.is_key)
            .map(|a| a.name.as_str())
            .collect()
    }

    /// Names of the non-key attributes.
    pub fn dependent_fields(&self) -> Vec<&str> {
        self.attrs
            .iter()
            .filter(|a| !a.is_key)
            .map(|a| a.name.as_str())
            .collect()
    }

    /// Names of the blob attributes.
    pub fn blob_names(&self) -> Vec<&str> {
        self.attrs
            .iter()
            .filter(|a| a.sql_type == SqlType::Blob)
            .map(|a| a.name.as_str())
            .collect()
    }

    /// Names of every non-blob attribute.
    pub fn not_blobs(&self) -> Vec<&str> {
        self.attrs
            .iter()
            .filter(|a| a.sql_type != SqlType::Blob)
            .map(|a| a.name.as_str())
            .collect()
    }

    /// Whether any attribute is still unresolved.
    pub fn has_aliases(&self) -> bool {
        self.attrs.iter().any(|a| a.alias.is_some())
    }

    /// Non-blob column names present in both headers, in this header's order.
    pub fn common_non_blob(&self, other: &Header) -> Vec<String> {
        self.attrs
            .iter()
            .filter(|a| a.sql_type != SqlType::Blob && !a.computed)
            .filter(|a| {
                other
                    .get(&a.name)
                    .map(|b| b.sql_type != SqlType::Blob)
                    .unwrap_or(false)
            })
            .map(|a| a.name.clone())
            .collect()
    }

    /// Materialize pending names. Used only after a subquery wrap, where the
    /// renamed and computed columns have just become base columns.
    pub fn strip_aliases(&mut self) {
        for attr in &mut self.attrs {
            if let Some(alias) = attr.alias.take() {
                attr.name = alias;
                attr.computed = false;
            }
        }
    }

    /// Render the full select list for a subquery wrap or a fetch.
    pub fn select_list(&self) -> String {
        self.attrs
            .iter()
            .map(|a| a.select_item())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Apply a projection/rename/compute specifier list.
    ///
    /// Primary-key attributes are carried through whether or not they are
    /// listed; an empty specifier list therefore yields the key alone.
    pub fn project(&self, specs: &[AttrSpec]) -> RelResult<Header> {
        // names consumed as plain/rename sources; the wildcard skips these
        let consumed: Vec<&str> = specs
            .iter()
            .filter_map(|s| match s {
                AttrSpec::Name(name) => Some(name.as_str()),
                AttrSpec::Rename { from, .. } => Some(from.as_str()),
                _ => None,
            })
            .collect();

        let mut out: Vec<Attribute> = Vec::new();
        for spec in specs {
            match spec {
                AttrSpec::All => {
                    for attr in &self.attrs {
                        if !consumed.contains(&attr.name.as_str()) {
                            out.push(attr.clone());
                        }
                    }
                }
                AttrSpec::Name(name) => {
                    let attr = self
                        .get(name)
                        .ok_or_else(|| RelError::UnknownAttribute(name.clone()))?;
                    out.push(attr.clone());
                }
                AttrSpec::Rename { from, to } => {
                    let mut attr = self
                        .get(from)
                        .cloned()
                        .ok_or_else(|| RelError::UnknownAttribute(from.clone()))?;
                    attr.alias = Some(to.clone());
                    out.push(attr);
                }
                AttrSpec::Compute { expr, to } => {
                    out.push(Attribute {
                        name: expr.clone(),
                        sql_type: SqlType::Other,
                        is_key: false,
                        nullable: true,
                        default: None,
                        comment: String::new(),
                        alias: Some(to.clone()),
                        computed: true,
                    });
                }
            }
        }

        // the key can never be projected away
        for attr in &self.attrs {
            if attr.is_key && !out.iter().any(|o| !o.computed && o.name == attr.name) {
                out.push(attr.clone());
            }
        }

        let mut seen: Vec<&str> = Vec::with_capacity(out.len());
        for attr in &out {
            let name = attr.effective_name();
            if seen.contains(&name) {
                return Err(RelError::DuplicateAttribute(name.to_string()));
            }
            seen.push(name);
        }

        Ok(Header::new(out))
    }

    /// Unify two headers for a natural join.
    ///
    /// Same-named attributes on both sides become the match columns; the
    /// result's primary key is the union of both keys.
    pub fn join(left: &Header, right: &Header) -> RelResult<Header> {
        let mut out: Vec<Attribute> = Vec::new();
        for a in &left.attrs {
            match right.get(&a.name) {
                Some(b) => {
                    if a.sql_type == SqlType::Blob || b.sql_type == SqlType::Blob {
                        return Err(RelError::BlobJoinKey(a.name.clone()));
                    }
                    if !a.sql_type.compatible(b.sql_type) {
                        return Err(RelError::TypeMismatch {
                            attribute: a.name.clone(),
                            left: a.sql_type.to_string(),
                            right: b.sql_type.to_string(),
                        });
                    }
                    let mut merged = a.clone();
                    merged.is_key = a.is_key || b.is_key;
                    merged.nullable = a.nullable && b.nullable;
                    out.push(merged);
                }
                None => out.push(a.clone()),
            }
        }
        for b in &right.attrs {
            if left.get(&b.name).is_none() {
                out.push(b.clone());
            }
        }
        Ok(Header::new(out))
    }
}
