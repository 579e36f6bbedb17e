//! Error types for relvar.

use thiserror::Error;

/// The main error type for relvar operations.
#[derive(Debug, Error)]
pub enum RelError {
    /// A union or negation was compiled as a standalone query.
    #[error("a {0} is not executable on its own; use it as a restriction value")]
    InvalidStandaloneOperator(&'static str),

    /// Two attributes in a projection result share a name.
    #[error("duplicate attribute '{0}' in projection")]
    DuplicateAttribute(String),

    /// A plain or rename specifier referenced a name the header does not have.
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    /// Same-named attributes with incompatible types on both sides of a join.
    #[error("type mismatch on '{attribute}': {left} vs {right}")]
    TypeMismatch {
        attribute: String,
        left: String,
        right: String,
    },

    /// A blob attribute appeared where tuples are matched by name.
    #[error("blob attribute '{0}' cannot be used as a join key")]
    BlobJoinKey(String),

    /// An aggregation projected no computed attribute.
    #[error("aggregation requires at least one computed attribute")]
    AggregateRequiresComputation,

    /// A blob attribute appeared in a literal value restriction.
    #[error("blob attribute '{0}' cannot be restricted by literal values")]
    BlobInRestriction(String),

    /// A field in a tuple record held something other than a single scalar.
    #[error("value for '{0}' is not a scalar literal")]
    NonScalarLiteral(String),

    /// Requested attribute count does not match the output bindings.
    #[error("arity mismatch: {0}")]
    ArityMismatch(String),

    /// A single-record fetch matched a different number of records.
    #[error("expected exactly one matching record, found {0}")]
    NotScalar(usize),

    /// A restriction argument had a shape the restrictor cannot interpret.
    #[error("cannot interpret restriction: {0}")]
    MultiRestrictionShape(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("execution error: {0}")]
    Execution(String),
}

impl RelError {
    /// Create an arity-mismatch error.
    pub fn arity(message: impl Into<String>) -> Self {
        Self::ArityMismatch(message.into())
    }

    /// Create a restriction-shape error.
    pub fn shape(message: impl Into<String>) -> Self {
        Self::MultiRestrictionShape(message.into())
    }
}

/// Result type alias for relvar operations.
pub type RelResult<T> = Result<T, RelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelError::InvalidStandaloneOperator("union");
        assert_eq!(
            err.to_string(),
            "a union is not executable on its own; use it as a restriction value"
        );
    }

    #[test]
    fn test_not_scalar_display() {
        let err = RelError::NotScalar(3);
        assert_eq!(err.to_string(), "expected exactly one matching record, found 3");
    }
}
