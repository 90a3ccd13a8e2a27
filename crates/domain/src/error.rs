//! Unified error types for the domain layer
//!
//! Provides a common error type for document-level operations (template reload,
//! item attachment, table editing, bar adjustment). The computation pipeline has
//! its own narrower errors: [`FormulaError`](crate::formula::FormulaError),
//! [`ResolveError`](crate::derived::ResolveError) and
//! [`RollError`](crate::derived::RollError).

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// # Example
    /// ```ignore
    /// if template.kind != ActorKind::Template {
    ///     return Err(DomainError::validation("Only templates can be reloaded from"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("template expected");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: template expected");
    }

    #[test]
    fn test_not_found_error() {
        let err = DomainError::not_found("Dynamic table", "attacks");
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(err.to_string().contains("Dynamic table"));
        assert!(err.to_string().contains("attacks"));
    }

    #[test]
    fn test_constraint_error() {
        let err = DomainError::constraint("duplicate column key: damage");
        assert_eq!(
            err.to_string(),
            "Constraint violation: duplicate column key: damage"
        );
    }

    #[test]
    fn test_invalid_id_from_str() {
        let err = "not-a-uuid".parse::<crate::ActorId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }
}
