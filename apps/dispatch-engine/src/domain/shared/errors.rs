//! Domain errors shared by every bounded context.

use std::fmt;

/// Domain-level errors that can occur in business logic.
///
/// These errors are independent of infrastructure concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid value for a field.
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// Entity not found.
    NotFound {
        /// Entity type.
        entity_type: String,
        /// Entity identifier.
        id: String,
    },

    /// Aggregate invariant violated.
    InvariantViolation {
        /// Aggregate type.
        aggregate: String,
        /// Invariant that was violated.
        invariant: String,
    },
}

impl DomainError {
    /// Shorthand for an invalid field value.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { field, message } => {
                write!(f, "Invalid value for {field}: {message}")
            }
            Self::NotFound { entity_type, id } => {
                write!(f, "{entity_type} not found: {id}")
            }
            Self::InvariantViolation {
                aggregate,
                invariant,
            } => {
                write!(f, "{aggregate} invariant violated: {invariant}")
            }
        }
    }
}

impl std::error::Error for DomainError {}

/// Datastore failure surfaced by any repository.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// A record with the same identity already exists.
    #[error("{entity} already exists: {id}")]
    Duplicate {
        /// Entity type.
        entity: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// An update targeted a record that was never inserted.
    #[error("{entity} not found: {id}")]
    Missing {
        /// Entity type.
        entity: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// The backing store is unavailable.
    #[error("datastore unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_display() {
        let err = DomainError::invalid("qty", "must be positive");
        assert_eq!(err.to_string(), "Invalid value for qty: must be positive");
    }

    #[test]
    fn not_found_display() {
        let err = DomainError::NotFound {
            entity_type: "MasterOrder".to_string(),
            id: "m-1".to_string(),
        };
        assert_eq!(err.to_string(), "MasterOrder not found: m-1");
    }

    #[test]
    fn repository_error_display() {
        let err = RepositoryError::Duplicate {
            entity: "ChildOrder",
            id: "c-1".to_string(),
        };
        assert_eq!(err.to_string(), "ChildOrder already exists: c-1");
    }

    #[test]
    fn invariant_display() {
        let err = DomainError::InvariantViolation {
            aggregate: "ChildOrder".to_string(),
            invariant: "filled_qty <= qty".to_string(),
        };
        assert!(err.to_string().contains("filled_qty <= qty"));
    }
}
