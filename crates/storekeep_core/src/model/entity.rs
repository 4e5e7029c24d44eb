//! Entity contract shared by every persisted record type.
//!
//! # Responsibility
//! - Expose identity, display name and default collection of a record.
//! - Provide a validation hook that repositories call before writes and
//!   after reads.
//!
//! # Invariants
//! - `id()` is the match key for upsert and delete.
//! - `name()` is the value name filters match against.

use crate::model::sort::SortField;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Record type stored as one JSON document per row.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned {
    /// Identifier type. Its `Display` form is the row key.
    type Id: Clone + Eq + Debug + Display;
    /// Closed set of fields `list_all` can sort by.
    type SortField: SortField<Self>;

    /// Lowercase kind label used in logs and error messages.
    const KIND: &'static str;
    /// Collection used when configuration names none.
    const DEFAULT_COLLECTION: &'static str;

    fn id(&self) -> &Self::Id;

    /// Display name; for movies this is the title.
    fn name(&self) -> &str;

    fn validate(&self) -> Result<(), ValidationError>;
}

/// Field-level validation failure for an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    FieldTooShort {
        entity: &'static str,
        field: &'static str,
        min_chars: usize,
    },
    FieldTooLong {
        entity: &'static str,
        field: &'static str,
        max_chars: usize,
    },
    OutOfRange {
        entity: &'static str,
        field: &'static str,
        value: i64,
    },
    InvalidFormat {
        entity: &'static str,
        field: &'static str,
        reason: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => {
                write!(f, "{entity}.{field} must not be empty")
            }
            Self::FieldTooShort {
                entity,
                field,
                min_chars,
            } => write!(f, "{entity}.{field} must be at least {min_chars} characters"),
            Self::FieldTooLong {
                entity,
                field,
                max_chars,
            } => write!(f, "{entity}.{field} must be at most {max_chars} characters"),
            Self::OutOfRange {
                entity,
                field,
                value,
            } => write!(f, "{entity}.{field} value {value} is out of range"),
            Self::InvalidFormat {
                entity,
                field,
                reason,
            } => write!(f, "{entity}.{field} is invalid: {reason}"),
        }
    }
}

impl Error for ValidationError {}

/// Checks a required text field against trimmed length bounds.
pub(crate) fn check_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
    min_chars: usize,
    max_chars: usize,
) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    let len = trimmed.chars().count();
    if len < min_chars {
        return Err(ValidationError::FieldTooShort {
            entity,
            field,
            min_chars,
        });
    }
    if len > max_chars {
        return Err(ValidationError::FieldTooLong {
            entity,
            field,
            max_chars,
        });
    }
    Ok(())
}
