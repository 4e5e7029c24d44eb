//! Typed sorting for entity listings.
//!
//! # Responsibility
//! - Resolve sort strings such as `"name"` or `"ReleaseDate desc"` into a
//!   closed per-entity field enumeration.
//! - Compare entities by the resolved field and direction.
//!
//! # Invariants
//! - Unknown field names are rejected with `ConfigError::UnknownSortField`;
//!   there is no dynamic field lookup.
//! - Field names match case-insensitively and ignore `_`.

use crate::config::ConfigError;
use crate::model::entity::Entity;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

/// Sortable field of entity `T`.
pub trait SortField<T>: Copy + Debug + PartialEq + 'static {
    /// Field used when the caller gives no sorting.
    const DEFAULT: Self;

    /// Resolves a normalized name (lowercase, no `_`).
    fn from_normalized(name: &str) -> Option<Self>;

    /// Canonical field name.
    fn as_str(self) -> &'static str;

    /// Ascending comparison of two entities on this field.
    fn compare(self, left: &T, right: &T) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// Resolved sort field plus direction.
pub struct Sorting<T: Entity> {
    pub field: T::SortField,
    pub direction: SortDirection,
}

// Manual impls: derives would demand the same traits from `T` itself.
impl<T: Entity> Clone for Sorting<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Entity> Copy for Sorting<T> {}

impl<T: Entity> PartialEq for Sorting<T> {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.direction == other.direction
    }
}

impl<T: Entity> Debug for Sorting<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sorting")
            .field("field", &self.field)
            .field("direction", &self.direction)
            .finish()
    }
}

/// Canonical `"<field> asc|desc"` form; `Sorting::parse` accepts it back.
impl<T: Entity> Display for Sorting<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field.as_str(), self.direction.as_str())
    }
}

impl<T: Entity> Default for Sorting<T> {
    fn default() -> Self {
        Self::ascending(<T::SortField as SortField<T>>::DEFAULT)
    }
}

impl<T: Entity> Sorting<T> {
    pub fn ascending(field: T::SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: T::SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }

    /// Parses `"<field>"` or `"<field> asc|desc"`.
    ///
    /// A blank input yields the entity's default sorting.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let unknown = || ConfigError::UnknownSortField {
            entity: T::KIND,
            field: input.trim().to_string(),
        };

        let mut tokens = input.split_whitespace();
        let Some(field_token) = tokens.next() else {
            return Ok(Self::default());
        };

        let field = T::SortField::from_normalized(&normalize_field_name(field_token))
            .ok_or_else(unknown)?;

        let direction = match tokens.next() {
            None => SortDirection::Ascending,
            Some(token) => match token.to_ascii_lowercase().as_str() {
                "asc" | "ascending" => SortDirection::Ascending,
                "desc" | "descending" => SortDirection::Descending,
                _ => return Err(unknown()),
            },
        };

        if tokens.next().is_some() {
            return Err(unknown());
        }

        Ok(Self { field, direction })
    }

    pub fn compare(&self, left: &T, right: &T) -> Ordering {
        let ordering = self.field.compare(left, right);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn normalize_field_name(name: &str) -> String {
    name.chars()
        .filter(|ch| *ch != '_')
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}
