//! Author record.

use crate::model::entity::{check_text, Entity, ValidationError};
use crate::model::sort::SortField;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

pub const AUTHOR_NAME_MAX_CHARS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    /// Unix epoch milliseconds.
    pub birth_date_ms: i64,
    pub short_bio: Option<String>,
}

impl Author {
    /// Creates an author with a generated id.
    pub fn new(name: impl Into<String>, birth_date_ms: i64) -> Self {
        Self::with_id(Uuid::new_v4(), name, birth_date_ms)
    }

    /// Creates an author with a caller-provided id.
    pub fn with_id(id: Uuid, name: impl Into<String>, birth_date_ms: i64) -> Self {
        Self {
            id,
            name: name.into(),
            birth_date_ms,
            short_bio: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorSortField {
    Name,
    BirthDate,
}

impl SortField<Author> for AuthorSortField {
    const DEFAULT: Self = Self::Name;

    fn from_normalized(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "birthdate" => Some(Self::BirthDate),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::BirthDate => "birth_date",
        }
    }

    fn compare(self, left: &Author, right: &Author) -> Ordering {
        match self {
            Self::Name => left.name.cmp(&right.name),
            Self::BirthDate => left.birth_date_ms.cmp(&right.birth_date_ms),
        }
    }
}

impl Entity for Author {
    type Id = Uuid;
    type SortField = AuthorSortField;

    const KIND: &'static str = "author";
    const DEFAULT_COLLECTION: &'static str = "Authors";

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_text(Self::KIND, "name", &self.name, 1, AUTHOR_NAME_MAX_CHARS)
    }
}
