//! Student record with a caller-assigned string identifier.

use crate::model::entity::{check_text, Entity, ValidationError};
use crate::model::sort::SortField;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const NAME_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Document key, assigned by the caller (e.g. an ObjectId hex string).
    pub id: String,
    pub name: String,
    pub email: String,
    pub age: u32,
}

impl Student {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        age: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            age,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentSortField {
    Id,
    Name,
    Email,
    Age,
}

impl SortField<Student> for StudentSortField {
    const DEFAULT: Self = Self::Name;

    fn from_normalized(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "age" => Some(Self::Age),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
            Self::Age => "age",
        }
    }

    fn compare(self, left: &Student, right: &Student) -> Ordering {
        match self {
            Self::Id => left.id.cmp(&right.id),
            Self::Name => left.name.cmp(&right.name),
            Self::Email => left.email.cmp(&right.email),
            Self::Age => left.age.cmp(&right.age),
        }
    }
}

impl Entity for Student {
    type Id = String;
    type SortField = StudentSortField;

    const KIND: &'static str = "student";
    const DEFAULT_COLLECTION: &'static str = "Students";

    fn id(&self) -> &String {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                entity: Self::KIND,
                field: "id",
            });
        }
        check_text(Self::KIND, "name", &self.name, 1, NAME_MAX_CHARS)?;
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(ValidationError::InvalidFormat {
                entity: Self::KIND,
                field: "email",
                reason: "missing `@`",
            });
        }
        Ok(())
    }
}
