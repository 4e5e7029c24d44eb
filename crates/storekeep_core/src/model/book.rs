//! Book record.

use crate::model::entity::{check_text, Entity, ValidationError};
use crate::model::sort::SortField;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

const NAME_MAX_CHARS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookType {
    Undefined,
    Adventure,
    Biography,
    Dystopia,
    Fantastic,
    Horror,
    Science,
    ScienceFiction,
    Poetry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BookType,
    /// Unix epoch milliseconds.
    pub publish_date_ms: i64,
    pub price_cents: i64,
    pub author_id: Option<Uuid>,
}

impl Book {
    /// Creates a book with a generated id and no author link.
    pub fn new(
        name: impl Into<String>,
        kind: BookType,
        publish_date_ms: i64,
        price_cents: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            publish_date_ms,
            price_cents,
            author_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSortField {
    Name,
    Type,
    PublishDate,
    Price,
}

impl SortField<Book> for BookSortField {
    const DEFAULT: Self = Self::Name;

    fn from_normalized(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "type" | "kind" => Some(Self::Type),
            "publishdate" => Some(Self::PublishDate),
            "price" => Some(Self::Price),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Type => "type",
            Self::PublishDate => "publish_date",
            Self::Price => "price",
        }
    }

    fn compare(self, left: &Book, right: &Book) -> Ordering {
        match self {
            Self::Name => left.name.cmp(&right.name),
            Self::Type => left.kind.cmp(&right.kind),
            Self::PublishDate => left.publish_date_ms.cmp(&right.publish_date_ms),
            Self::Price => left.price_cents.cmp(&right.price_cents),
        }
    }
}

impl Entity for Book {
    type Id = Uuid;
    type SortField = BookSortField;

    const KIND: &'static str = "book";
    const DEFAULT_COLLECTION: &'static str = "Books";

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_text(Self::KIND, "name", &self.name, 1, NAME_MAX_CHARS)?;
        if self.price_cents < 0 {
            return Err(ValidationError::OutOfRange {
                entity: Self::KIND,
                field: "price_cents",
                value: self.price_cents,
            });
        }
        Ok(())
    }
}
