//! Movie record.
//!
//! Title is the display name, so name filters and the default sort operate
//! on it.

use crate::model::entity::{check_text, Entity, ValidationError};
use crate::model::sort::SortField;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

const TITLE_MIN_CHARS: usize = 3;
const TITLE_MAX_CHARS: usize = 60;
const GENRE_MAX_CHARS: usize = 30;
const PRICE_MAX_CENTS: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub genre: String,
    /// Unix epoch milliseconds.
    pub release_date_ms: i64,
    pub price_cents: i64,
}

impl Movie {
    /// Creates a movie with a generated id.
    pub fn new(
        title: impl Into<String>,
        genre: impl Into<String>,
        release_date_ms: i64,
        price_cents: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            genre: genre.into(),
            release_date_ms,
            price_cents,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieSortField {
    Title,
    Genre,
    ReleaseDate,
    Price,
}

impl SortField<Movie> for MovieSortField {
    const DEFAULT: Self = Self::Title;

    fn from_normalized(name: &str) -> Option<Self> {
        match name {
            "title" | "name" => Some(Self::Title),
            "genre" => Some(Self::Genre),
            "releasedate" => Some(Self::ReleaseDate),
            "price" => Some(Self::Price),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Genre => "genre",
            Self::ReleaseDate => "release_date",
            Self::Price => "price",
        }
    }

    fn compare(self, left: &Movie, right: &Movie) -> Ordering {
        match self {
            Self::Title => left.title.cmp(&right.title),
            Self::Genre => left.genre.cmp(&right.genre),
            Self::ReleaseDate => left.release_date_ms.cmp(&right.release_date_ms),
            Self::Price => left.price_cents.cmp(&right.price_cents),
        }
    }
}

impl Entity for Movie {
    type Id = Uuid;
    type SortField = MovieSortField;

    const KIND: &'static str = "movie";
    const DEFAULT_COLLECTION: &'static str = "Movies";

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn name(&self) -> &str {
        &self.title
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_text(
            Self::KIND,
            "title",
            &self.title,
            TITLE_MIN_CHARS,
            TITLE_MAX_CHARS,
        )?;
        check_text(Self::KIND, "genre", &self.genre, 1, GENRE_MAX_CHARS)?;
        if !(0..=PRICE_MAX_CENTS).contains(&self.price_cents) {
            return Err(ValidationError::OutOfRange {
                entity: Self::KIND,
                field: "price_cents",
                value: self.price_cents,
            });
        }
        Ok(())
    }
}
