//! Entity models persisted by storekeep repositories.
//!
//! # Responsibility
//! - Define the record types stored one-document-per-row in collections.
//! - Describe what the generic repository needs from a record (`Entity`).
//!
//! # Invariants
//! - Every entity carries a stable identifier that is never regenerated on
//!   update.
//! - Sortable fields form a closed set per entity type.

pub mod author;
pub mod book;
pub mod entity;
pub mod movie;
pub mod sort;
pub mod student;

pub use author::{Author, AuthorSortField};
pub use book::{Book, BookSortField, BookType};
pub use entity::{Entity, ValidationError};
pub use movie::{Movie, MovieSortField};
pub use sort::{SortDirection, SortField, Sorting};
pub use student::{Student, StudentSortField};
