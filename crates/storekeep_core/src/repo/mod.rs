//! Repository layer over collection tables.
//!
//! # Responsibility
//! - Define the entity repository contract (find, list, upsert, delete).
//! - Isolate SQLite and JSON document details from services and callers.
//!
//! # Invariants
//! - Repository writes must enforce `Entity::validate()` before persistence.
//! - Absence is a normal result on read and delete paths, never an error.
//! - Store failures propagate unchanged; repositories never retry.

pub mod entity_repo;
mod error;
mod query;

pub use entity_repo::{
    CollectionHandle, DeleteOutcome, EntityRepository, SqliteEntityRepository, UpsertOutcome,
};
pub use error::{RepoError, RepoResult};
pub use query::{EntityFilter, ListQuery};
