//! SQLite store bootstrap and collection schema provisioning.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections described by a resolved
//!   `ConnectionConfig`.
//! - Provision collection tables by migration or ensure-created.
//!
//! # Invariants
//! - Collection schema versions are tracked per collection in
//!   `__schema_history`.
//! - Collection names are validated before they reach any SQL text.
//! - Repositories must not touch a collection before it was provisioned.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod collection;
pub mod migrations;
mod open;
mod provision;

pub use collection::CollectionName;
pub use open::{open_db, open_db_in_memory, open_store, StoreLocation};
pub use provision::{provision_collection, retry_with_policy, ProvisioningStrategy, RetryPolicy};

pub type DbResult<T> = Result<T, DbError>;

/// Store-level failure. Surfaces to callers as "store unavailable".
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
    UnsupportedSchemaVersion {
        collection: String,
        db_version: u32,
        latest_supported: u32,
    },
    InvalidCollectionName(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                collection,
                db_version,
                latest_supported,
            } => write!(
                f,
                "collection `{collection}` schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidCollectionName(name) => write!(
                f,
                "invalid collection name `{name}`; expected [A-Za-z_][A-Za-z0-9_]*"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::InvalidCollectionName(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
