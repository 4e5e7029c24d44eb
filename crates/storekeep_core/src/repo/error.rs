use crate::config::ConfigError;
use crate::db::DbError;
use crate::model::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for repository construction, persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    /// Connectivity or driver failure, propagated to the caller untouched.
    StoreUnavailable(DbError),
    Configuration(ConfigError),
    /// A find-then-write upsert lost a race against another writer.
    Conflict {
        collection: String,
        id: String,
    },
    InvalidData(String),
    MissingRequiredTable(String),
    MissingRequiredColumn {
        table: String,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::StoreUnavailable(err) => write!(f, "store unavailable: {err}"),
            Self::Configuration(err) => write!(f, "{err}"),
            Self::Conflict { collection, id } => write!(
                f,
                "concurrent write conflict on `{collection}` for id `{id}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted document: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "collection table `{table}` does not exist")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "collection table `{table}` is missing column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StoreUnavailable(err) => Some(err),
            Self::Configuration(err) => Some(err),
            Self::Conflict { .. }
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::StoreUnavailable(value)
    }
}

impl From<ConfigError> for RepoError {
    fn from(value: ConfigError) -> Self {
        Self::Configuration(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StoreUnavailable(DbError::Sqlite(value))
    }
}
