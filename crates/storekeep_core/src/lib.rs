//! Core data-access layer for storekeep.
//! Maps Student, Movie, Book and Author records onto SQLite-backed document
//! collections behind a narrow repository interface.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use bootstrap::open_collection_store;
pub use config::{
    ConfigError, ConnectionConfig, ConnectionResolver, DatabaseProvider, JsonSettings,
    MissingConnectionPolicy, ProcessEnv, ResolverDefaults, SettingsSource,
};
pub use db::{DbError, ProvisioningStrategy, RetryPolicy};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::{
    Author, AuthorSortField, Book, BookSortField, BookType, Entity, Movie, MovieSortField,
    SortDirection, Sorting, Student, StudentSortField, ValidationError,
};
pub use repo::{
    DeleteOutcome, EntityFilter, EntityRepository, ListQuery, RepoError, RepoResult,
    SqliteEntityRepository, UpsertOutcome,
};
pub use service::{EntityService, PagedResult, ServiceError, ServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
