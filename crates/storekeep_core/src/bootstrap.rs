//! Startup wiring: resolved configuration to a provisioned store connection.
//!
//! # Responsibility
//! - Turn a `ConnectionConfig` into an open, provisioned SQLite connection.
//! - Retry store opening and provisioning with fixed backoff.
//!
//! # Invariants
//! - Configuration errors fail immediately; only store work is retried.
//! - The returned connection has the configured collection provisioned.

use crate::config::ConnectionConfig;
use crate::db::{
    open_store, provision_collection, retry_with_policy, DbError, ProvisioningStrategy,
    RetryPolicy, StoreLocation,
};
use crate::repo::entity_repo::parse_collection_name;
use crate::repo::RepoResult;
use log::info;
use rusqlite::Connection;

/// Opens the store named by `config` and provisions its collection.
///
/// # Errors
/// - `RepoError::Configuration` when the connection string cannot be mapped
///   to a store location or the collection name is invalid.
/// - `RepoError::StoreUnavailable` when every attempt failed.
pub fn open_collection_store(
    config: &ConnectionConfig,
    strategy: ProvisioningStrategy,
    retry: RetryPolicy,
) -> RepoResult<Connection> {
    let location = StoreLocation::from_config(config)?;
    let collection = parse_collection_name(config)?;

    info!(
        "event=store_bootstrap module=bootstrap status=start connection={} database={} collection={}",
        config.masked_connection_string(),
        config.database_name(),
        collection
    );

    let conn = retry_with_policy(retry, |_attempt| {
        let mut conn = open_store(&location)?;
        provision_collection(&mut conn, &collection, strategy)?;
        Ok::<_, DbError>(conn)
    })?;

    info!(
        "event=store_bootstrap module=bootstrap status=ok collection={}",
        collection
    );
    Ok(conn)
}
