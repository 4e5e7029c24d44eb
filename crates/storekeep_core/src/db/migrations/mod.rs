//! Per-collection schema migrations.
//!
//! # Responsibility
//! - Register collection migrations in strictly increasing order.
//! - Apply pending migrations for one collection atomically.
//! - Create a collection at its latest shape in one step (ensure-created).
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - The applied version of each collection is mirrored to
//!   `__schema_history`.
//! - SQL templates reference the table only through `{collection}`.
//! - Collection identity ignores ASCII case, like SQLite table names:
//!   `Students` and `students` share one table and one history row.

use crate::db::{CollectionName, DbError, DbResult};
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_collection.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("0002_updated_at.sql"),
    },
];

const ENSURE_CREATED_SQL: &str = include_str!("ensure_created.sql");

/// DDL for the history table; run on every connection bootstrap.
pub(crate) const SCHEMA_HISTORY_SQL: &str = include_str!("schema_history.sql");

/// Columns every provisioned collection table must have.
pub const REQUIRED_COLUMNS: &[&str] = &["id", "body", "updated_at"];

/// Returns the latest collection schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Returns the recorded schema version of a collection, if provisioned.
pub fn collection_version(conn: &Connection, collection: &CollectionName) -> DbResult<Option<u32>> {
    let version = conn
        .query_row(
            "SELECT version FROM __schema_history WHERE collection = ?1;",
            [collection.as_str()],
            |row| row.get::<_, u32>(0),
        )
        .optional()?;
    Ok(version)
}

/// Applies all pending migrations for `collection`.
///
/// Returns the number of migrations applied.
pub fn apply_migrations(conn: &mut Connection, collection: &CollectionName) -> DbResult<usize> {
    let current_version = collection_version(conn, collection)?.unwrap_or(0);
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            collection: collection.to_string(),
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    let mut applied = 0;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(&render(migration.sql, collection))?;
        record_version(&tx, collection, migration.version)?;
        applied += 1;
    }
    tx.commit()?;

    Ok(applied)
}

/// Creates `collection` at the latest shape when it does not exist yet.
///
/// Existing tables are left untouched, even when their recorded version is
/// behind. Returns whether the table was created.
pub fn ensure_created(conn: &mut Connection, collection: &CollectionName) -> DbResult<bool> {
    if table_exists(conn, collection.as_str())? {
        return Ok(false);
    }

    let tx = conn.transaction()?;
    tx.execute_batch(&render(ENSURE_CREATED_SQL, collection))?;
    record_version(&tx, collection, latest_version())?;
    tx.commit()?;

    Ok(true)
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1 COLLATE NOCASE
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn render(template: &str, collection: &CollectionName) -> String {
    template.replace("{collection}", &collection.quoted())
}

fn record_version(conn: &Connection, collection: &CollectionName, version: u32) -> DbResult<()> {
    conn.execute(
        "INSERT INTO __schema_history (collection, version)
         VALUES (?1, ?2)
         ON CONFLICT(collection) DO UPDATE SET
            version = excluded.version,
            applied_at = (strftime('%s', 'now') * 1000);",
        params![collection.as_str(), version],
    )?;
    Ok(())
}
