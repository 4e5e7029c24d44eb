//! Entity repository contract and SQLite document implementation.
//!
//! # Responsibility
//! - Provide find/list/upsert/delete over one collection table per entity
//!   type, storing each entity as a JSON document keyed by its id.
//! - Keep SQL and serialization details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Entity::validate()` before SQL mutations.
//! - Read paths reject documents that fail validation or whose body id does
//!   not match the row key.
//! - `upsert` is find-then-write and NOT atomic: two concurrent upserts of a
//!   new id can both observe "absent"; the loser gets `RepoError::Conflict`
//!   and the primary key keeps the collection at one record.
//! - `upsert_atomic` runs the same steps inside one `BEGIN IMMEDIATE`
//!   transaction, so concurrent writers serialize and the last one wins.

use crate::config::{ConfigError, ConnectionConfig};
use crate::db::migrations::{table_exists, REQUIRED_COLUMNS};
use crate::db::CollectionName;
use crate::model::Entity;
use crate::repo::{ListQuery, RepoError, RepoResult};
use log::warn;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction, TransactionBehavior};
use std::marker::PhantomData;

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// Result of a delete. Deleting a missing id still succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub removed: bool,
}

/// Repository interface for one entity type.
pub trait EntityRepository<T: Entity> {
    /// Returns the entity with `id`, or `None` when absent.
    fn find_by_id(&self, id: &T::Id) -> RepoResult<Option<T>>;
    /// Returns the first entity (in id order) whose name equals `name`.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<T>>;
    /// Filters, sorts, then pages. Re-reads the collection on every call.
    fn list_all(&self, query: &ListQuery<T>) -> RepoResult<Vec<T>>;
    /// Counts entities passing the query filter; sorting and paging are ignored.
    fn count(&self, query: &ListQuery<T>) -> RepoResult<usize>;
    /// Inserts when absent, otherwise replaces the whole document.
    fn upsert(&self, entity: &T) -> RepoResult<UpsertOutcome>;
    /// Same contract as `upsert`, serialized against concurrent writers.
    fn upsert_atomic(&self, entity: &T) -> RepoResult<UpsertOutcome>;
    /// Deletes at most one entity.
    fn delete_by_id(&self, id: &T::Id) -> RepoResult<DeleteOutcome>;
}

/// Borrowed connection bound to one provisioned collection table.
#[derive(Debug)]
pub struct CollectionHandle<'conn> {
    conn: &'conn Connection,
    collection: CollectionName,
}

impl<'conn> CollectionHandle<'conn> {
    /// Binds `conn` to the collection named by `config`.
    ///
    /// # Errors
    /// - `Configuration` for collection names that are not plain identifiers.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the collection
    ///   was not provisioned.
    pub fn open(conn: &'conn Connection, config: &ConnectionConfig) -> RepoResult<Self> {
        let collection = parse_collection_name(config)?;
        ensure_collection_ready(conn, &collection)?;
        Ok(Self { conn, collection })
    }

    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }
}

/// SQLite-backed document repository for entity `T`.
pub struct SqliteEntityRepository<'conn, T> {
    handle: CollectionHandle<'conn>,
    _entity: PhantomData<fn() -> T>,
}

impl<'conn, T: Entity> SqliteEntityRepository<'conn, T> {
    /// Constructs a repository from a bootstrapped connection and a resolved
    /// configuration whose collection has been provisioned.
    pub fn try_new(conn: &'conn Connection, config: &ConnectionConfig) -> RepoResult<Self> {
        Ok(Self::from_handle(CollectionHandle::open(conn, config)?))
    }

    pub fn from_handle(handle: CollectionHandle<'conn>) -> Self {
        Self {
            handle,
            _entity: PhantomData,
        }
    }

    pub fn handle(&self) -> &CollectionHandle<'conn> {
        &self.handle
    }

    fn load_all(&self) -> RepoResult<Vec<T>> {
        let mut stmt = self.handle.conn.prepare(&format!(
            "SELECT id, body FROM {} ORDER BY id ASC;",
            self.handle.collection.quoted()
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            let key: String = row.get("id")?;
            let body: String = row.get("body")?;
            items.push(self.parse_document(&key, &body)?);
        }

        Ok(items)
    }

    fn parse_document(&self, key: &str, body: &str) -> RepoResult<T> {
        let collection = &self.handle.collection;
        let entity: T = serde_json::from_str(body).map_err(|err| {
            RepoError::InvalidData(format!(
                "malformed {} document `{key}` in {collection}: {err}",
                T::KIND
            ))
        })?;

        let body_id = entity.id().to_string();
        if body_id != key {
            return Err(RepoError::InvalidData(format!(
                "document id `{body_id}` does not match row key `{key}` in {collection}"
            )));
        }

        entity.validate()?;
        Ok(entity)
    }

    fn write(&self, conn: &Connection, entity: &T) -> RepoResult<UpsertOutcome> {
        entity.validate()?;
        let key = entity.id().to_string();
        let body = serde_json::to_string(entity).map_err(|err| {
            RepoError::InvalidData(format!(
                "cannot serialize {} `{key}`: {err}",
                T::KIND
            ))
        })?;
        let table = self.handle.collection.quoted();

        let exists = conn
            .query_row(
                &format!("SELECT 1 FROM {table} WHERE id = ?1;"),
                [key.as_str()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        if exists {
            let changed = conn.execute(
                &format!(
                    "UPDATE {table}
                     SET
                        body = ?2,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?1;"
                ),
                params![key, body],
            )?;
            if changed == 0 {
                // Deleted between the lookup and the replace.
                return Err(self.conflict(key));
            }
            return Ok(UpsertOutcome::Replaced);
        }

        let inserted = conn.execute(
            &format!(
                "INSERT INTO {table} (id, body, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000));"
            ),
            params![key, body],
        );
        match inserted {
            Ok(_) => Ok(UpsertOutcome::Inserted),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(self.conflict(key))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn conflict(&self, key: String) -> RepoError {
        warn!(
            "event=upsert_conflict module=repo status=error entity={} collection={} id={}",
            T::KIND,
            self.handle.collection,
            key
        );
        RepoError::Conflict {
            collection: self.handle.collection.to_string(),
            id: key,
        }
    }
}

impl<T: Entity> EntityRepository<T> for SqliteEntityRepository<'_, T> {
    fn find_by_id(&self, id: &T::Id) -> RepoResult<Option<T>> {
        let key = id.to_string();
        let body = self
            .handle
            .conn
            .query_row(
                &format!(
                    "SELECT body FROM {} WHERE id = ?1;",
                    self.handle.collection.quoted()
                ),
                [key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        body.map(|body| self.parse_document(&key, &body))
            .transpose()
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<T>> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|entity| entity.name() == name))
    }

    fn list_all(&self, query: &ListQuery<T>) -> RepoResult<Vec<T>> {
        Ok(query.apply(self.load_all()?))
    }

    fn count(&self, query: &ListQuery<T>) -> RepoResult<usize> {
        Ok(query.count_matching(&self.load_all()?))
    }

    fn upsert(&self, entity: &T) -> RepoResult<UpsertOutcome> {
        self.write(self.handle.conn, entity)
    }

    fn upsert_atomic(&self, entity: &T) -> RepoResult<UpsertOutcome> {
        let tx = Transaction::new_unchecked(self.handle.conn, TransactionBehavior::Immediate)?;
        let outcome = self.write(&tx, entity)?;
        tx.commit()?;
        Ok(outcome)
    }

    fn delete_by_id(&self, id: &T::Id) -> RepoResult<DeleteOutcome> {
        let changed = self.handle.conn.execute(
            &format!(
                "DELETE FROM {} WHERE id = ?1;",
                self.handle.collection.quoted()
            ),
            [id.to_string()],
        )?;

        Ok(DeleteOutcome {
            removed: changed > 0,
        })
    }
}

/// Validates the configured collection name; a bad name is a configuration
/// error, not a store failure.
pub(crate) fn parse_collection_name(config: &ConnectionConfig) -> RepoResult<CollectionName> {
    CollectionName::parse(config.collection_name())
        .map_err(|err| RepoError::Configuration(ConfigError::InvalidSettings(err.to_string())))
}

fn ensure_collection_ready(conn: &Connection, collection: &CollectionName) -> RepoResult<()> {
    if !table_exists(conn, collection.as_str())? {
        return Err(RepoError::MissingRequiredTable(collection.to_string()));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", collection.quoted()))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;

    for &required in REQUIRED_COLUMNS {
        if !columns.iter().any(|column| column == required) {
            return Err(RepoError::MissingRequiredColumn {
                table: collection.to_string(),
                column: required,
            });
        }
    }

    Ok(())
}
