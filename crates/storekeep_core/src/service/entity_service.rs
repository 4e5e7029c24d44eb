//! Entity use-case service.
//!
//! # Responsibility
//! - Provide save/get/delete/list entry points for one entity type.
//! - Translate raw list inputs (sort string, name filter) into typed queries.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.
//! - A blank sorting string falls back to the entity's default sort field.

use crate::config::ConfigError;
use crate::model::{Entity, Sorting};
use crate::repo::{
    DeleteOutcome, EntityRepository, ListQuery, RepoError, RepoResult, UpsertOutcome,
};
use log::debug;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

const LIST_DEFAULT_MAX_RESULTS: usize = 10;
const LIST_MAX_RESULTS_LIMIT: usize = 1000;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for entity use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Another entity already uses this name.
    NameAlreadyExists { entity: &'static str, name: String },
    /// Persistence-layer or configuration failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameAlreadyExists { entity, name } => {
                write!(f, "{entity} named `{name}` already exists")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NameAlreadyExists { .. } => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ConfigError> for ServiceError {
    fn from(value: ConfigError) -> Self {
        Self::Repo(RepoError::Configuration(value))
    }
}

/// One page of a listing plus the filtered total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagedResult<T> {
    pub total_count: usize,
    pub items: Vec<T>,
}

/// Use-case service wrapper for one entity repository.
pub struct EntityService<T, R> {
    repo: R,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, R: EntityRepository<T>> EntityService<T, R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            _entity: PhantomData,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Inserts or fully replaces `entity` (find-then-write, not atomic).
    pub fn save(&self, entity: &T) -> RepoResult<UpsertOutcome> {
        self.repo.upsert(entity)
    }

    /// Inserts or fully replaces `entity` inside one write transaction.
    pub fn save_atomic(&self, entity: &T) -> RepoResult<UpsertOutcome> {
        self.repo.upsert_atomic(entity)
    }

    pub fn get(&self, id: &T::Id) -> RepoResult<Option<T>> {
        self.repo.find_by_id(id)
    }

    pub fn delete(&self, id: &T::Id) -> RepoResult<DeleteOutcome> {
        self.repo.delete_by_id(id)
    }

    /// Lists one page using raw UI inputs.
    ///
    /// # Contract
    /// - `filter` matches names by substring; blank or `None` disables it.
    /// - `sorting` accepts `"<field>"` or `"<field> asc|desc"`; blank sorts
    ///   by the default field.
    /// - `max_result_count = 0` uses 10; larger values clamp to 1000.
    /// - `total_count` counts all filtered entities, ignoring paging.
    pub fn get_list(
        &self,
        skip: usize,
        max_result_count: usize,
        sorting: &str,
        filter: Option<&str>,
    ) -> ServiceResult<PagedResult<T>> {
        let sorting = Sorting::<T>::parse(sorting)?;
        let take = normalize_max_results(max_result_count);
        let mut query = ListQuery::new().skip(skip).take(take).sorted(sorting);
        if let Some(needle) = filter {
            query = query.name_contains(needle);
        }

        let total_count = self.repo.count(&query)?;
        let items = self.repo.list_all(&query)?;
        debug!(
            "event=entity_list module=service status=ok entity={} sorting=\"{}\" skip={} take={} returned={} total={}",
            T::KIND,
            sorting,
            skip,
            take,
            items.len(),
            total_count
        );
        Ok(PagedResult { total_count, items })
    }

    /// Inserts `entity` unless a different entity already has its name.
    pub fn create_unique_by_name(&self, entity: &T) -> ServiceResult<UpsertOutcome> {
        if let Some(existing) = self.repo.find_by_name(entity.name())? {
            if existing.id() != entity.id() {
                return Err(ServiceError::NameAlreadyExists {
                    entity: T::KIND,
                    name: entity.name().to_string(),
                });
            }
        }
        Ok(self.repo.upsert(entity)?)
    }
}

fn normalize_max_results(max_result_count: usize) -> usize {
    match max_result_count {
        0 => LIST_DEFAULT_MAX_RESULTS,
        value => value.min(LIST_MAX_RESULTS_LIMIT),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_max_results;

    #[test]
    fn max_results_default_and_clamp() {
        assert_eq!(normalize_max_results(0), 10);
        assert_eq!(normalize_max_results(25), 25);
        assert_eq!(normalize_max_results(50_000), 1000);
    }
}
