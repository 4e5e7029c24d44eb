use crate::config::ConfigResult;
use crate::model::{Entity, Sorting};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Row filter applied before sorting and paging.
pub enum EntityFilter<T> {
    /// Case-sensitive substring match on `Entity::name()`.
    NameContains(String),
    Predicate(Arc<dyn Fn(&T) -> bool + Send + Sync>),
}

impl<T: Entity> EntityFilter<T> {
    pub fn matches(&self, entity: &T) -> bool {
        match self {
            Self::NameContains(needle) => entity.name().contains(needle.as_str()),
            Self::Predicate(predicate) => (**predicate)(entity),
        }
    }
}

impl<T> Clone for EntityFilter<T> {
    fn clone(&self) -> Self {
        match self {
            Self::NameContains(needle) => Self::NameContains(needle.clone()),
            Self::Predicate(predicate) => Self::Predicate(Arc::clone(predicate)),
        }
    }
}

impl<T> Debug for EntityFilter<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameContains(needle) => f.debug_tuple("NameContains").field(needle).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Listing options: filter, then sort, then skip/take.
///
/// `sorting = None` sorts by the entity's default field, ascending.
/// `take = None` returns everything after `skip`.
pub struct ListQuery<T: Entity> {
    pub skip: usize,
    pub take: Option<usize>,
    pub filter: Option<EntityFilter<T>>,
    pub sorting: Option<Sorting<T>>,
}

impl<T: Entity> Default for ListQuery<T> {
    fn default() -> Self {
        Self {
            skip: 0,
            take: None,
            filter: None,
            sorting: None,
        }
    }
}

impl<T: Entity> Clone for ListQuery<T> {
    fn clone(&self) -> Self {
        Self {
            skip: self.skip,
            take: self.take,
            filter: self.filter.clone(),
            sorting: self.sorting,
        }
    }
}

impl<T: Entity> Debug for ListQuery<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListQuery")
            .field("skip", &self.skip)
            .field("take", &self.take)
            .field("filter", &self.filter)
            .field("sorting", &self.sorting)
            .finish()
    }
}

impl<T: Entity> ListQuery<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }

    /// Filters by name substring. A blank needle clears the filter.
    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        self.filter = if needle.trim().is_empty() {
            None
        } else {
            Some(EntityFilter::NameContains(needle))
        };
        self
    }

    pub fn filter_by(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(EntityFilter::Predicate(Arc::new(predicate)));
        self
    }

    pub fn sorted(mut self, sorting: Sorting<T>) -> Self {
        self.sorting = Some(sorting);
        self
    }

    /// Parses and applies a sort string such as `"name desc"`.
    pub fn sorted_by(self, sorting: &str) -> ConfigResult<Self> {
        Ok(self.sorted(Sorting::parse(sorting)?))
    }

    /// Applies filter, sort and paging to already-loaded entities.
    pub(crate) fn apply(&self, mut items: Vec<T>) -> Vec<T> {
        if let Some(filter) = &self.filter {
            items.retain(|item| filter.matches(item));
        }

        let sorting = self.sorting.unwrap_or_default();
        items.sort_by(|left, right| sorting.compare(left, right));

        items
            .into_iter()
            .skip(self.skip)
            .take(self.take.unwrap_or(usize::MAX))
            .collect()
    }

    /// Number of entities passing the filter.
    pub(crate) fn count_matching(&self, items: &[T]) -> usize {
        match &self.filter {
            Some(filter) => items.iter().filter(|item| filter.matches(item)).count(),
            None => items.len(),
        }
    }
}
