//! Startup seed data.

use crate::model::{Entity, Movie};
use crate::repo::{EntityRepository, ListQuery, RepoResult};
use log::info;
use uuid::Uuid;

/// Inserts `items` only when the collection is empty.
///
/// Returns the number of inserted entities (zero when data already existed).
pub fn seed_if_empty<T, R>(repo: &R, items: &[T]) -> RepoResult<usize>
where
    T: Entity,
    R: EntityRepository<T>,
{
    if repo.count(&ListQuery::new())? > 0 {
        info!(
            "event=seed module=service status=skipped entity={} reason=not_empty",
            T::KIND
        );
        return Ok(0);
    }

    for item in items {
        repo.upsert(item)?;
    }
    info!(
        "event=seed module=service status=ok entity={} inserted={}",
        T::KIND,
        items.len()
    );
    Ok(items.len())
}

/// Fixed movie catalogue used to seed empty stores.
pub fn default_movies() -> Vec<Movie> {
    vec![
        seed_movie(1, "When Harry Met Sally", "Romantic Comedy", 603_244_800_000, 799),
        seed_movie(2, "Ghostbusters", "Comedy", 447_984_000_000, 899),
        seed_movie(3, "Ghostbusters 2", "Comedy", 509_500_800_000, 999),
        seed_movie(4, "Rio Bravo", "Western", -338_169_600_000, 399),
    ]
}

fn seed_movie(
    n: u128,
    title: &str,
    genre: &str,
    release_date_ms: i64,
    price_cents: i64,
) -> Movie {
    Movie {
        id: Uuid::from_u128(0x5eed_0000_0000_4000_8000_0000_0000_0000 | n),
        title: title.to_string(),
        genre: genre.to_string(),
        release_date_ms,
        price_cents,
    }
}

#[cfg(test)]
mod tests {
    use super::default_movies;
    use crate::model::Entity;
    use std::collections::HashSet;

    #[test]
    fn default_movies_are_valid_and_distinct() {
        let movies = default_movies();
        let ids: HashSet<_> = movies.iter().map(|movie| movie.id).collect();
        assert_eq!(ids.len(), movies.len());
        for movie in &movies {
            movie.validate().unwrap();
        }
    }
}
