use rusqlite::Connection;
use std::collections::HashSet;
use storekeep_core::db::{open_db_in_memory, provision_collection, CollectionName, ProvisioningStrategy};
use storekeep_core::{
    Author, AuthorSortField, Book, BookSortField, BookType, ConnectionConfig, Entity,
    EntityRepository, ListQuery, Movie, RepoError, Sorting, SqliteEntityRepository, Student,
    UpsertOutcome,
};
use uuid::Uuid;

fn provisioned<T: Entity>(conn: &mut Connection) -> ConnectionConfig {
    let config = ConnectionConfig::new("sqlite::memory:", "SchoolDB", T::DEFAULT_COLLECTION);
    let collection = CollectionName::parse(config.collection_name()).unwrap();
    provision_collection(conn, &collection, ProvisioningStrategy::Migrate).unwrap();
    config
}

#[test]
fn upsert_then_find_returns_equal_value() {
    let mut conn = open_db_in_memory().unwrap();
    let config = provisioned::<Student>(&mut conn);
    let repo = SqliteEntityRepository::<Student>::try_new(&conn, &config).unwrap();

    let student = Student::new("64b7f0c2a1", "Ada Lovelace", "ada@example.com", 19);
    assert_eq!(repo.upsert(&student).unwrap(), UpsertOutcome::Inserted);

    let loaded = repo.find_by_id(&student.id).unwrap().unwrap();
    assert_eq!(loaded, student);
}

#[test]
fn upsert_replaces_whole_document() {
    let mut conn = open_db_in_memory().unwrap();
    let config = provisioned::<Author>(&mut conn);
    let repo = SqliteEntityRepository::<Author>::try_new(&conn, &config).unwrap();

    let mut author = Author::new("George Orwell", -2_108_592_000_000);
    author.short_bio = Some("English novelist".to_string());
    repo.upsert(&author).unwrap();

    let replacement = Author::with_id(author.id, "Eric Blair", 0);
    assert_eq!(repo.upsert(&replacement).unwrap(), UpsertOutcome::Replaced);

    let loaded = repo.find_by_id(&author.id).unwrap().unwrap();
    assert_eq!(loaded, replacement);
    assert_eq!(loaded.short_bio, None);
}

#[test]
fn upsert_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    let config = provisioned::<Movie>(&mut conn);
    let repo = SqliteEntityRepository::<Movie>::try_new(&conn, &config).unwrap();

    let movie = Movie::new("Rio Bravo", "Western", -338_169_600_000, 399);
    repo.upsert(&movie).unwrap();
    let once = repo.list_all(&ListQuery::new()).unwrap();

    assert_eq!(repo.upsert(&movie).unwrap(), UpsertOutcome::Replaced);
    let twice = repo.list_all(&ListQuery::new()).unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice, vec![movie]);
}

#[test]
fn missing_id_finds_none_and_deletes_without_error() {
    let mut conn = open_db_in_memory().unwrap();
    let config = provisioned::<Book>(&mut conn);
    let repo = SqliteEntityRepository::<Book>::try_new(&conn, &config).unwrap();

    let missing = Uuid::new_v4();
    assert!(repo.find_by_id(&missing).unwrap().is_none());

    let outcome = repo.delete_by_id(&missing).unwrap();
    assert!(!outcome.removed);
}

#[test]
fn delete_removes_at_most_one_and_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    let config = provisioned::<Book>(&mut conn);
    let repo = SqliteEntityRepository::<Book>::try_new(&conn, &config).unwrap();

    let keep = Book::new("1984", BookType::Dystopia, -649_036_800_000, 1_999);
    let remove = Book::new("Brave New World", BookType::Dystopia, -1_190_073_600_000, 1_599);
    repo.upsert(&keep).unwrap();
    repo.upsert(&remove).unwrap();

    assert!(repo.delete_by_id(&remove.id).unwrap().removed);
    assert!(!repo.delete_by_id(&remove.id).unwrap().removed);

    let remaining = repo.list_all(&ListQuery::new()).unwrap();
    assert_eq!(remaining, vec![keep]);
}

#[test]
fn name_filter_applies_before_sort_regardless_of_sort_key() {
    let mut conn = open_db_in_memory().unwrap();
    let config = provisioned::<Author>(&mut conn);
    let repo = SqliteEntityRepository::<Author>::try_new(&conn, &config).unwrap();

    repo.upsert(&Author::new("Alice", 300)).unwrap();
    repo.upsert(&Author::new("Bob", 100)).unwrap();
    repo.upsert(&Author::new("Al", 200)).unwrap();

    for sorting in [
        Sorting::ascending(AuthorSortField::Name),
        Sorting::descending(AuthorSortField::Name),
        Sorting::ascending(AuthorSortField::BirthDate),
    ] {
        let query = ListQuery::new().name_contains("Al").sorted(sorting);
        let names: HashSet<String> = repo
            .list_all(&query)
            .unwrap()
            .into_iter()
            .map(|author| author.name)
            .collect();
        assert_eq!(
            names,
            HashSet::from(["Alice".to_string(), "Al".to_string()])
        );
    }
}

#[test]
fn list_sorts_then_pages() {
    let mut conn = open_db_in_memory().unwrap();
    let config = provisioned::<Book>(&mut conn);
    let repo = SqliteEntityRepository::<Book>::try_new(&conn, &config).unwrap();

    for (name, price) in [("Dune", 1_200), ("Emma", 800), ("Ulysses", 2_500), ("Beloved", 1_000)] {
        repo.upsert(&Book::new(name, BookType::Undefined, 0, price))
            .unwrap();
    }

    let query = ListQuery::new()
        .sorted(Sorting::descending(BookSortField::Price))
        .skip(1)
        .take(2);
    let names: Vec<String> = repo
        .list_all(&query)
        .unwrap()
        .into_iter()
        .map(|book| book.name)
        .collect();
    assert_eq!(names, vec!["Dune".to_string(), "Beloved".to_string()]);
}

#[test]
fn default_listing_sorts_by_name() {
    let mut conn = open_db_in_memory().unwrap();
    let config = provisioned::<Movie>(&mut conn);
    let repo = SqliteEntityRepository::<Movie>::try_new(&conn, &config).unwrap();

    repo.upsert(&Movie::new("Ghostbusters", "Comedy", 0, 899)).unwrap();
    repo.upsert(&Movie::new("Alien", "Horror", 0, 599)).unwrap();
    repo.upsert(&Movie::new("Casablanca", "Drama", 0, 499)).unwrap();

    let titles: Vec<String> = repo
        .list_all(&ListQuery::new())
        .unwrap()
        .into_iter()
        .map(|movie| movie.title)
        .collect();
    assert_eq!(titles, vec!["Alien", "Casablanca", "Ghostbusters"]);
}

#[test]
fn predicate_filter_and_count() {
    let mut conn = open_db_in_memory().unwrap();
    let config = provisioned::<Student>(&mut conn);
    let repo = SqliteEntityRepository::<Student>::try_new(&conn, &config).unwrap();

    repo.upsert(&Student::new("s1", "Ann", "", 17)).unwrap();
    repo.upsert(&Student::new("s2", "Ben", "", 21)).unwrap();
    repo.upsert(&Student::new("s3", "Cid", "", 23)).unwrap();

    let adults = ListQuery::new().filter_by(|student: &Student| student.age >= 18).take(1);
    assert_eq!(repo.count(&adults).unwrap(), 2);
    assert_eq!(repo.list_all(&adults).unwrap().len(), 1);
}

#[test]
fn find_by_name_matches_exactly() {
    let mut conn = open_db_in_memory().unwrap();
    let config = provisioned::<Author>(&mut conn);
    let repo = SqliteEntityRepository::<Author>::try_new(&conn, &config).unwrap();

    let author = Author::new("Ursula K. Le Guin", 0);
    repo.upsert(&author).unwrap();

    assert_eq!(repo.find_by_name("Ursula K. Le Guin").unwrap(), Some(author));
    assert!(repo.find_by_name("Ursula").unwrap().is_none());
}

#[test]
fn validation_failure_blocks_upsert() {
    let mut conn = open_db_in_memory().unwrap();
    let config = provisioned::<Movie>(&mut conn);
    let repo = SqliteEntityRepository::<Movie>::try_new(&conn, &config).unwrap();

    let invalid = Movie::new("Ghostbusters", "Comedy", 0, -1);
    let err = repo.upsert(&invalid).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.find_by_id(&invalid.id).unwrap().is_none());
}

#[test]
fn read_rejects_document_with_mismatched_id() {
    let mut conn = open_db_in_memory().unwrap();
    let config = provisioned::<Student>(&mut conn);
    let repo = SqliteEntityRepository::<Student>::try_new(&conn, &config).unwrap();

    let student = Student::new("s1", "Ann", "", 17);
    conn.execute(
        "INSERT INTO \"Students\" (id, body) VALUES ('s2', ?1);",
        [serde_json::to_string(&student).unwrap()],
    )
    .unwrap();

    let err = repo.list_all(&ListQuery::new()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_rejects_unprovisioned_collection() {
    let conn = open_db_in_memory().unwrap();
    let config = ConnectionConfig::new("sqlite::memory:", "SchoolDB", "Students");

    let result = SqliteEntityRepository::<Student>::try_new(&conn, &config);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable(ref table)) if table == "Students"
    ));
}

#[test]
fn repository_rejects_collection_missing_required_column() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE \"Students\" (id TEXT PRIMARY KEY NOT NULL, body TEXT NOT NULL);")
        .unwrap();
    let config = ConnectionConfig::new("sqlite::memory:", "SchoolDB", "Students");

    let result = SqliteEntityRepository::<Student>::try_new(&conn, &config);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            column: "updated_at",
            ..
        })
    ));
}

#[test]
fn repository_rejects_invalid_collection_name() {
    let conn = open_db_in_memory().unwrap();
    let config = ConnectionConfig::new("sqlite::memory:", "SchoolDB", "Students; DROP");

    let result = SqliteEntityRepository::<Student>::try_new(&conn, &config);
    assert!(matches!(result, Err(RepoError::Configuration(_))));
}

#[test]
fn collections_on_one_connection_are_isolated() {
    let mut conn = open_db_in_memory().unwrap();
    let authors_config = provisioned::<Author>(&mut conn);
    let books_config = provisioned::<Book>(&mut conn);
    let authors = SqliteEntityRepository::<Author>::try_new(&conn, &authors_config).unwrap();
    let books = SqliteEntityRepository::<Book>::try_new(&conn, &books_config).unwrap();

    let author = Author::new("Frank Herbert", 0);
    let mut book = Book::new("Dune", BookType::ScienceFiction, 0, 1_200);
    book.author_id = Some(author.id);
    authors.upsert(&author).unwrap();
    books.upsert(&book).unwrap();

    assert_eq!(authors.count(&ListQuery::new()).unwrap(), 1);
    assert_eq!(books.count(&ListQuery::new()).unwrap(), 1);
    assert_eq!(
        books.find_by_id(&book.id).unwrap().unwrap().author_id,
        Some(author.id)
    );
}
