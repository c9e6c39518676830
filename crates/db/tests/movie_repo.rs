use assert_matches::assert_matches;
use reelvault_core::error::{CoreError, FailureCode};
use reelvault_core::movie::{CreateActor, CreateMovie, NewMovie, UpdateMovie};
use reelvault_core::query::{MovieFilterSpec, MovieQuery, SortKey, SortOrder};
use reelvault_core::validation::{validate_create, validate_update};
use reelvault_db::repositories::{ActorRepo, MovieRepo};
use reelvault_db::RepoError;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn request(title: &str, year: f64, format: &str, actors: &[&str]) -> CreateMovie {
    CreateMovie {
        title: title.to_string(),
        year,
        format: format.to_string(),
        actors: Some(
            actors
                .iter()
                .map(|name| CreateActor {
                    name: name.to_string(),
                })
                .collect(),
        ),
    }
}

fn new_movie(title: &str, year: i32, format: &str, actors: &[&str]) -> NewMovie {
    validate_create(&request(title, f64::from(year), format, actors)).unwrap()
}

fn filter(query: MovieQuery) -> MovieFilterSpec {
    MovieFilterSpec::from_query(&query, 20, 100)
}

// ---------------------------------------------------------------------------
// Create / find
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_find_with_cast(pool: SqlitePool) {
    let created = MovieRepo::create(
        &pool,
        &new_movie("Casablanca", 1942, "DVD", &["Humphrey Bogart", "Ingrid Bergman"]),
    )
    .await
    .unwrap();

    assert_eq!(created.movie.title, "Casablanca");
    assert_eq!(created.movie.year, 1942);
    assert_eq!(created.movie.format, "DVD");
    assert_eq!(created.actor_names(), vec!["Humphrey Bogart", "Ingrid Bergman"]);

    let found = MovieRepo::find_by_id(&pool, created.movie.id)
        .await
        .unwrap()
        .expect("movie should exist");
    assert_eq!(found.movie.title, "Casablanca");
    assert_eq!(found.actor_names(), vec!["Humphrey Bogart", "Ingrid Bergman"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_missing_returns_none(pool: SqlitePool) {
    assert!(MovieRepo::find_by_id(&pool, 999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_title_is_conflict(pool: SqlitePool) {
    MovieRepo::create(&pool, &new_movie("Matrix", 1999, "DVD", &["Keanu Reeves"]))
        .await
        .unwrap();

    let err = MovieRepo::create(&pool, &new_movie("Matrix", 2003, "VHS", &[]))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        RepoError::Core(CoreError::Conflict { field: "title", ref value }) if value == "Matrix"
    );

    // The failed create left nothing behind.
    assert_eq!(MovieRepo::count(&pool).await.unwrap(), 1);
    let actors: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM actors")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(actors.0, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_titles_are_unique_case_sensitively(pool: SqlitePool) {
    MovieRepo::create(&pool, &new_movie("Alien", 1979, "VHS", &[]))
        .await
        .unwrap();
    MovieRepo::create(&pool, &new_movie("ALIEN", 1979, "VHS", &[]))
        .await
        .unwrap();
    assert_eq!(MovieRepo::count(&pool).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_out_of_range_year_never_reaches_storage(pool: SqlitePool) {
    let failures = validate_create(&request("Metropolis", 1899.0, "VHS", &[])).unwrap_err();
    assert_eq!(failures[0].code, FailureCode::MovieYearBiggerThan1900);

    // The CHECK constraint backs the validation rule.
    let result = sqlx::query(
        "INSERT INTO movies (title, title_key, year, format, created_at, updated_at)
         VALUES ('Metropolis', 'metropolis', 1899, 'VHS', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err());
    assert_eq!(MovieRepo::count(&pool).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_applies_present_fields_and_keeps_cast(pool: SqlitePool) {
    let created = MovieRepo::create(&pool, &new_movie("Heat", 1995, "VHS", &["Al Pacino"]))
        .await
        .unwrap();

    let patch = validate_update(&UpdateMovie {
        format: Some("DVD".to_string()),
        ..Default::default()
    })
    .unwrap();
    let updated = MovieRepo::update(&pool, created.movie.id, &patch)
        .await
        .unwrap()
        .expect("movie should exist");

    assert_eq!(updated.movie.title, "Heat");
    assert_eq!(updated.movie.year, 1995);
    assert_eq!(updated.movie.format, "DVD");
    assert_eq!(updated.actor_names(), vec!["Al Pacino"]);
    assert!(updated.movie.updated_at >= created.movie.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_replaces_cast(pool: SqlitePool) {
    let created = MovieRepo::create(
        &pool,
        &new_movie("Heat", 1995, "VHS", &["Al Pacino", "Robert De Niro"]),
    )
    .await
    .unwrap();

    let patch = validate_update(&UpdateMovie {
        actors: Some(vec![CreateActor {
            name: "Val Kilmer".to_string(),
        }]),
        ..Default::default()
    })
    .unwrap();
    let updated = MovieRepo::update(&pool, created.movie.id, &patch)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.actor_names(), vec!["Val Kilmer"]);

    let stored = ActorRepo::list_by_movie(&pool, created.movie.id).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_to_taken_title_is_conflict(pool: SqlitePool) {
    MovieRepo::create(&pool, &new_movie("Heat", 1995, "VHS", &[]))
        .await
        .unwrap();
    let other = MovieRepo::create(&pool, &new_movie("Ronin", 1998, "DVD", &[]))
        .await
        .unwrap();

    let patch = validate_update(&UpdateMovie {
        title: Some("Heat".to_string()),
        ..Default::default()
    })
    .unwrap();
    let err = MovieRepo::update(&pool, other.movie.id, &patch)
        .await
        .unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::Conflict { .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_returns_none(pool: SqlitePool) {
    let patch = validate_update(&UpdateMovie::default()).unwrap();
    assert!(MovieRepo::update(&pool, 42, &patch).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_removes_cast(pool: SqlitePool) {
    let created = MovieRepo::create(
        &pool,
        &new_movie("Jaws", 1975, "Blu-ray", &["Roy Scheider", "Robert Shaw"]),
    )
    .await
    .unwrap();
    let actor_ids: Vec<i64> = created.actors.iter().map(|a| a.id).collect();

    assert!(MovieRepo::delete_by_id(&pool, created.movie.id).await.unwrap());

    assert!(MovieRepo::find_by_id(&pool, created.movie.id)
        .await
        .unwrap()
        .is_none());
    for id in actor_ids {
        assert!(ActorRepo::find_by_id(&pool, id).await.unwrap().is_none());
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_missing_returns_false(pool: SqlitePool) {
    assert!(!MovieRepo::delete_by_id(&pool, 7).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_key_cascades_on_raw_delete(pool: SqlitePool) {
    let created = MovieRepo::create(&pool, &new_movie("Jaws", 1975, "DVD", &["Roy Scheider"]))
        .await
        .unwrap();

    sqlx::query("DELETE FROM movies WHERE id = ?")
        .bind(created.movie.id)
        .execute(&pool)
        .await
        .unwrap();

    let remaining = ActorRepo::list_by_movie(&pool, created.movie.id).await.unwrap();
    assert!(remaining.is_empty());
}

// ---------------------------------------------------------------------------
// Query / count
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unfiltered_query_returns_all_with_full_cast(pool: SqlitePool) {
    MovieRepo::create(&pool, &new_movie("Solaris", 1972, "DVD", &[]))
        .await
        .unwrap();
    MovieRepo::create(&pool, &new_movie("Stalker", 1979, "DVD", &["Alisa Freyndlikh"]))
        .await
        .unwrap();

    let movies = MovieRepo::query(&pool, &filter(MovieQuery::default()))
        .await
        .unwrap();
    assert_eq!(movies.len(), 2);
    assert!(movies[0].actors.is_empty());
    assert_eq!(movies[1].actor_names(), vec!["Alisa Freyndlikh"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_actor_filter_attaches_matching_cast_only(pool: SqlitePool) {
    MovieRepo::create(
        &pool,
        &new_movie("Speed", 1994, "VHS", &["Keanu Reeves", "Sandra Bullock"]),
    )
    .await
    .unwrap();
    MovieRepo::create(&pool, &new_movie("Gravity", 2013, "Blu-ray", &["Sandra Bullock"]))
        .await
        .unwrap();

    let movies = MovieRepo::query(
        &pool,
        &filter(MovieQuery {
            actor: Some("reeves".to_string()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].movie.title, "Speed");
    assert_eq!(movies[0].actor_names(), vec!["Keanu Reeves"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_query_sorts_and_paginates_movies(pool: SqlitePool) {
    for (title, year) in [("b movie", 2001), ("A Movie", 1999), ("C Movie", 2000)] {
        MovieRepo::create(&pool, &new_movie(title, year, "DVD", &["Some Actor", "Other Actor"]))
            .await
            .unwrap();
    }

    let by_title = MovieRepo::query(
        &pool,
        &filter(MovieQuery {
            sort: SortKey::Title,
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    let titles: Vec<_> = by_title.iter().map(|m| m.movie.title.as_str()).collect();
    assert_eq!(titles, vec!["A Movie", "b movie", "C Movie"]);

    let page = MovieRepo::query(
        &pool,
        &filter(MovieQuery {
            sort: SortKey::Year,
            order: SortOrder::Desc,
            limit: Some(1),
            offset: Some(1),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].movie.year, 2000);
    assert_eq!(page[0].actors.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_like_wildcards_are_literal(pool: SqlitePool) {
    MovieRepo::create(&pool, &new_movie("100% Wolf", 2020, "DVD", &["Ilai Swindells"]))
        .await
        .unwrap();
    MovieRepo::create(&pool, &new_movie("1000 Wolves", 2021, "DVD", &["Some Actor"]))
        .await
        .unwrap();

    let movies = MovieRepo::query(
        &pool,
        &filter(MovieQuery {
            title: Some("0%".to_string()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].movie.title, "100% Wolf");
}
