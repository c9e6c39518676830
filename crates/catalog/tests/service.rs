use std::collections::HashSet;

use assert_matches::assert_matches;
use reelvault_catalog::config::CatalogConfig;
use reelvault_catalog::{CatalogError, CatalogService};
use reelvault_core::error::{CoreError, FailureCode};
use reelvault_core::movie::{CreateActor, CreateMovie, UpdateMovie};
use reelvault_db::repositories::ActorRepo;
use serde_json::json;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn service(pool: SqlitePool) -> CatalogService {
    CatalogService::new(pool, &CatalogConfig::default())
}

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

fn validation_codes(err: &CatalogError) -> Vec<(String, FailureCode)> {
    match err {
        CatalogError::Core(CoreError::Validation(failures)) => failures
            .iter()
            .map(|f| (f.field.clone(), f.code))
            .collect(),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Round trip / uniqueness / year range
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_then_get_round_trips(pool: SqlitePool) {
    let service = service(pool);
    let created = service
        .create_movie(&request("Matrix", 1999.0, "DVD", &["A", "B"]))
        .await
        .unwrap();

    let fetched = service.get_movie(created.movie.id).await.unwrap();
    assert_eq!(fetched.movie.title, "Matrix");
    assert_eq!(fetched.movie.year, 1999);
    assert_eq!(fetched.movie.format, "DVD");

    let names: HashSet<&str> = fetched.actor_names().into_iter().collect();
    assert_eq!(names, HashSet::from(["A", "B"]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_title_fails_with_movie_exists(pool: SqlitePool) {
    let service = service(pool);
    let first = service
        .create_movie(&request("Matrix", 1999.0, "DVD", &["Keanu Reeves"]))
        .await
        .unwrap();

    let err = service
        .create_movie(&request("Matrix", 2021.0, "Blu-ray", &[]))
        .await
        .unwrap_err();
    assert_matches!(err, CatalogError::Core(CoreError::Conflict { field: "title", .. }));

    let description = err.describe();
    assert_eq!(description.code, FailureCode::MovieExists);
    assert_eq!(description.fields["title"], json!("UNIQUE"));

    let intact = service.get_movie(first.movie.id).await.unwrap();
    assert_eq!(intact.movie.year, 1999);
    assert_eq!(intact.actor_names(), vec!["Keanu Reeves"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_year_boundaries(pool: SqlitePool) {
    let service = service(pool);

    let err = service
        .create_movie(&request("Too Early", 1899.0, "VHS", &[]))
        .await
        .unwrap_err();
    assert_eq!(
        validation_codes(&err),
        vec![("year".to_string(), FailureCode::MovieYearBiggerThan1900)]
    );

    let err = service
        .create_movie(&request("Too Late", 2101.0, "VHS", &[]))
        .await
        .unwrap_err();
    assert_eq!(
        validation_codes(&err),
        vec![("year".to_string(), FailureCode::MovieYearLessThan2100)]
    );

    service
        .create_movie(&request("Earliest", 1900.0, "VHS", &[]))
        .await
        .unwrap();
    service
        .create_movie(&request("Latest", 2100.0, "VHS", &[]))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_actor_is_rejected_before_storage(pool: SqlitePool) {
    let service = service(pool.clone());
    let err = service
        .create_movie(&request("Star Wars", 1977.0, "DVD", &["R2-D2"]))
        .await
        .unwrap_err();
    assert_eq!(
        validation_codes(&err),
        vec![("actors".to_string(), FailureCode::FormatError)]
    );
    assert_eq!(err.describe().code, FailureCode::MalformedRequest);

    let movies: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movies")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(movies.0, 0);
}

// ---------------------------------------------------------------------------
// Not found / update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_movie_is_not_found(pool: SqlitePool) {
    let service = service(pool);

    let err = service.get_movie(404).await.unwrap_err();
    assert_eq!(
        serde_json::to_value(err.describe()).unwrap(),
        json!({"code": "MOVIE_NOT_FOUND", "fields": {"id": 404}})
    );

    assert_matches!(
        service.delete_movie(404).await,
        Err(CatalogError::Core(CoreError::NotFound { id: 404, .. }))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_of_missing_movie_reports_not_found_before_validation(pool: SqlitePool) {
    let service = service(pool);
    let err = service
        .update_movie(
            12,
            &UpdateMovie {
                year: Some(3000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, CatalogError::Core(CoreError::NotFound { id: 12, .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_keeps_cast_unless_replaced(pool: SqlitePool) {
    let service = service(pool);
    let created = service
        .create_movie(&request("Alien", 1979.0, "VHS", &["Sigourney Weaver"]))
        .await
        .unwrap();
    let id = created.movie.id;

    let updated = service
        .update_movie(
            id,
            &UpdateMovie {
                format: Some("Blu-ray".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.movie.format, "Blu-ray");
    assert_eq!(updated.actor_names(), vec!["Sigourney Weaver"]);

    let updated = service
        .update_movie(
            id,
            &UpdateMovie {
                actors: Some(vec![
                    CreateActor {
                        name: "Tom Skerritt".into(),
                    },
                    CreateActor {
                        name: "John Hurt".into(),
                    },
                ]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.actor_names(), vec!["Tom Skerritt", "John Hurt"]);
    assert_eq!(updated.movie.format, "Blu-ray");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_cascades_to_actors(pool: SqlitePool) {
    let service = service(pool.clone());
    let created = service
        .create_movie(&request("Jaws", 1975.0, "DVD", &["Roy Scheider", "Robert Shaw"]))
        .await
        .unwrap();
    let actor_ids: Vec<i64> = created.actors.iter().map(|a| a.id).collect();
    assert_eq!(actor_ids.len(), 2);

    service.delete_movie(created.movie.id).await.unwrap();

    assert_matches!(
        service.get_movie(created.movie.id).await,
        Err(CatalogError::Core(CoreError::NotFound { .. }))
    );
    for id in actor_ids {
        assert!(ActorRepo::find_by_id(&pool, id).await.unwrap().is_none());
    }
}
