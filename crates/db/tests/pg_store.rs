//! Integration tests for the Postgres store against a real database.
//!
//! Each test gets a fresh database with the crate migrations applied. They
//! need `DATABASE_URL` pointing at a Postgres server, so they are ignored by
//! default: run with `cargo test -p natours-db -- --ignored`.

use std::sync::Arc;

use assert_matches::assert_matches;
use natours_core::error::CoreError;
use natours_core::populate::{Guides, PopulateSpec};
use natours_core::query::{TourQuery, Visibility};
use natours_db::models::review::CreateReview;
use natours_db::models::user::CreateUser;
use natours_db::repositories::{ReviewRepo, UserRepo};
use natours_db::{PgStore, TourModel};
use serde_json::{json, Map, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tour_doc(name: &str, secret: bool, guides: &[i64]) -> Map<String, Value> {
    let Value::Object(map) = json!({
        "name": name,
        "duration": 7,
        "max_group_size": 15,
        "difficulty": "medium",
        "price": 497,
        "summary": "Exploring the jaw-dropping US east coast by foot and by boat",
        "image_cover": "tour-2-cover.jpg",
        "images": ["tour-2-1.jpg", "tour-2-2.jpg"],
        "start_dates": ["2021-06-19T09:00:00Z"],
        "secret_tour": secret,
        "guides": guides
    }) else {
        unreachable!()
    };
    map
}

fn new_user(name: &str, email: &str) -> CreateUser {
    CreateUser {
        name: name.to_string(),
        email: email.to_string(),
        photo: None,
        role: "guide".to_string(),
        password_hash: "not-a-real-hash".to_string(),
    }
}

fn model(pool: PgPool) -> TourModel {
    TourModel::with_store(Arc::new(PgStore::new(pool)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn create_round_trips_arrays_and_slug(pool: PgPool) {
    let tour = model(pool)
        .create(&tour_doc("The Sea Explorer", false, &[]))
        .await
        .unwrap();

    assert_eq!(tour.slug, "the-sea-explorer");
    assert_eq!(tour.images, vec!["tour-2-1.jpg", "tour-2-2.jpg"]);
    assert_eq!(tour.start_dates.len(), 1);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn listing_hides_secret_tours(pool: PgPool) {
    let model = model(pool);
    model
        .create(&tour_doc("The Secret Explorer", true, &[]))
        .await
        .unwrap();
    model
        .create(&tour_doc("The Sea Explorer", false, &[]))
        .await
        .unwrap();

    let public = model
        .find(TourQuery::default(), Visibility::PublicOnly, PopulateSpec::NONE)
        .await
        .unwrap();
    assert_eq!(public.value.len(), 1);
    assert_eq!(public.value[0].name, "The Sea Explorer");

    let all = model
        .find(
            TourQuery::default(),
            Visibility::IncludeSecret,
            PopulateSpec::NONE,
        )
        .await
        .unwrap();
    assert_eq!(all.value.len(), 2);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_name_is_rejected(pool: PgPool) {
    let model = model(pool);
    model
        .create(&tour_doc("The Sea Explorer", false, &[]))
        .await
        .unwrap();
    let err = model
        .create(&tour_doc("The Sea Explorer", false, &[]))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Invalid(_));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn detail_populates_guides_and_reviews(pool: PgPool) {
    let guide = UserRepo::create(&pool, &new_user("Lourdes Browning", "lourdes@example.com"))
        .await
        .unwrap();
    let reviewer = UserRepo::create(&pool, &new_user("Sophie Louise", "sophie@example.com"))
        .await
        .unwrap();

    let model = model(pool.clone());
    let tour = model
        .create(&tour_doc("The Sea Explorer", false, &[guide.id, 999]))
        .await
        .unwrap();
    ReviewRepo::create(
        &pool,
        &CreateReview {
            review: "Amazing".to_string(),
            rating: 5.0,
            tour_id: tour.id,
            user_id: reviewer.id,
        },
    )
    .await
    .unwrap();

    let detail = model.find_by_slug("the-sea-explorer").await.unwrap();
    assert_matches!(
        &detail.guides,
        Guides::Users(users) if users.len() == 1 && users[0].id == guide.id
    );
    assert_eq!(detail.reviews.as_ref().map(Vec::len), Some(1));
}
