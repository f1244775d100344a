#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use natours_api::config::ServerConfig;
use natours_api::router::build_app_router;
use natours_api::state::AppState;
use natours_api::view::JsonViewRenderer;
use natours_core::populate::{PublicUser, ReviewSummary};
use natours_db::{MemoryStore, TourModel};
use serde_json::{json, Map, Value};
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
    }
}

/// Build the full application router over `store`, with the same
/// middleware stack production uses.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    let config = test_config();
    let state = AppState {
        tours: Arc::new(TourModel::with_store(store)),
        renderer: Arc::new(JsonViewRenderer),
    };
    build_app_router(state, &config)
}

/// A store holding two public tours, one secret tour, two guides and a
/// review of "The Forest Hiker".
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for id in [1, 2] {
        store
            .add_user(PublicUser {
                id,
                name: format!("Guide {id}"),
                email: format!("guide{id}@natours.io"),
                photo: Some(format!("user-{id}.jpg")),
                role: "guide".into(),
            })
            .await;
    }

    let model = TourModel::with_store(store.clone());
    let hiker = model
        .create(&tour("The Forest Hiker", 397, false, &[1, 2]))
        .await
        .expect("seed tour");
    model
        .create(&tour("The Sea Explorer", 497, false, &[2]))
        .await
        .expect("seed tour");
    model
        .create(&tour("The Secret Garden", 997, true, &[]))
        .await
        .expect("seed tour");

    store
        .add_review(ReviewSummary {
            id: 1,
            review: "Loved every minute".into(),
            rating: 5.0,
            user: 1,
            tour: hiker.id,
        })
        .await;

    store
}

/// A valid candidate document.
pub fn tour(name: &str, price: u32, secret: bool, guides: &[i64]) -> Map<String, Value> {
    let Value::Object(map) = json!({
        "name": name,
        "duration": 5,
        "max_group_size": 25,
        "difficulty": "easy",
        "price": price,
        "summary": "Breathtaking hike through the Canadian Banff National Park",
        "image_cover": "tour-1-cover.jpg",
        "secret_tour": secret,
        "guides": guides
    }) else {
        unreachable!()
    };
    map
}

/// Send a GET request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
