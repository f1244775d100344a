//! Handlers for the rendered pages.

use axum::extract::{Path, State};
use axum::response::Response;
use natours_core::populate::PopulateSpec;
use natours_core::query::{TourFilter, TourQuery, Visibility};
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;
use crate::view::templates;

/// GET /
pub async fn get_overview(State(state): State<AppState>) -> AppResult<Response> {
    let tours = state
        .tours
        .find(
            TourQuery::all(TourFilter::new()),
            Visibility::PublicOnly,
            PopulateSpec::GUIDES,
        )
        .await?
        .value;

    Ok(state.renderer.render(
        templates::OVERVIEW,
        json!({
            "title": "All Tours",
            "tours": tours,
        }),
    ))
}

/// GET /tour/{slug}
pub async fn get_tour(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let tour = state.tours.find_by_slug(&slug).await?;

    Ok(state.renderer.render(
        templates::TOUR,
        json!({
            "title": format!("{} Tour", tour.name),
            "tour": tour,
        }),
    ))
}

/// GET /login
pub async fn get_login_form(State(state): State<AppState>) -> Response {
    state.renderer.render(
        templates::LOGIN,
        json!({ "title": "Login into your account" }),
    )
}
