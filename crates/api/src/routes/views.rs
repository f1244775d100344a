use axum::routing::get;
use axum::Router;

use crate::handlers::views;
use crate::state::AppState;

/// Page routes.
///
/// ```text
/// GET /               overview
/// GET /tour/{slug}    tour detail
/// GET /login          login form
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(views::get_overview))
        .route("/tour/{slug}", get(views::get_tour))
        .route("/login", get(views::get_login_form))
}
