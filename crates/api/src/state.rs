use std::sync::Arc;

use natours_db::TourModel;

use crate::view::ViewRenderer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Tour save/read pipelines over the configured stores.
    pub tours: Arc<TourModel>,
    /// Turns a template name and payload into a response.
    pub renderer: Arc<dyn ViewRenderer>,
}
