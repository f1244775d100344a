//! View rendering seam.
//!
//! Handlers pick a template and build its payload; the renderer decides how
//! that becomes a response body.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Well-known template names.
pub mod templates {
    pub const OVERVIEW: &str = "overview";
    pub const TOUR: &str = "tour";
    pub const LOGIN: &str = "login";
}

pub trait ViewRenderer: Send + Sync {
    fn render(&self, template: &'static str, payload: Value) -> Response;
}

/// Renders `{ "template": <name>, "data": <payload> }` as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonViewRenderer;

impl ViewRenderer for JsonViewRenderer {
    fn render(&self, template: &'static str, payload: Value) -> Response {
        Json(json!({
            "template": template,
            "data": payload,
        }))
        .into_response()
    }
}
