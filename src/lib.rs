//! REST server for a vault of short notes stored in PostgreSQL.
//!
//! | Method | Path | Params |
//! |--------|------|--------|
//! | `GET`    | `/`              | |
//! | `GET`    | `/api/note`      | |
//! | `GET`    | `/api/note/{id}` | `id` path segment |
//! | `POST`   | `/api/note`      | `?author=..&content=..` |
//! | `DELETE` | `/api/note`      | `?id=..` |
//!
//! [`router`] takes a ready [`NoteService`], so any
//! [`repository::NoteRepository`] can sit behind it.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use handlers::rest;
pub use service::NoteService;

/// CORS policy for the given origins. `"*"` anywhere in the list allows any
/// origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

pub fn router(service: Arc<NoteService>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(rest::usage))
        .route(
            "/api/note",
            get(rest::get_recent_notes)
                .post(rest::create_note)
                .delete(rest::delete_note),
        )
        .route("/api/note/{id}", get(rest::get_note))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", rest::ApiDoc::openapi()))
        .with_state(service)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}
