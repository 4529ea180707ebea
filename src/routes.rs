use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::handlers::{self, AppState};

/// Largest accepted request body (1 MiB).
///
/// Enforced while the lead body is read, so sized and chunked uploads both
/// get the JSON 413 from `LeadError::PayloadTooLarge`.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Builds the full application router.
///
/// Anything not matched by the API routes is served from `public_dir`, so
/// `GET /` returns the landing page's `index.html`.
pub fn build_router(state: Arc<AppState>, public_dir: &str) -> Router {
    let api_routes = Router::new()
        .route("/api/lead", post(handlers::submit_lead))
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES)),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("❌ Panic while handling lead request");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "ok": false, "message": "Error interno del servidor" })),
    )
        .into_response()
}
