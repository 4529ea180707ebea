use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::errors::LeadError;
use crate::lead_sink::LeadSink;
use crate::models::{LeadInput, Submission};
use crate::validation::validate;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// The single backend selected at startup.
    pub sink: Arc<dyn LeadSink>,
}

/// Health check endpoint.
///
/// Returns the service status, version, and the active lead backend.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-intake",
            "version": env!("CARGO_PKG_VERSION"),
            "backend": state.sink.name(),
        })),
    )
}

/// POST /api/lead
///
/// Validates the landing form submission and hands it to the configured
/// backend.
///
/// Responses:
/// - 201 `{ ok, message, externalResponse | lead }` when the backend accepts it.
/// - 400 `{ ok, message, fields }` when validation fails.
/// - 409 / 502 / 500 `{ ok, message }` for backend failures (see `LeadError`).
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    input: LeadInput,
) -> Result<(StatusCode, Json<serde_json::Value>), LeadError> {
    let lead = validate(&input).map_err(LeadError::Validation)?;

    tracing::info!("📨 Valid lead received, submitting to {}", state.sink.name());

    let body = match state.sink.submit(&lead).await? {
        Submission::Forwarded(data) => json!({
            "ok": true,
            "message": "Lead enviado correctamente",
            "externalResponse": data,
        }),
        Submission::Stored(row) => json!({
            "ok": true,
            "message": "Lead registrado correctamente",
            "lead": row,
        }),
    };

    Ok((StatusCode::CREATED, Json(body)))
}

/// Reads the form body as JSON or urlencoded, depending on `Content-Type`.
///
/// Bodies over the router's limit are rejected with `LeadError::PayloadTooLarge`.
/// Bodies that are missing, unreadable, or of another type become an empty
/// submission, which validation then rejects field by field.
#[async_trait]
impl<S> FromRequest<S> for LeadInput
where
    S: Send + Sync,
{
    type Rejection = LeadError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_default();

        let bytes = match Bytes::from_request(req, state).await {
            Ok(bytes) => bytes,
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return Err(LeadError::PayloadTooLarge);
            }
            Err(rejection) => {
                tracing::warn!("Could not read lead body: {}", rejection);
                return Ok(LeadInput::default());
            }
        };

        if bytes.is_empty() {
            return Ok(LeadInput::default());
        }

        let input = if is_json(&content_type) {
            match serde_json::from_slice(&bytes) {
                Ok(value) => LeadInput::from_json(value),
                Err(e) => {
                    tracing::warn!("Malformed JSON lead body: {}", e);
                    LeadInput::default()
                }
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            LeadInput::from_form_pairs(url::form_urlencoded::parse(&bytes))
        } else {
            tracing::warn!("Unsupported lead content type: '{}'", content_type);
            LeadInput::default()
        };

        Ok(input)
    }
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence == "application/json" || essence.ends_with("+json")
}
