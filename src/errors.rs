use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::models::LeadField;

/// Everything that can go wrong while taking a lead in.
///
/// Variants carry operator-facing detail; the client only ever sees the
/// generic message returned by [`LeadError::client_message`].
#[derive(Debug)]
pub enum LeadError {
    /// One or more form fields failed validation.
    Validation(Vec<LeadField>),
    /// The request body exceeded the size limit.
    PayloadTooLarge,
    /// A row with the same email already exists.
    DuplicateEmail(String),
    /// The upstream lead API answered with a non-success status.
    UpstreamRejected {
        /// HTTP status returned upstream.
        status: u16,
        /// Raw response body, empty if it could not be read.
        body: String,
    },
    /// The upstream lead API could not be reached.
    Transport(String),
    /// The database failed for a reason other than a duplicate email.
    Persistence(String),
}

impl LeadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LeadError::Validation(_) => StatusCode::BAD_REQUEST,
            LeadError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            LeadError::DuplicateEmail(_) => StatusCode::CONFLICT,
            LeadError::UpstreamRejected { .. } => StatusCode::BAD_GATEWAY,
            LeadError::Transport(_) | LeadError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn client_message(&self) -> &'static str {
        match self {
            LeadError::Validation(_) => "Datos inválidos",
            LeadError::PayloadTooLarge => "La solicitud es demasiado grande",
            LeadError::DuplicateEmail(_) => "El correo ya está registrado",
            LeadError::UpstreamRejected { .. } => "Error enviando el lead",
            LeadError::Transport(_) => "No se pudo conectar con el servicio de leads",
            LeadError::Persistence(_) => "No se pudo guardar el lead",
        }
    }
}

impl fmt::Display for LeadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadError::Validation(fields) => {
                let names: Vec<&str> = fields.iter().map(LeadField::as_str).collect();
                write!(f, "Invalid fields: {}", names.join(", "))
            }
            LeadError::PayloadTooLarge => write!(f, "Request body too large"),
            LeadError::DuplicateEmail(email) => write!(f, "Duplicate email: {}", email),
            LeadError::UpstreamRejected { status, body } => {
                write!(f, "Lead API returned {}: {}", status, body)
            }
            LeadError::Transport(msg) => write!(f, "Lead API unreachable: {}", msg),
            LeadError::Persistence(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for LeadError {}

impl IntoResponse for LeadError {
    /// Logs the internal detail and answers with `{ ok: false, message }`.
    ///
    /// Validation failures also list the offending `fields`.
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.client_message();

        let body = match &self {
            LeadError::Validation(fields) => {
                tracing::warn!("❌ Lead rejected: {}", self);
                json!({ "ok": false, "message": message, "fields": fields })
            }
            LeadError::PayloadTooLarge | LeadError::DuplicateEmail(_) => {
                tracing::warn!("⚠️  {}", self);
                json!({ "ok": false, "message": message })
            }
            LeadError::UpstreamRejected { .. }
            | LeadError::Transport(_)
            | LeadError::Persistence(_) => {
                tracing::error!("❌ {}", self);
                json!({ "ok": false, "message": message })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for LeadError {
    fn from(err: reqwest::Error) -> Self {
        LeadError::Transport(err.to_string())
    }
}
