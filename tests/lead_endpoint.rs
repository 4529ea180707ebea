/// Router-level tests for POST /api/lead
/// Uses in-memory backends so every outcome of the pipeline can be exercised
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use lead_intake::errors::LeadError;
use lead_intake::handlers::AppState;
use lead_intake::lead_sink::LeadSink;
use lead_intake::models::{NormalizedLead, StoredLead, Submission};
use lead_intake::routes::{build_router, BODY_LIMIT_BYTES};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// In-memory stand-in for the `usuarios` table, unique on email.
#[derive(Default)]
struct MemoryStorage {
    rows: Mutex<Vec<NormalizedLead>>,
}

#[async_trait]
impl LeadSink for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn submit(&self, lead: &NormalizedLead) -> Result<Submission, LeadError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|row| row.email() == lead.email()) {
            return Err(LeadError::DuplicateEmail(lead.email().to_string()));
        }
        rows.push(lead.clone());
        Ok(Submission::Stored(StoredLead {
            id: rows.len() as i64,
            nombre: lead.name().to_string(),
            correo: lead.email().to_string(),
        }))
    }
}

/// Backend that always fails with the error built by `make`.
struct FailingSink {
    make: fn() -> LeadError,
}

#[async_trait]
impl LeadSink for FailingSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn submit(&self, _lead: &NormalizedLead) -> Result<Submission, LeadError> {
        Err((self.make)())
    }
}

struct PanickingSink;

#[async_trait]
impl LeadSink for PanickingSink {
    fn name(&self) -> &'static str {
        "panicking"
    }

    async fn submit(&self, _lead: &NormalizedLead) -> Result<Submission, LeadError> {
        panic!("backend exploded");
    }
}

struct ForwardingSink;

#[async_trait]
impl LeadSink for ForwardingSink {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn submit(&self, lead: &NormalizedLead) -> Result<Submission, LeadError> {
        Ok(Submission::Forwarded(json!({ "received": lead.email() })))
    }
}

fn app(sink: Arc<dyn LeadSink>) -> Router {
    build_router(Arc::new(AppState { sink }), "tests/no-public-dir")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/lead")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/lead")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_valid_lead_is_stored_and_echoed() {
    let storage = Arc::new(MemoryStorage::default());

    let (status, body) = send(
        app(storage.clone()),
        json_request(json!({"nombre": "Ana", "edad": "25", "correo": " Ana@Example.com "})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["lead"]["correo"], json!("ana@example.com"));
    assert_eq!(body["lead"]["nombre"], json!("Ana"));

    let rows = storage.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].age(), 25);
}

#[tokio::test]
async fn test_invalid_lead_lists_fields_in_order() {
    let storage = Arc::new(MemoryStorage::default());

    let (status, body) = send(
        app(storage.clone()),
        json_request(json!({"nombre": "A", "edad": 17, "correo": "bad"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"ok": false, "message": "Datos inválidos", "fields": ["name", "age", "email"]})
    );
    assert!(storage.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_only_invalid_fields_are_reported() {
    let (status, body) = send(
        app(Arc::new(MemoryStorage::default())),
        json_request(json!({"nombre": "Ana", "edad": "abc", "correo": "ana@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"], json!(["age"]));
}

#[tokio::test]
async fn test_form_encoded_submission() {
    let (status, body) = send(
        app(Arc::new(MemoryStorage::default())),
        form_request("nombre=Luis&edad=40&correo=LUIS%40Example.org"),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["lead"]["correo"], json!("luis@example.org"));
}

#[tokio::test]
async fn test_missing_body_is_a_validation_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/lead")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(Arc::new(MemoryStorage::default())), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"], json!(["name", "age", "email"]));
}

#[tokio::test]
async fn test_malformed_and_odd_bodies_never_escape() {
    let odd_bodies = [
        "{not json",
        "[]",
        "null",
        "42",
        r#"{"nombre": {"a": 1}, "edad": [1e308], "correo": false}"#,
        r#"{"nombre": "Ana", "edad": 1e308, "correo": "ana@example.com"}"#,
    ];

    for raw in odd_bodies {
        let request = Request::builder()
            .method("POST")
            .uri("/api/lead")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap();

        let (status, body) = send(app(Arc::new(MemoryStorage::default())), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{raw}");
        assert_eq!(body["ok"], json!(false), "{raw}");
    }
}

#[tokio::test]
async fn test_duplicate_email_conflicts_without_new_row() {
    let storage = Arc::new(MemoryStorage::default());
    let router = app(storage.clone());

    let (first, _) = send(
        router.clone(),
        json_request(json!({"nombre": "Ana", "edad": 25, "correo": "ana@example.com"})),
    )
    .await;
    let (second, body) = send(
        router,
        json_request(json!({"nombre": "Ana Bis", "edad": 30, "correo": " ANA@example.com"})),
    )
    .await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body, json!({"ok": false, "message": "El correo ya está registrado"}));
    assert_eq!(storage.rows.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_backend_failures_map_to_statuses() {
    let cases: [(fn() -> LeadError, StatusCode); 3] = [
        (
            || LeadError::UpstreamRejected {
                status: 422,
                body: "internal detail".to_string(),
            },
            StatusCode::BAD_GATEWAY,
        ),
        (
            || LeadError::Transport("connection refused".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            || LeadError::Persistence("deadlock detected".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (make, expected) in cases {
        let (status, body) = send(
            app(Arc::new(FailingSink { make })),
            json_request(json!({"nombre": "Ana", "edad": 25, "correo": "ana@example.com"})),
        )
        .await;

        assert_eq!(status, expected);
        assert_eq!(body["ok"], json!(false));
        let keys: HashSet<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, HashSet::from(["ok", "message"]));
        assert!(!body.to_string().contains("detail"));
        assert!(!body.to_string().contains("refused"));
        assert!(!body.to_string().contains("deadlock"));
    }
}

#[tokio::test]
async fn test_forwarded_lead_returns_upstream_body() {
    let (status, body) = send(
        app(Arc::new(ForwardingSink)),
        json_request(json!({"nombre": "Ana", "edad": 25, "correo": "ana@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], json!("Lead enviado correctamente"));
    assert_eq!(body["externalResponse"], json!({"received": "ana@example.com"}));
}

#[tokio::test]
async fn test_backend_panic_becomes_500() {
    let (status, body) = send(
        app(Arc::new(PanickingSink)),
        json_request(json!({"nombre": "Ana", "edad": 25, "correo": "ana@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], json!(false));
}

fn oversized_lead() -> String {
    let huge = "x".repeat(2 * 1024 * 1024);
    json!({"nombre": huge, "edad": 25, "correo": "a@b.co"}).to_string()
}

#[tokio::test]
async fn test_oversized_body_with_length_is_413_json() {
    let body = oversized_lead();
    let request = Request::builder()
        .method("POST")
        .uri("/api/lead")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let storage = Arc::new(MemoryStorage::default());
    let (status, body) = send(app(storage.clone()), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        body,
        json!({"ok": false, "message": "La solicitud es demasiado grande"})
    );
    assert!(storage.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_chunked_body_is_413_json() {
    let chunks: Vec<Result<String, std::io::Error>> = oversized_lead()
        .into_bytes()
        .chunks(64 * 1024)
        .map(|chunk| Ok(String::from_utf8_lossy(chunk).into_owned()))
        .collect();
    let request = Request::builder()
        .method("POST")
        .uri("/api/lead")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(Body::from_stream(futures_util::stream::iter(chunks)))
        .unwrap();

    let storage = Arc::new(MemoryStorage::default());
    let (status, body) = send(app(storage.clone()), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        body,
        json!({"ok": false, "message": "La solicitud es demasiado grande"})
    );
    assert!(storage.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_body_just_under_limit_is_validated() {
    let padding = "x".repeat(BODY_LIMIT_BYTES - 200);
    let (status, body) = send(
        app(Arc::new(MemoryStorage::default())),
        json_request(json!({"nombre": "Ana", "edad": 25, "correo": "ana@example.com", "pad": padding})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], json!(true));
}

#[tokio::test]
async fn test_health_reports_backend() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(Arc::new(ForwardingSink)), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["backend"], json!("api"));
}
