use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::scoring::ScoringError;
use super::service::{QuizService, QuizServiceError};
use crate::accounts::auth::{AuthSession, TokenVerifier};
use crate::accounts::repository::AccountRepository;
use crate::accounts::webhook::{UserSyncService, WebhookError, WebhookOutcome, WebhookVerifier};
use crate::telemetry::elapsed_ms;

/// Router builder exposing the question, scoring, and result endpoints.
pub fn quiz_router<R, T>(service: Arc<QuizService<R, T>>) -> Router
where
    R: AccountRepository + 'static,
    T: TokenVerifier + 'static,
{
    Router::new()
        .route("/api/questions", get(questions_handler::<R, T>))
        .route("/api/score", post(score_handler::<R, T>))
        .route("/api/submit-test", post(submit_handler::<R, T>))
        .route("/api/results", get(results_handler::<R, T>))
        .with_state(service)
}

/// Router builder for auth-provider webhook deliveries.
pub fn webhook_router<R, W>(sync: Arc<UserSyncService<R, W>>) -> Router
where
    R: AccountRepository + 'static,
    W: WebhookVerifier + 'static,
{
    Router::new()
        .route("/api/webhooks/clerk", post(webhook_handler::<R, W>))
        .route("/api/webhooks/clerk/health", get(webhook_health))
        .with_state(sync)
}

pub(crate) async fn questions_handler<R, T>(
    State(service): State<Arc<QuizService<R, T>>>,
) -> Response
where
    R: AccountRepository + 'static,
    T: TokenVerifier + 'static,
{
    (StatusCode::OK, Json(json!({ "questions": service.questions() }))).into_response()
}

pub(crate) async fn score_handler<R, T>(
    State(service): State<Arc<QuizService<R, T>>>,
    Json(payload): Json<Value>,
) -> Response
where
    R: AccountRepository + 'static,
    T: TokenVerifier + 'static,
{
    let answers = match answers_field(&payload) {
        Ok(answers) => answers,
        Err(response) => return response,
    };

    match service.score(answers) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => service_error_response(err, "Failed to score test"),
    }
}

pub(crate) async fn submit_handler<R, T>(
    State(service): State<Arc<QuizService<R, T>>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response
where
    R: AccountRepository + 'static,
    T: TokenVerifier + 'static,
{
    let session = match authorize(&service, &headers, "/api/submit-test") {
        Ok(session) => session,
        Err(response) => return response,
    };
    let answers = match answers_field(&payload) {
        Ok(answers) => answers,
        Err(response) => return response,
    };

    match service.submit(&session, answers) {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(err) => service_error_response(err, "Failed to submit test"),
    }
}

pub(crate) async fn results_handler<R, T>(
    State(service): State<Arc<QuizService<R, T>>>,
    headers: HeaderMap,
) -> Response
where
    R: AccountRepository + 'static,
    T: TokenVerifier + 'static,
{
    let session = match authorize(&service, &headers, "/api/results") {
        Ok(session) => session,
        Err(response) => return response,
    };

    match service.history(&session) {
        Ok(results) => (StatusCode::OK, Json(json!({ "results": results }))).into_response(),
        Err(err) => service_error_response(err, "Failed to load results"),
    }
}

pub(crate) async fn webhook_handler<R, W>(
    State(sync): State<Arc<UserSyncService<R, W>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    R: AccountRepository + 'static,
    W: WebhookVerifier + 'static,
{
    match sync.handle(&headers, &body) {
        Ok(WebhookOutcome::Ignored { .. }) => (
            StatusCode::OK,
            Json(json!({ "received": true, "message": "Event type not handled" })),
        )
            .into_response(),
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({ "success": true, "event": outcome.event_type() })),
        )
            .into_response(),
        Err(err @ WebhookError::Unverified { .. }) => {
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": err.to_string() }))).into_response()
        }
        Err(WebhookError::Malformed(message)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Malformed webhook payload", "message": message })),
        )
            .into_response(),
        Err(WebhookError::Repository(err)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to process webhook", "message": err.to_string() })),
        )
            .into_response(),
    }
}

pub(crate) async fn webhook_health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Clerk webhook handler is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

fn authorize<R, T>(
    service: &QuizService<R, T>,
    headers: &HeaderMap,
    path: &'static str,
) -> Result<AuthSession, Response>
where
    R: AccountRepository + 'static,
    T: TokenVerifier + 'static,
{
    let start = Instant::now();
    match service.authenticate(headers) {
        Ok(session) => {
            info!(
                event = "auth_success",
                user_id = %session.user_id,
                path,
                elapsed_ms = elapsed_ms(start),
                "request authenticated"
            );
            Ok(session)
        }
        Err(err) => {
            warn!(
                event = "auth_error",
                reason = err.reason(),
                path,
                elapsed_ms = elapsed_ms(start),
                "request rejected"
            );
            let payload = json!({
                "error": "Unauthorized",
                "message": err.to_string(),
                "code": err.code(),
            });
            Err((StatusCode::UNAUTHORIZED, Json(payload)).into_response())
        }
    }
}

fn answers_field(payload: &Value) -> Result<&[Value], Response> {
    match payload.get("answers").and_then(Value::as_array) {
        Some(answers) => Ok(answers.as_slice()),
        None => {
            let payload = json!({
                "error": "Invalid answers format",
                "code": "INVALID_PAYLOAD",
                "details": { "field": "answers", "expected": "array of integers" },
            });
            Err((StatusCode::BAD_REQUEST, Json(payload)).into_response())
        }
    }
}

fn scoring_error_response(err: &ScoringError) -> Response {
    let details = match err {
        ScoringError::SizeMismatch { expected, actual } => {
            json!({ "expected": expected, "actual": actual })
        }
        ScoringError::OutOfRange { index, value } => json!({ "index": index, "value": value }),
        ScoringError::NotNumeric { index } => json!({ "index": index }),
    };
    let payload = json!({
        "error": err.to_string(),
        "code": err.code(),
        "details": details,
    });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn service_error_response(err: QuizServiceError, failure: &'static str) -> Response {
    match err {
        QuizServiceError::Scoring(err) => scoring_error_response(&err),
        QuizServiceError::Repository(err) => {
            error!(error = %err, "{failure}");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": failure }))).into_response()
        }
    }
}
