use crate::infra::AppState;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use persona_quiz::accounts::{AccountRepository, TokenVerifier, UserSyncService, WebhookVerifier};
use persona_quiz::quiz::{quiz_router, webhook_router, QuizService};
use serde_json::json;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub(crate) fn with_quiz_routes<R, T, W>(
    quiz: Arc<QuizService<R, T>>,
    sync: Arc<UserSyncService<R, W>>,
) -> Router
where
    R: AccountRepository + 'static,
    T: TokenVerifier + 'static,
    W: WebhookVerifier + 'static,
{
    quiz_router(quiz)
        .merge(webhook_router(sync))
        .route("/api/health", get(api_health))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .fallback(asset_fallback)
}

pub(crate) async fn api_health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "Health Check" }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Serve the front-end bundle for any unmatched path; `/` maps to `index.html`.
pub(crate) async fn asset_fallback(Extension(state): Extension<AppState>, uri: Uri) -> Response {
    let Some(root) = state.assets_dir.as_deref() else {
        return not_found();
    };
    let Some(path) = asset_path(root, uri.path()) else {
        return not_found();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.to_string())],
                bytes,
            )
                .into_response()
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "asset not served");
            not_found()
        }
    }
}

/// Resolve a request path under the asset root, refusing anything that climbs out of it.
fn asset_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let relative = if relative.is_empty() {
        "index.html"
    } else {
        relative
    };

    let relative = Path::new(relative);
    if !relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(relative))
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn state(assets_dir: Option<PathBuf>) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            assets_dir: assets_dir.map(Arc::new),
        }
    }

    fn operational_app(state: AppState) -> Router {
        Router::new()
            .route("/api/health", get(api_health))
            .route("/ready", get(readiness_endpoint))
            .route("/metrics", get(metrics_endpoint))
            .fallback(asset_fallback)
            .layer(Extension(state))
    }

    async fn get_response(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response")
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    #[tokio::test]
    async fn api_health_matches_legacy_shape() {
        let response = get_response(operational_app(state(None)), "/api/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json");
        assert_eq!(body, json!({ "status": "ok", "message": "Health Check" }));
    }

    #[tokio::test]
    async fn readiness_tracks_flag() {
        let state = state(None);
        let flag = state.readiness.clone();
        let app = operational_app(state);

        let response = get_response(app.clone(), "/ready").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        flag.store(true, Ordering::Release);
        let response = get_response(app, "/ready").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_renders_text() {
        let response = get_response(operational_app(state(None)), "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn unmatched_paths_are_json_404_without_assets() {
        let response = get_response(operational_app(state(None)), "/").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Not Found"));
    }

    #[tokio::test]
    async fn serves_assets_with_guessed_content_type() {
        let root = std::env::temp_dir().join(format!("persona-quiz-assets-{}", std::process::id()));
        std::fs::create_dir_all(root.join("css")).expect("asset dir");
        std::fs::write(root.join("index.html"), "<h1>quiz</h1>").expect("index");
        std::fs::write(root.join("css/app.css"), "body{}").expect("css");
        let app = operational_app(state(Some(root.clone())));

        let response = get_response(app.clone(), "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert_eq!(body_text(response).await, "<h1>quiz</h1>");

        let response = get_response(app.clone(), "/css/app.css").await;
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");

        let response = get_response(app, "/missing.js").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn asset_paths_stay_under_root() {
        let root = Path::new("/srv/quiz");
        assert_eq!(
            asset_path(root, "/"),
            Some(PathBuf::from("/srv/quiz/index.html"))
        );
        assert_eq!(
            asset_path(root, "/js/app.js"),
            Some(PathBuf::from("/srv/quiz/js/app.js"))
        );
        assert_eq!(asset_path(root, "/../etc/passwd"), None);
        assert_eq!(asset_path(root, "/js/../../secret"), None);
    }
}
