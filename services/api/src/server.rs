use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState, InMemoryAccountRepository, StaticTokenVerifier};
use crate::routes::with_quiz_routes;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use persona_quiz::accounts::{SvixHeaderVerifier, UserSyncService};
use persona_quiz::config::AppConfig;
use persona_quiz::error::AppError;
use persona_quiz::quiz::{Dimension, QuizService};
use persona_quiz::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(load_catalog(&config.quiz)?);
    for dimension in Dimension::ordered() {
        debug!(
            axis = %dimension,
            questions = catalog.count_for(dimension),
            max_magnitude = catalog.max_axis_magnitude(dimension),
            confidence_ceiling = config.scoring.confidence_ceiling,
            "axis range"
        );
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        assets_dir: config.quiz.assets_dir.clone().map(Arc::new),
    };

    let repository = Arc::new(InMemoryAccountRepository::default());
    let verifier = StaticTokenVerifier::from_dev_tokens(&config.auth.dev_tokens);
    if verifier.is_empty() {
        warn!("no APP_DEV_TOKENS configured; authenticated quiz routes will reject every request");
    }
    let quiz_service = Arc::new(QuizService::new(
        catalog,
        config.scoring,
        repository.clone(),
        Arc::new(verifier),
    ));
    let sync_service = Arc::new(UserSyncService::new(
        repository,
        Arc::new(SvixHeaderVerifier),
    ));

    let app = with_quiz_routes(quiz_service, sync_service)
        .layer(cors_layer(&config.server.cors_origins))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "personality quiz service ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("personality quiz service stopped");
    Ok(())
}

pub(crate) fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received ctrl-c, shutting down"),
            Err(err) => {
                warn!(error = %err, "unable to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(err) => {
                warn!(error = %err, "unable to listen for terminate signal");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
