use crate::cli::ServeArgs;
use crate::infra::{AppState, TokenDigestAuthorizer};
use crate::routes::with_triage_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mangrove_watch::config::{AppConfig, ConfigError};
use mangrove_watch::error::AppError;
use mangrove_watch::telemetry;
use mangrove_watch::triage::{JsonFileStore, TriageController, TriageRouterState};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let snapshots = Arc::new(JsonFileStore::open(&config.storage.data_dir)?);
    let controller = Arc::new(TriageController::load(
        snapshots,
        config.triage.policy(),
    )?);

    let authorizer =
        TokenDigestAuthorizer::from_hex(config.triage.moderator_token_digest.as_deref())
            .map_err(|_| ConfigError::InvalidModeratorDigest)?;
    if !authorizer.is_enabled() {
        warn!("APP_MODERATOR_TOKEN_BLAKE3 unset; moderation endpoints will reject every request");
    }

    let triage_state = TriageRouterState {
        controller,
        authorizer: Arc::new(authorizer),
        leaderboard_limit: config.triage.leaderboard_limit,
    };

    let app = with_triage_routes(triage_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.storage.data_dir.display(),
        "mangrove watch triage service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
