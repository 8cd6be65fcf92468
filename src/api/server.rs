use super::cli::ServeArgs;
use super::infra::AppState;
use super::routes::with_lottery_routes;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::telemetry;
use crate::workflows::lottery::{LotteryEngine, LotteryService};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = LotteryEngine::from_config(&config.lottery);
    let service = Arc::new(LotteryService::new(engine));

    let app = with_lottery_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        winner_policy = ?config.lottery.winner_policy,
        reservation_policy = ?config.lottery.reservation_policy,
        "parking lottery service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
