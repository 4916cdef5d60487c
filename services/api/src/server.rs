use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRecordSource};
use crate::routes::with_screening_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use record_screen::config::AppConfig;
use record_screen::error::AppError;
use record_screen::screening::{RuleSet, ScreeningEngine};
use record_screen::telemetry;
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

    let rules = RuleSet::load(
        &config.screening.rules_path,
        config.screening.tier_table_path.as_deref(),
    )?;
    let engine = Arc::new(ScreeningEngine::new(rules));
    let source = Arc::new(InMemoryRecordSource::seeded()?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_screening_routes(engine, source)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        rules = %config.screening.rules_path.display(),
        "record screening service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
