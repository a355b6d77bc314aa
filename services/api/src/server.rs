use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRecordRepository, JsonFileRepository};
use crate::routes::with_scorecard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kpi_tracker::config::AppConfig;
use kpi_tracker::error::AppError;
use kpi_tracker::scorecard::{RecordRepository, ScorecardService};
use kpi_tracker::telemetry;
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
    if let Some(data_file) = args.data_file.take() {
        config.storage.data_file = data_file;
    }

    telemetry::init(&config.telemetry)?;

    let file_repository = JsonFileRepository::new(&config.storage.data_file);
    if args.in_memory {
        let seeded = InMemoryRecordRepository::seeded(file_repository.load_all()?);
        info!(path = %file_repository.path().display(), "serving records in memory");
        serve(config, Arc::new(seeded)).await
    } else {
        info!(path = %file_repository.path().display(), "serving records from file");
        serve(config, Arc::new(file_repository)).await
    }
}

async fn serve<R>(config: AppConfig, repository: Arc<R>) -> Result<(), AppError>
where
    R: RecordRepository + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let scorecard_service = Arc::new(ScorecardService::load(repository)?);

    let app = with_scorecard_routes(scorecard_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(environment = %config.environment, %addr, "kpi scorecard service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
