use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySubmissionStore};
use crate::routes::with_grading_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dual_risk_rating::config::AppConfig;
use dual_risk_rating::error::AppError;
use dual_risk_rating::rating::LoanGradingService;
use dual_risk_rating::telemetry;
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

    let model = config.rating.load_model()?;
    let store = Arc::new(InMemorySubmissionStore::default());
    let grading_service = Arc::new(LoanGradingService::new(store, model)?);

    let app = with_grading_routes(grading_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        custom_model = config.rating.model_path.is_some(),
        "dual risk rating service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
