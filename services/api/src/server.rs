use crate::cli::ServeArgs;
use crate::infra::{AppState, StubBackend};
use crate::routes::with_stub_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use facescan_enroll::config::AppConfig;
use facescan_enroll::error::AppError;
use facescan_enroll::telemetry;
use std::sync::atomic::Ordering;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let stub = StubBackend::new(config.backend.device_key.as_str());
    let app = with_stub_routes(stub)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "stub enrollment backend ready");

    axum::serve(listener, app).await?;
    Ok(())
}
