use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryStore, LoggingMailTransport};
use crate::routes::with_donation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bdas::config::AppConfig;
use bdas::error::AppError;
use bdas::telemetry;
use bdas::workflows::donation::{load_roster, DonationService};
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

    let donors = match args.roster.take() {
        Some(path) => {
            let donors = load_roster(&path)?;
            info!(roster = %path.display(), donors = donors.len(), "donor roster loaded");
            donors
        }
        None => Vec::new(),
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryStore::seeded(donors));
    let donation_service = Arc::new(DonationService::new(
        store.clone(),
        store,
        Arc::new(LoggingMailTransport),
        config.eligibility.clone(),
        config.dispatch.clone(),
    ));

    let app = with_donation_routes(donation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        dispatch_concurrency = config.dispatch.max_concurrency,
        "blood donation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
