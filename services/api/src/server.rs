use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryLeadRepository, InMemoryNotificationPublisher, InMemoryRosterRepository,
};
use crate::routes::with_lead_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dealer_crm::config::AppConfig;
use dealer_crm::error::AppError;
use dealer_crm::telemetry;
use dealer_crm::workflows::leads::router::PENDING_RETRY_BATCH;
use dealer_crm::workflows::leads::{
    LeadDeskService, LeadRepository, NotificationPublisher, RosterRepository,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let lead_desk = Arc::new(LeadDeskService::new(
        Arc::new(InMemoryLeadRepository::default()),
        Arc::new(InMemoryRosterRepository::default()),
        Arc::new(InMemoryNotificationPublisher::default()),
        config.balancer,
    ));

    if args.retry_interval_secs > 0 {
        spawn_pending_sweep(
            lead_desk.clone(),
            Duration::from_secs(args.retry_interval_secs),
        );
    }

    let app = with_lead_routes(lead_desk)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        imbalance_threshold = config.balancer.imbalance_threshold,
        "lead desk ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_pending_sweep<L, R, N>(service: Arc<LeadDeskService<L, R, N>>, every: Duration)
where
    L: LeadRepository + 'static,
    R: RosterRepository + 'static,
    N: NotificationPublisher + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(err) = service.retry_pending(PENDING_RETRY_BATCH) {
                warn!(error = %err, "pending lead sweep failed");
            }
        }
    });
}
