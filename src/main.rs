use storepulse::application::handlers::router;
use storepulse::application::refresh::run_refresh_loop;
use storepulse::application::session::DashboardSession;
use storepulse::config::AnalyticsConfig;
use storepulse::domain::entities::alert::Alert;
use storepulse::domain::entities::sale::SaleEvent;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Missing .env is fine; real deployments set the environment directly.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storepulse=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AnalyticsConfig::from_env();
    info!("Storepulse analytics starting...");
    info!(
        "Alert thresholds: low sales < {}, low margin < {:.1}% (critical < {:.1}%)",
        config.alert_thresholds.low_sales_threshold,
        config.alert_thresholds.low_margin_threshold,
        config.alert_thresholds.critical_margin_threshold
    );

    let mut session = DashboardSession::with_system_clock(&config);
    session.add_listener(|sale: &SaleEvent| {
        info!(
            "Sale {} recorded: {:.2} ({} items)",
            sale.id,
            sale.total,
            sale.items.len()
        );
    });
    session.add_alert_listener(|alerts: &[Alert]| {
        for alert in alerts {
            debug!("Alert active after sale: {} ({:?})", alert.id, alert.severity);
        }
    });
    let session = session.into_shared();

    let refresh_session = session.clone();
    let refresh_every = config.refresh_interval;
    tokio::spawn(async move {
        run_refresh_loop(refresh_session, refresh_every).await;
    });

    let app = router(session, config.max_request_body_bytes);

    info!("Listening on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    let server = axum::serve(listener, app);

    let shutdown_signal = async {
        let ctrl_c = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("Received SIGTERM signal");
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };

    info!("Server started successfully. Press Ctrl+C to stop.");
    server.with_graceful_shutdown(shutdown_signal).await?;

    info!("Session ended, recorded sales discarded");
    Ok(())
}
