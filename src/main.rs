//! Gatehouse Server — Facility Visitor Check-In Platform
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::types::facility_time::FacilityClock;

#[tokio::main]
async fn main() {
    let env = std::env::var("GATEHOUSE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Gatehouse v{}", env!("CARGO_PKG_VERSION"));

    let clock = FacilityClock::from_offset_hours(config.checkin.facility_utc_offset_hours);

    // ── Step 1: Database connection + migrations ─────────────────
    let db_pool = gatehouse_database::connection::create_pool(&config.database).await?;
    gatehouse_database::migration::run_migrations(&db_pool).await?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let visitor_repo = Arc::new(
        gatehouse_database::repositories::visitor::VisitorRepository::new(db_pool.clone()),
    );
    let invite_repo = Arc::new(gatehouse_database::repositories::invite::InviteRepository::new(
        db_pool.clone(),
    ));
    let feedback_repo = Arc::new(
        gatehouse_database::repositories::feedback::FeedbackRepository::new(db_pool.clone()),
    );
    let activity_repo = Arc::new(
        gatehouse_database::repositories::activity::ActivityRepository::new(db_pool.clone()),
    );
    let job_repo = Arc::new(gatehouse_database::repositories::job::JobRepository::new(
        db_pool.clone(),
    ));

    // ── Step 3: External collaborators ───────────────────────────
    let matcher: Arc<dyn gatehouse_core::traits::matcher::FaceMatcher> =
        Arc::new(gatehouse_service::matcher::HttpFaceMatcher::new(&config.checkin)?);
    let notifier: Arc<dyn gatehouse_core::traits::notifier::NotificationGateway> = Arc::new(
        gatehouse_service::notify::RelayNotificationGateway::new(&config.notifications)?,
    );

    // ── Step 4: Realtime fan-out ─────────────────────────────────
    let registry = Arc::new(gatehouse_realtime::ConnectionRegistry::new());
    let transport: Arc<dyn gatehouse_core::traits::transport::CardTransport> =
        Arc::new(gatehouse_realtime::WsCardTransport::new(Arc::clone(&registry)));
    let dispatcher =
        gatehouse_realtime::BroadcastDispatcher::new(Arc::clone(&registry), transport);
    tracing::info!("Realtime fan-out initialized");

    // ── Step 5: Services ─────────────────────────────────────────
    let ledger: Arc<dyn gatehouse_database::ledger::InviteLedger> = invite_repo;
    let tasks: Arc<dyn gatehouse_database::queue::TaskQueue> = job_repo.clone();

    let checkin_service = Arc::new(gatehouse_service::checkin::CheckInService::new(
        Arc::clone(&ledger),
        Arc::clone(&notifier),
        dispatcher.clone(),
        Arc::clone(&tasks),
        clock,
        config.worker.max_attempts,
    ));
    let invite_service = Arc::new(gatehouse_service::invite::InviteService::new(
        Arc::clone(&ledger),
        Arc::clone(&notifier),
        clock,
    ));
    let registration_service = Arc::new(gatehouse_service::registration::RegistrationService::new(
        Arc::clone(&visitor_repo),
        Arc::clone(&matcher),
    ));
    let token_signer = gatehouse_service::feedback::FeedbackTokenSigner::new(
        &config.notifications.feedback_token_secret,
        config.notifications.feedback_token_ttl_hours,
    );
    let feedback_service = Arc::new(gatehouse_service::feedback::FeedbackService::new(
        Arc::clone(&feedback_repo),
        token_signer,
        dispatcher.clone(),
        clock,
        config.notifications.feedback_link_base_url.clone(),
    ));
    let stats_service = Arc::new(gatehouse_service::stats::StatsService::new(
        Arc::clone(&ledger),
        Arc::clone(&visitor_repo),
        Arc::clone(&activity_repo),
        Arc::clone(&feedback_repo),
        dispatcher.clone(),
        clock,
        config.realtime.heartbeat_active_window_seconds,
    ));
    tracing::info!("Services initialized");

    // ── Step 6: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 7: Background worker ────────────────────────────────
    let worker_handle = if config.worker.enabled {
        let mut executor = gatehouse_worker::JobExecutor::new();
        executor.register(Arc::new(
            gatehouse_worker::jobs::feedback::FeedbackInvitationHandler::new(
                Arc::clone(&feedback_service),
                Arc::clone(&notifier),
            ),
        ));
        executor.register(Arc::new(
            gatehouse_worker::jobs::prune::RegistryPruneHandler::new(Arc::clone(&registry)),
        ));
        executor.register(Arc::new(
            gatehouse_worker::jobs::cleanup::RetentionCleanupHandler::new(
                Arc::clone(&activity_repo),
                Arc::clone(&job_repo),
                config.realtime.activity_retention_hours,
            ),
        ));

        let runner = gatehouse_worker::WorkerRunner::new(
            Arc::clone(&job_repo),
            Arc::new(executor),
            config.worker.clone(),
        );

        let scheduler = gatehouse_worker::PeriodicScheduler::new(
            Arc::clone(&tasks),
            vec![
                gatehouse_worker::scheduler::PeriodicTask {
                    job_type: "registry_prune".to_string(),
                    payload: serde_json::json!({}),
                    every: std::time::Duration::from_secs(60),
                },
                gatehouse_worker::scheduler::PeriodicTask {
                    job_type: "retention_cleanup".to_string(),
                    payload: serde_json::json!({}),
                    every: std::time::Duration::from_secs(3600),
                },
            ],
        );

        let runner_cancel = shutdown_rx.clone();
        let scheduler_cancel = shutdown_rx.clone();
        tokio::spawn(scheduler.run(scheduler_cancel));
        let handle = tokio::spawn(async move {
            runner.run(runner_cancel).await;
        });

        tracing::info!("Background worker started");
        Some(handle)
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── Step 8: Build and start HTTP server ──────────────────────
    let app_state = gatehouse_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool: db_pool.clone(),
        clock,
        registry: Arc::clone(&registry),
        dispatcher,
        checkin: checkin_service,
        invites: invite_service,
        registration: registration_service,
        feedback: feedback_service,
        stats: stats_service,
    };

    let app = gatehouse_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Gatehouse server listening on {}", addr);

    // ── Step 9: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    if let Some(handle) = worker_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }

    tracing::info!("Gatehouse server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
