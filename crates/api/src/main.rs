use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zawadi_ledger::{FeedbackIntake, InMemoryRateLimitStore, RewardLedger, WebhookReconciler};
use zawadi_telco::{TelcoClient, TelcoConfig};

use zawadi_api::config::ServerConfig;
use zawadi_api::router::build_app_router;
use zawadi_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zawadi_api=debug,zawadi_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    if config.admin_api_token.is_none() {
        tracing::warn!("ADMIN_API_TOKEN not set; admin routes will reject every request");
    }

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = zawadi_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    zawadi_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    zawadi_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Telecom gateway ---
    let telco_config = TelcoConfig::from_env().expect("Invalid telecom gateway configuration");
    let telco = Arc::new(TelcoClient::new(telco_config));
    tracing::info!("Telecom gateway client created");

    // --- Services ---
    let ledger = Arc::new(RewardLedger::new(pool.clone(), telco));
    let rate_limits = Arc::new(InMemoryRateLimitStore::new());
    let intake = Arc::new(FeedbackIntake::new(
        pool.clone(),
        Arc::clone(&ledger),
        rate_limits,
    ));
    let reconciler = Arc::new(WebhookReconciler::new(pool.clone()));
    tracing::info!("Reward services started (ledger, intake, reconciler)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ledger,
        intake,
        reconciler,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
