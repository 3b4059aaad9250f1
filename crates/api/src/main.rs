use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kontor_api::config::ServerConfig;
use kontor_api::mailer::{Mailer, MailerConfig};
use kontor_api::middleware::rate_limit::RateLimiter;
use kontor_api::router::build_app_router;
use kontor_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kontor_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = kontor_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    kontor_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    kontor_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus & progress hub ---
    let event_bus = Arc::new(kontor_events::EventBus::default());
    let progress_hub = Arc::new(kontor_events::ProgressHub::default());
    tracing::info!("Event bus created");

    // Spawn event persistence (writes all events to the app log).
    let persistence_handle = tokio::spawn(kontor_events::EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    // --- AI client ---
    let mut ai_config = kontor_ai::AiConfig::from_env();
    // An admin-stored model override (PUT /ai-config) wins over the env.
    match kontor_db::repositories::SettingRepo::get(
        &pool,
        kontor_db::models::setting::SETTING_AI_MODEL,
    )
    .await
    {
        Ok(Some(setting)) if !setting.value.is_empty() => {
            tracing::info!(model = %setting.value, "Applying stored AI model override");
            ai_config.model = setting.value;
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read AI model override"),
    }
    let ai = kontor_ai::AiClient::new(ai_config).expect("Failed to build AI client");
    tracing::info!(model = ai.model(), "AI client ready");

    // --- Mailer ---
    let mailer = Mailer::new(&MailerConfig::from_env()).expect("Failed to build SMTP transport");

    // --- Rate limiter ---
    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_per_minute));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        progress_hub,
        ai,
        mailer,
        rate_limiter,
        started_at: Instant::now(),
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

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Drop the event bus sender to close the broadcast channel. This
    // signals the persistence task to shut down; a running batch keeps
    // its database row authoritative and is re-claimable on restart.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), persistence_handle).await;
    tracing::info!("Event services shut down");

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
