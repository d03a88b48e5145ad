use std::net::SocketAddr;

use fitflow_server::auth::rate_limit::IDLE_WINDOW_TTL;
use fitflow_server::services::accounts;
use fitflow_server::{AppState, Config, api, logger};
use shared::error::AppError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    logger::init_logger(!config.is_development(), config.log_dir.as_deref())
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Starting fitflow-server {} (env: {}, renewal: {:?})",
        env!("CARGO_PKG_VERSION"),
        config.environment,
        config.renewal_policy
    );

    let state = AppState::new(config).await?;

    if let (Some(email), Some(password)) = (
        state.config.admin_email.as_deref(),
        state.config.admin_password.as_deref(),
    ) {
        let now = shared::util::now_millis();
        if accounts::bootstrap_admin(&state.pool, email, password, now)
            .await
            .map_err(AppError::from)?
            .is_none()
        {
            tracing::debug!("Admin account already present, skipping bootstrap");
        }
    }

    // Drop idle rate-limit windows
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(IDLE_WINDOW_TTL);
        loop {
            interval.tick().await;
            rate_limiter.prune(IDLE_WINDOW_TTL).await;
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.http_port));
    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("fitflow-server listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("fitflow-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
