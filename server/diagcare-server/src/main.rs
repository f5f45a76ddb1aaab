use anyhow::Result;
use chrono::Utc;
use diagcare_server::{create_app, DiagcareServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let server = DiagcareServer::from_env();
    let bind_addr = server.config.bind_addr.clone();

    spawn_reaper(
        Arc::clone(&server.auth),
        server.config.reaper_interval_secs,
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, name = %server.config.name, "server listening");

    axum::serve(listener, create_app(server)).await?;
    Ok(())
}

/// Periodically drop expired sessions and idle attempt windows.
fn spawn_reaper(auth: Arc<auth_access::AuthService>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            ticker.tick().await;
            let now = Utc::now();
            match auth.sessions().purge_expired(now).await {
                Ok(removed) if removed > 0 => debug!(removed, "reaped expired sessions"),
                Ok(_) => {}
                Err(err) => warn!(%err, "session reaper pass failed"),
            }
            auth.purge_idle_attempts(now);
        }
    });
}
