use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use auth::AuthConfig;
use common::{UuidV4Generator, env::env_or};
use database::PGConfig;
use dotenv::dotenv;
use gateway::{AppState, AuthHandler, HTTP_PORT, SERVICE_NAME, ShopHandler, router};
use oauth::OidcClient;
use setup::tracing::init_tracer;
use shop::{LogNotifier, NotificationDispatcher, NotifyConfig, PostgresDBClient};
use tokio::net::TcpListener;
use tracing::{info, warn};

const NOTIFICATION_DRAIN_DEADLINE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let telemetry = init_tracer(SERVICE_NAME)?;

    let pg_config = PGConfig::from_env()?;
    info!(db = %pg_config.target(), "connecting to database");
    let pool = database::connect(&pg_config)?;
    shop::run_migrations(&pool).await?;

    let auth_config = AuthConfig::from_env();
    let provider = OidcClient::discover(auth_config.provider.clone()).await?;
    let auth = AuthHandler::new(Arc::new(provider), auth_config);

    let (notifications, worker) = NotificationDispatcher::spawn(LogNotifier, NotifyConfig::from_env());
    let shop = ShopHandler::new(
        PostgresDBClient::new(pool.clone()),
        UuidV4Generator,
        notifications,
    );

    let app = router(AppState::new(auth, shop));

    let port = env_or("HTTP_PORT", &HTTP_PORT.to_string()).parse::<u16>()?;
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last dispatcher, so the queue is closed now.
    worker.drain(NOTIFICATION_DRAIN_DEADLINE).await;
    pool.close();
    info!("shut down");

    telemetry.shutdown()?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
