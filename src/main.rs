use portal_guard::{
    AppState, HttpIdentityClient,
    config::{AppConfig, Env},
    create_router,
    identity::IdentityState,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point of the navigation service: configuration, logging, the identity client
/// and the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production settings)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portal_guard=debug,tower_http=info".into());

    // 3. Log format per environment: pretty locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!(
        "Navigation service starting in {:?} mode (mismatch policy: {:?})",
        config.env,
        config.mismatch_policy
    );

    // 4. Identity client for the backend's /auth/me endpoint.
    let client = HttpIdentityClient::new(&config.api_base_url, config.identity_timeout)
        .expect("FATAL: Failed to build the identity HTTP client.");
    tracing::info!("Identity endpoint: {}", client.endpoint());
    if config.identity_timeout.is_none() {
        tracing::warn!("IDENTITY_TIMEOUT_SECS not set; a stalled backend stalls navigations");
    }
    let identity = Arc::new(client) as IdentityState;

    // 5. State, router and server.
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(config, identity));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the listen address. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
