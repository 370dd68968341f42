//! Leadgrid API server entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server_core::config::Config;
use server_core::domains::auth::JwtService;
use server_core::http;
use server_core::kernel::{ApifyPlatform, EmailListVerifyClient, ServerDeps};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Leadgrid Server");

    let config = Config::from_env()?;

    // Database setup
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    // External service clients, constructed once and shared
    let platform = Arc::new(ApifyPlatform::new(config.apify_api_token.clone()));
    let email_verifier = Arc::new(EmailListVerifyClient::new(
        config.email_list_verify_api_key.clone(),
    ));
    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));

    let deps = Arc::new(ServerDeps::new(
        pool,
        platform,
        email_verifier,
        jwt_service,
    ));

    let app = http::router(deps);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind server address")?;
    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}
