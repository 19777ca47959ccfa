use std::sync::{Arc, Mutex};
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use shearbook::config::AppConfig;
use shearbook::db;
use shearbook::router::build_router;
use shearbook::services::auth;
use shearbook::services::availability::AvailabilityCache;
use shearbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let password_hash = auth::hash_password(&config.admin_password)?;
    let seeded = db::queries::accounts::seed_admin(
        &conn,
        &Uuid::new_v4().to_string(),
        &config.admin_email,
        &password_hash,
    )?;
    if seeded {
        tracing::info!(email = %config.admin_email, "seeded central admin account");
    }

    let cache_ttl = Duration::from_secs(config.availability_cache_ttl_secs);
    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        availability_cache: AvailabilityCache::new(cache_ttl),
    });

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
