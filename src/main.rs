//! Campus Support Backend
//! Mission: Student support services behind one JWT-guarded API

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_support_backend::{
    auth::JwtHandler,
    complaints::ComplaintStore,
    config::Config,
    db::Database,
    events::EventStore,
    lostfound::LostFoundStore,
    routes::{create_router, AppState},
    uploads::UploadStore,
    users::UserStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    let _ = dotenv();
    init_tracing();

    info!("🚀 Campus Support API starting");

    let config = Config::from_env();

    let db = Database::new(&config.db_path)?;
    let uploads = UploadStore::new(config.upload_dir.clone())
        .map_err(|e| anyhow::anyhow!("Failed to prepare upload dir: {:?}", e))?;

    let state = AppState {
        users: UserStore::new(&db),
        complaints: ComplaintStore::new(&db),
        lostfound: LostFoundStore::new(&db),
        events: EventStore::new(&db),
        jwt: Arc::new(JwtHandler::new(config.jwt_secret.clone())),
        uploads,
    };

    info!("🔐 Authentication initialized");

    let app = create_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing from RUST_LOG with a sane default filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_support_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
