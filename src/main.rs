//! Blog Backend
//! Mission: Serve the blog API with cookie sessions and owner-or-admin rules

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use blog_backend::{config::load_env, create_router, AppConfig, AppState, Database};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "blog-backend")]
#[command(about = "Blog API server")]
struct Cli {
    #[command(flatten)]
    config: AppConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Cli::parse().config.finalize()?;

    info!("🚀 Starting blog backend ({:?})", config.app_env);

    let db = Database::open(&config.db_path)?;
    let state = AppState::new(&db, &config);

    // First start: seed an admin so the moderation endpoints are reachable
    match config.default_admin_password() {
        Some(password) => {
            state
                .users()
                .ensure_default_admin(&config.admin_email, password)
                .context("Failed to create default admin")?;
        }
        None => warn!("⚠️  ADMIN_PASSWORD not set, skipping default admin bootstrap"),
    }

    let origin = HeaderValue::from_str(&config.cors_origin)
        .with_context(|| format!("Invalid CORS_ORIGIN: {}", config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
