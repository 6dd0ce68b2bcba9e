//! API server for the CMMC company directory
//!
//! REST surface over the core stores: subscription-gated directory
//! search, company registration and updates, and the NAICS taxonomy.

mod identity;
mod notify;
mod routes;
mod state;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::notify::LogNotifier;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://cmmc-directory.db".to_string());
    tracing::info!("Using database: {}", database_url);

    let pool = cmmc_core::db::connect(&database_url)
        .await
        .expect("Failed to initialize database");

    let app_state = AppState::new(pool, Arc::new(LogNotifier));

    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::directory::router())
        .merge(routes::companies::router())
        .merge(routes::naics::router())
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8081);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app)
        .await
        .expect("Server error");
}
