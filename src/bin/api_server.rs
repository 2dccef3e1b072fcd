// API Server Binary Entry Point
//
// Purpose: Start the crop recommendation inference service
// Usage: cargo run --bin api_server

use crop_recommender::{create_router, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Default log level: info for our crate, warn for others
                "crop_recommender=info,tower_http=debug,axum=debug,warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Crop Recommendation ML Service...");

    // Configuration from environment variables
    let model_path = std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| "model/crop_model.json".to_string());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5001);

    tracing::info!("Configuration:");
    tracing::info!("  MODEL_PATH: {}", model_path);
    tracing::info!("  PORT: {}", port);

    // Load the model on startup. A missing artifact is not fatal: the
    // service starts anyway and predictions return 503 until /reload
    // succeeds.
    let state = AppState::new(&model_path);
    if let Err(e) = state.model.reload() {
        tracing::warn!("Model not loaded ({:#}). Service will start but predictions will fail.", e);
    }

    // Create router with all endpoints and middleware
    let app = create_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
