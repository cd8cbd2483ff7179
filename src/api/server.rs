use std::sync::{Arc, RwLock};

use anyhow::Result;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::ai::conversation::Conversation;
use crate::api::state::AppState;
use crate::core::{AppConfig, logging};
use crate::gemini::GeminiClient;

pub fn app(shared_state: Arc<RwLock<AppState>>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        // API routes
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    logging::init(&logging::server_directives());

    let client = GeminiClient::from_config(&config)?;
    tracing::info!("Using models {:?}", client.models());

    let conversation = Conversation::new(Arc::new(client)).threshold(config.turn_threshold);
    let shared_state = Arc::new(RwLock::new(AppState::new(conversation)));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
