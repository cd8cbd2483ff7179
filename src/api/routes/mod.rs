//! API routes module

pub mod modes;
pub mod sessions;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Conversation presets
        .nest("/modes", modes::router())
        // Session lifecycle and chat turns
        .nest("/sessions", sessions::router())
}
