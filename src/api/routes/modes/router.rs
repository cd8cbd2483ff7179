//! Router for the modes API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, routing::get};

use super::public::{ModeSummary, ModesResponse};
use crate::ai::conversation::PRESETS;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// List the conversation modes a session can be started with
async fn modes_list() -> Json<ModesResponse> {
    let modes = PRESETS
        .iter()
        .map(|preset| ModeSummary {
            id: preset.mode,
            name: preset.name.to_string(),
            welcome: preset.welcome.to_string(),
        })
        .collect();

    Json(ModesResponse { modes })
}

/// Create the modes router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(modes_list))
}
