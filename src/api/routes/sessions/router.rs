//! Router for the sessions API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use super::public;
use crate::ai::conversation::{Conversation, Mode, SessionState};
use crate::api::public::ApiError;
use crate::api::state::{AppState, StoredSession};

type SharedState = Arc<RwLock<AppState>>;

fn not_found(id: &str) -> axum::response::Response {
    (StatusCode::NOT_FOUND, format!("Session {} not found", id)).into_response()
}

fn conflict(id: &str) -> axum::response::Response {
    (
        StatusCode::CONFLICT,
        format!("Session {} changed while the request was in progress", id),
    )
        .into_response()
}

/// Clones the session out of the shared state so the lock isn't held
/// while waiting on the generation service.
fn checkout(state: &SharedState, id: &str) -> Option<(Arc<Conversation>, StoredSession)> {
    let shared_state = state.read().expect("Unable to read share state");
    let stored = shared_state.sessions.get(id)?.clone();
    Some((Arc::clone(&shared_state.conversation), stored))
}

enum Checkin {
    Saved,
    Missing,
    Stale,
}

/// Writes the session back only if nothing else wrote to it since
/// `revision` was checked out.
fn checkin(state: &SharedState, id: &str, revision: u64, session: SessionState) -> Checkin {
    let mut shared_state = state.write().expect("Unable to write share state");
    match shared_state.sessions.get_mut(id) {
        Some(stored) if stored.revision == revision => {
            stored.replace(session);
            Checkin::Saved
        }
        Some(stored) => {
            tracing::warn!(
                "Dropping stale write to session {} (revision {} != {})",
                id,
                revision,
                stored.revision
            );
            Checkin::Stale
        }
        None => Checkin::Missing,
    }
}

/// Create a session and start it in the requested mode
async fn session_create(
    State(state): State<SharedState>,
    Json(payload): Json<public::CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mode = payload.mode.parse::<Mode>()?;
    let id = Uuid::new_v4().to_string();
    let mut session = SessionState::new();

    let mut shared_state = state.write().expect("Unable to write share state");
    shared_state.conversation.start(&mut session, mode)?;
    let resp = public::SessionResponse::new(&id, &session);
    shared_state
        .sessions
        .insert(id.clone(), StoredSession::new(session));
    tracing::info!("Created session {} in mode {}", id, mode);

    Ok((StatusCode::CREATED, Json(resp)))
}

/// Get a single session by ID
async fn session_get(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let shared_state = state.read().expect("Unable to read share state");
    match shared_state.sessions.get(&id) {
        Some(stored) => Ok(Json(public::SessionResponse::new(&id, &stored.state)).into_response()),
        None => Ok(not_found(&id)),
    }
}

/// Submit the next user message and return the reply
async fn session_message(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::MessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some((conversation, stored)) = checkout(&state, &id) else {
        return Ok(not_found(&id));
    };

    let mut session = stored.state;
    let reply = conversation.submit(&mut session, &payload.message).await?;
    let resp = public::MessageResponse {
        reply,
        session: public::SessionResponse::new(&id, &session),
    };

    match checkin(&state, &id, stored.revision, session) {
        Checkin::Saved => Ok(Json(resp).into_response()),
        Checkin::Missing => Ok(not_found(&id)),
        Checkin::Stale => Ok(conflict(&id)),
    }
}

/// Summarize a finished session into a style brief
async fn session_brief(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let Some((conversation, stored)) = checkout(&state, &id) else {
        return Ok(not_found(&id));
    };

    let brief = conversation.extract_brief(&stored.state).await?;
    let html = conversation.render_brief_html(&brief)?;
    let text = brief.to_text();

    Ok(Json(public::BriefResponse {
        fields: brief.fields,
        html,
        text,
    })
    .into_response())
}

/// Reset a session back to its initial state. The ID stays valid and
/// a new mode can be chosen with `POST /{id}/start`.
async fn session_reset(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let mut shared_state = state.write().expect("Unable to write share state");
    match shared_state.sessions.get_mut(&id) {
        Some(stored) => {
            stored.replace(SessionState::default());
            Ok(Json(public::SessionResponse::new(&id, &stored.state)).into_response())
        }
        None => Ok(not_found(&id)),
    }
}

/// Start a reset session in a (possibly different) mode
async fn session_start(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::CreateSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut shared_state = state.write().expect("Unable to write share state");
    let conversation = Arc::clone(&shared_state.conversation);
    let Some(stored) = shared_state.sessions.get_mut(&id) else {
        return Ok(not_found(&id));
    };

    let mut session = stored.state.clone();
    conversation.start_named(&mut session, &payload.mode)?;
    stored.replace(session);
    Ok(Json(public::SessionResponse::new(&id, &stored.state)).into_response())
}

/// Drop a session entirely
async fn session_delete(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut shared_state = state.write().expect("Unable to write share state");
    match shared_state.sessions.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(&id),
    }
}

/// Create the sessions router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(session_create))
        .route("/{id}", get(session_get).delete(session_delete))
        .route("/{id}/messages", post(session_message))
        .route("/{id}/brief", post(session_brief))
        .route("/{id}/reset", post(session_reset))
        .route("/{id}/start", post(session_start))
}
