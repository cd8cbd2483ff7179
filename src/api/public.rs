//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::ai::conversation::ConversationError;

// Errors

pub struct ApiError(anyhow::Error);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<ConversationError>() {
            Some(ConversationError::UnknownMode(_)) | Some(ConversationError::EmptyInput) => {
                StatusCode::BAD_REQUEST
            }
            Some(ConversationError::AlreadyStarted)
            | Some(ConversationError::NotStarted)
            | Some(ConversationError::Finished)
            | Some(ConversationError::NotFinished) => StatusCode::CONFLICT,
            Some(ConversationError::Parse(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Some(ConversationError::Service(_)) => StatusCode::BAD_GATEWAY,
            Some(ConversationError::Template(_)) | None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Always log the error
        if status.is_server_error() {
            tracing::error!("{:?}", self.0);
        } else {
            tracing::warn!("{}", self.0);
        }

        // Expected errors go back as is so the presentation layer can
        // show them inline
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            format!("Something went wrong: {}", self.0)
        } else {
            self.0.to_string()
        };

        (status, body).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod modes {
    pub use crate::api::routes::modes::public::*;
}

pub mod sessions {
    pub use crate::api::routes::sessions::public::*;
}
