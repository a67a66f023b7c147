use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use speechops_core::models::{LoginRequest, LoginResponse, MessageResponse};
use speechops_core::AppError;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing username or password", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    // Missing fields are a 400, bad credentials a 401
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::InvalidInput("Username and password are required".to_string()).into());
    }

    match state.auth.authenticate(&body.username, &body.password)? {
        Some(response) => {
            tracing::info!(username = %response.username, "Operator logged in");
            Ok(Json(response))
        }
        None => Err(AppError::Unauthorized("Invalid username or password".to_string()).into()),
    }
}

/// Tokens are not revocable server-side; this is a stateless acknowledgment
/// and the client discards its token.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Acknowledged", body = MessageResponse)
    )
)]
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out".to_string(),
    })
}
