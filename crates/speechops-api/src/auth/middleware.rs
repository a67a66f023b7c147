//! Session guard
//!
//! Bearer-token middleware applied to every proxy route. Rejection happens
//! here, before any handler or upstream call runs. On success the decoded
//! session context is inserted into request extensions for handlers and
//! extractors.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use speechops_core::AppError;
use std::sync::Arc;

use crate::auth::models::SessionContext;
use crate::error::HttpAppError;
use crate::state::AppState;

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) => token,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Invalid authorization header format".to_string(),
            ))
            .into_response();
        }
    };

    let claims = match state.auth.validate_token(token) {
        Ok(claims) => claims,
        Err(err) => return HttpAppError(err).into_response(),
    };

    request.extensions_mut().insert(SessionContext {
        username: claims.sub,
        roles: claims.roles,
        token_id: claims.jti,
    });
    next.run(request).await
}
