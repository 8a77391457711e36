use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{User, UserRole};
use crate::utils::response::AppError;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
}

/// Extract the api key from an `Authorization: TOKEN <api_key>` header.
fn parse_token(header: &str) -> Option<&str> {
    let (scheme, api_key) = header.split_once(' ')?;
    if scheme == "TOKEN" && !api_key.is_empty() {
        Some(api_key)
    } else {
        None
    }
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let api_key = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_token)
        .ok_or_else(|| AppError::unauthorized("invalid token format"))?;

    let user: Option<User> = sqlx::query_as(
        "SELECT id, name, role, api_key, created_at FROM users WHERE api_key = $1",
    )
    .bind(api_key)
    .fetch_optional(&state.db.pool)
    .await
    .map_err(|e| {
        tracing::error!("auth lookup failed: {}", e);
        AppError::internal("internal error")
    })?;

    let user = user.ok_or_else(|| AppError::unauthorized("unknown token"))?;
    request.extensions_mut().insert(AuthUser {
        id: user.id,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Layered after `auth_middleware` on admin routes.
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.role == UserRole::Admin => Ok(next.run(request).await),
        Some(_) => Err(AppError::forbidden("admin privileges required")),
        None => Err(AppError::unauthorized("authentication required")),
    }
}
