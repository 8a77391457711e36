//! Authenticated account endpoints.

use axum::{extract::State, Extension, Json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::models::Balance;
use crate::utils::response::AppError;
use crate::AppState;

/// GET /balance
///
/// Flat `ticker -> amount` mapping for the caller.
pub async fn get_balances(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<HashMap<String, i64>>, AppError> {
    let rows: Vec<Balance> = sqlx::query_as(
        "SELECT user_id, ticker, amount, updated_at FROM balances WHERE user_id = $1",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db.pool)
    .await
    .map_err(|e| {
        tracing::error!("failed to fetch balances: {}", e);
        AppError::internal("internal error")
    })?;

    Ok(Json(
        rows.into_iter()
            .map(|balance| (balance.ticker, balance.amount))
            .collect(),
    ))
}
