//! Request handlers.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStatus {
    pub user_id: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub user_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub roles: HashMap<String, bool>,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn admin_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<AdminStatus> {
    let is_admin = state.roles.is_admin(Some(&user_id)).await;
    Json(AdminStatus { user_id, is_admin })
}

pub async fn admin_statuses(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Json<BatchResponse> {
    let roles = state.roles.is_admin_batch(&request.user_ids).await;
    Json(BatchResponse { roles })
}

pub async fn clear_cache(State(state): State<AppState>) -> StatusCode {
    state.roles.invalidate_all();
    StatusCode::NO_CONTENT
}
