use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use mealmatch_shared::errors::AppResult;
use mealmatch_shared::types::auth::AuthUser;
use mealmatch_shared::types::ApiResponse;

use crate::models::JoinRequest;
use crate::participation::{HostAction, JoinTransition};
use crate::services::join_requests;
use crate::AppState;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct JoinMessageRequest {
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

// --- POST /meals/:id/join ---

pub async fn request_to_join(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(meal_id): Path<Uuid>,
    Json(req): Json<JoinMessageRequest>,
) -> AppResult<Json<ApiResponse<JoinRequest>>> {
    req.validate()?;
    let request =
        join_requests::request_to_join(state.store.as_ref(), user.id, meal_id, req.message)?;
    Ok(Json(ApiResponse::ok(request)))
}

// --- PATCH /join-requests/:id ---

pub async fn edit_request(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<JoinMessageRequest>,
) -> AppResult<Json<ApiResponse<JoinRequest>>> {
    req.validate()?;
    let request = join_requests::edit_message(state.store.as_ref(), user.id, id, req.message)?;
    Ok(Json(ApiResponse::ok(request)))
}

// --- DELETE /join-requests/:id ---

pub async fn cancel_request(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    join_requests::cancel_request(state.store.as_ref(), user.id, id)?;
    Ok(Json(ApiResponse::ok_with_message((), "join request cancelled")))
}

// --- POST /join-requests/:id/{accept,decline,waitlist} --- (host)

fn decide(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    action: HostAction,
) -> AppResult<Json<ApiResponse<JoinTransition>>> {
    let transition = join_requests::decide(state.store.as_ref(), user.id, id, action)?;
    Ok(Json(ApiResponse::ok(transition)))
}

pub async fn accept_request(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<JoinTransition>>> {
    decide(&state, &user, id, HostAction::Accept)
}

pub async fn decline_request(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<JoinTransition>>> {
    decide(&state, &user, id, HostAction::Decline)
}

pub async fn waitlist_request(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<JoinTransition>>> {
    decide(&state, &user, id, HostAction::Waitlist)
}
