use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use mealmatch_shared::errors::AppResult;
use mealmatch_shared::middleware::AdminUser;
use mealmatch_shared::types::ApiResponse;

use crate::models::{DiningLocation, NewDiningLocation};
use crate::AppState;

// --- GET /locations ---

pub async fn list_locations(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<DiningLocation>>>> {
    let locations = state.store.list_locations()?;
    Ok(Json(ApiResponse::ok(locations)))
}

// --- POST /locations --- (admin)

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub location_type: String,
    #[validate(length(min = 1, max = 100))]
    pub campus_area: String,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    #[serde(default = "default_on_campus")]
    pub is_on_campus: bool,
}

fn default_on_campus() -> bool { true }

pub async fn create_location(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLocationRequest>,
) -> AppResult<Json<ApiResponse<DiningLocation>>> {
    req.validate()?;

    let location = state.store.create_location(NewDiningLocation {
        name: req.name,
        location_type: req.location_type,
        campus_area: req.campus_area,
        address: req.address,
        is_on_campus: req.is_on_campus,
    })?;

    tracing::info!(location_id = %location.id, admin_id = %admin.id, "dining location created");
    Ok(Json(ApiResponse::ok(location)))
}
