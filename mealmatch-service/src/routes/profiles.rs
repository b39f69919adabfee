use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use mealmatch_shared::errors::AppResult;
use mealmatch_shared::types::auth::AuthUser;
use mealmatch_shared::types::ApiResponse;

use crate::models::{
    DietaryPreference, Interest, MealTime, NewProfile, Profile, SocialBattery, SpiceTolerance,
    UpdateProfile, Vibe,
};
use crate::services::profiles::{self, ProfileDetail};
use crate::AppState;

// --- GET /profile ---

pub async fn get_my_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ProfileDetail>>> {
    let detail = profiles::my_profile(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(detail)))
}

// --- POST /profile ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    #[validate(length(max = 100))]
    pub major: Option<String>,
    pub class_year: Option<i32>,
    pub bio: Option<String>,
    pub preferred_location_id: Option<Uuid>,
    #[serde(default)]
    pub dietary_preference: DietaryPreference,
    #[serde(default)]
    pub usual_meal_time: MealTime,
    #[serde(default)]
    pub vibe: Vibe,
    #[serde(default)]
    pub social_battery: SocialBattery,
    #[serde(default)]
    pub interest: Interest,
    #[serde(default)]
    pub spice_tolerance: SpiceTolerance,
}

impl CreateProfileRequest {
    fn into_new(self, account_id: Uuid) -> NewProfile {
        NewProfile {
            account_id,
            display_name: self.display_name,
            major: self.major,
            class_year: self.class_year,
            bio: self.bio,
            preferred_location_id: self.preferred_location_id,
            dietary_preference: self.dietary_preference,
            usual_meal_time: self.usual_meal_time,
            vibe: self.vibe,
            social_battery: self.social_battery,
            interest: self.interest,
            spice_tolerance: self.spice_tolerance,
        }
    }
}

pub async fn create_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProfileRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    req.validate()?;
    let profile = profiles::create_profile(state.store.as_ref(), req.into_new(user.id))?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- PATCH /profile ---

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfile>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    payload.validate()?;
    let profile = profiles::update_profile(state.store.as_ref(), user.id, payload)?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- GET /profiles/:id --- (public)

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProfileDetail>>> {
    let detail = profiles::profile_detail(state.store.as_ref(), id)?;
    Ok(Json(ApiResponse::ok(detail)))
}
