//! Chat, reviews and matches: the handlers that connect profiles to
//! each other rather than to meals.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use mealmatch_shared::errors::AppResult;
use mealmatch_shared::types::auth::AuthUser;
use mealmatch_shared::types::ApiResponse;

use crate::matching::Match;
use crate::models::{MealMessage, Review};
use crate::services::reviews::{self, ReviewDraft};
use crate::services::{chat, matches};
use crate::AppState;

// --- POST /meals/:id/messages ---

#[derive(Debug, Deserialize, Validate)]
pub struct PostMessageRequest {
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
}

pub async fn post_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(meal_id): Path<Uuid>,
    Json(req): Json<PostMessageRequest>,
) -> AppResult<Json<ApiResponse<MealMessage>>> {
    req.validate()?;
    let message = chat::post_message(state.store.as_ref(), user.id, meal_id, req.message)?;
    Ok(Json(ApiResponse::ok(message)))
}

// --- POST /reviews ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub reviewed_user_id: Uuid,
    pub meal_id: Uuid,
    /// Range-checked by the service so the caller sees `InvalidRating`.
    pub rating: i16,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

pub async fn create_review(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    req.validate()?;
    let review = reviews::add_review(
        state.store.as_ref(),
        user.id,
        ReviewDraft {
            reviewed_user_id: req.reviewed_user_id,
            meal_id: req.meal_id,
            rating: req.rating,
            comment: req.comment,
        },
    )?;
    Ok(Json(ApiResponse::ok(review)))
}

// --- GET /matches ---

pub async fn find_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Match>>>> {
    let found = matches::find_matches(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(found)))
}
