use uuid::Uuid;

use mealmatch_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewReview, Review};
use crate::store::RecordStore;

use super::{require_meal, require_profile};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub reviewed_user_id: Uuid,
    pub meal_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
}

/// One review per (reviewer, reviewed, meal). The existence check gives a
/// clean error; the store's unique constraint catches the race.
pub fn add_review(
    store: &dyn RecordStore,
    account_id: Uuid,
    draft: ReviewDraft,
) -> AppResult<Review> {
    if !(MIN_RATING..=MAX_RATING).contains(&draft.rating) {
        return Err(AppError::new(
            ErrorCode::InvalidRating,
            format!("rating must be between {MIN_RATING} and {MAX_RATING}"),
        ));
    }

    let reviewer = require_profile(store, account_id)?;
    if store.get_profile(draft.reviewed_user_id)?.is_none() {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "reviewed profile not found"));
    }
    let meal = require_meal(store, draft.meal_id)?;

    if store.review_exists(reviewer.id, draft.reviewed_user_id, meal.id)? {
        return Err(AppError::new(
            ErrorCode::DuplicateReview,
            "you have already reviewed this user for this meal",
        ));
    }

    let review = store.create_review(NewReview {
        reviewer_id: reviewer.id,
        reviewed_user_id: draft.reviewed_user_id,
        meal_id: meal.id,
        rating: draft.rating,
        comment: draft.comment,
    })?;

    tracing::info!(
        review_id = %review.id,
        meal_id = %meal.id,
        reviewed_user_id = %review.reviewed_user_id,
        rating = review.rating,
        "review created"
    );

    Ok(review)
}
