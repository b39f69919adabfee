use uuid::Uuid;

use mealmatch_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{JoinStatus, Meal, MealMessage, NewMealMessage};
use crate::store::RecordStore;

use super::{require_meal, require_profile};

/// The host and accepted guests share a meal's chat.
pub fn can_chat(store: &dyn RecordStore, meal: &Meal, profile_id: Uuid) -> AppResult<bool> {
    if meal.is_hosted_by(profile_id) {
        return Ok(true);
    }
    Ok(store
        .find_join_request(meal.id, profile_id)?
        .is_some_and(|r| r.status == JoinStatus::Accepted))
}

pub fn post_message(
    store: &dyn RecordStore,
    account_id: Uuid,
    meal_id: Uuid,
    message: String,
) -> AppResult<MealMessage> {
    let sender = require_profile(store, account_id)?;
    let meal = require_meal(store, meal_id)?;

    if !can_chat(store, &meal, sender.id)? {
        return Err(AppError::new(
            ErrorCode::NotMealParticipant,
            "only the host and accepted guests can chat",
        ));
    }

    let posted = store.create_message(NewMealMessage {
        meal_id: meal.id,
        sender_id: sender.id,
        message,
    })?;
    tracing::debug!(meal_id = %meal.id, sender_id = %sender.id, "chat message posted");
    Ok(posted)
}
