pub mod calendar;
pub mod chat;
pub mod join_requests;
pub mod matches;
pub mod meals;
pub mod profiles;
pub mod reviews;

use uuid::Uuid;

use mealmatch_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Meal, Profile};
use crate::store::RecordStore;

/// The acting account's profile. Clients treat `ProfileRequired` as
/// "create your profile first".
pub fn require_profile(store: &dyn RecordStore, account_id: Uuid) -> AppResult<Profile> {
    store
        .profile_by_account(account_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileRequired, "create a profile first"))
}

pub fn require_meal(store: &dyn RecordStore, meal_id: Uuid) -> AppResult<Meal> {
    store
        .get_meal(meal_id)?
        .ok_or_else(|| AppError::new(ErrorCode::MealNotFound, "meal not found"))
}

pub fn require_location(store: &dyn RecordStore, location_id: Uuid) -> AppResult<()> {
    match store.get_location(location_id)? {
        Some(_) => Ok(()),
        None => Err(AppError::new(ErrorCode::LocationNotFound, "dining location not found")),
    }
}
