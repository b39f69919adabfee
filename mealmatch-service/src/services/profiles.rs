use serde::Serialize;
use uuid::Uuid;

use mealmatch_shared::errors::{AppError, AppResult, ErrorCode};

use crate::matching;
use crate::models::{NewProfile, Profile, Review, UpdateProfile};
use crate::store::RecordStore;

use super::{require_location, require_profile};

/// Public profile page: the profile, what others wrote about them, and
/// their karma.
#[derive(Debug, Serialize)]
pub struct ProfileDetail {
    pub profile: Profile,
    pub reviews: Vec<Review>,
    pub karma: Option<f64>,
}

pub fn create_profile(store: &dyn RecordStore, new: NewProfile) -> AppResult<Profile> {
    if let Some(location_id) = new.preferred_location_id {
        require_location(store, location_id)?;
    }

    let profile = store.create_profile(new)?;

    tracing::info!(
        profile_id = %profile.id,
        account_id = %profile.account_id,
        "profile created"
    );

    Ok(profile)
}

pub fn my_profile(store: &dyn RecordStore, account_id: Uuid) -> AppResult<ProfileDetail> {
    let profile = require_profile(store, account_id)?;
    detail_of(store, profile)
}

pub fn update_profile(
    store: &dyn RecordStore,
    account_id: Uuid,
    changes: UpdateProfile,
) -> AppResult<Profile> {
    let profile = require_profile(store, account_id)?;
    if let Some(location_id) = changes.preferred_location_id {
        require_location(store, location_id)?;
    }

    let updated = store.update_profile(profile.id, changes)?;
    tracing::debug!(profile_id = %updated.id, "profile updated");
    Ok(updated)
}

pub fn profile_detail(store: &dyn RecordStore, profile_id: Uuid) -> AppResult<ProfileDetail> {
    let profile = store
        .get_profile(profile_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;
    detail_of(store, profile)
}

pub fn karma_for(store: &dyn RecordStore, profile_id: Uuid) -> AppResult<Option<f64>> {
    let ratings = store.ratings_received(profile_id)?;
    Ok(matching::karma(&ratings))
}

fn detail_of(store: &dyn RecordStore, profile: Profile) -> AppResult<ProfileDetail> {
    let reviews = store.reviews_for(profile.id)?;
    let karma = karma_for(store, profile.id)?;
    Ok(ProfileDetail {
        profile,
        reviews,
        karma,
    })
}
