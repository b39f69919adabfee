use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{dining_locations, join_requests, meal_messages, meals, profiles, reviews};

mod choices;

pub use choices::*;

// --- DiningLocation ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = dining_locations)]
pub struct DiningLocation {
    pub id: Uuid,
    pub name: String,
    pub location_type: String,
    pub campus_area: String,
    pub address: Option<String>,
    pub is_on_campus: bool,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = dining_locations)]
pub struct NewDiningLocation {
    pub name: String,
    pub location_type: String,
    pub campus_area: String,
    pub address: Option<String>,
    pub is_on_campus: bool,
}

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub display_name: String,
    pub major: Option<String>,
    pub class_year: Option<i32>,
    pub bio: Option<String>,
    pub preferred_location_id: Option<Uuid>,
    pub dietary_preference: DietaryPreference,
    pub usual_meal_time: MealTime,
    pub vibe: Vibe,
    pub social_battery: SocialBattery,
    pub interest: Interest,
    pub spice_tolerance: SpiceTolerance,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub account_id: Uuid,
    pub display_name: String,
    pub major: Option<String>,
    pub class_year: Option<i32>,
    pub bio: Option<String>,
    pub preferred_location_id: Option<Uuid>,
    pub dietary_preference: DietaryPreference,
    pub usual_meal_time: MealTime,
    pub vibe: Vibe,
    pub social_battery: SocialBattery,
    pub interest: Interest,
    pub spice_tolerance: SpiceTolerance,
}

/// Partial profile edit; `None` leaves the column untouched.
#[derive(Debug, AsChangeset, Deserialize, Validate, Default, Clone)]
#[diesel(table_name = profiles)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
    #[validate(length(max = 100))]
    pub major: Option<String>,
    pub class_year: Option<i32>,
    pub bio: Option<String>,
    pub preferred_location_id: Option<Uuid>,
    pub dietary_preference: Option<DietaryPreference>,
    pub usual_meal_time: Option<MealTime>,
    pub vibe: Option<Vibe>,
    pub social_battery: Option<SocialBattery>,
    pub interest: Option<Interest>,
    pub spice_tolerance: Option<SpiceTolerance>,
}

impl Profile {
    pub fn from_new(id: Uuid, new: NewProfile, now: DateTime<Utc>) -> Self {
        Self {
            id,
            account_id: new.account_id,
            display_name: new.display_name,
            major: new.major,
            class_year: new.class_year,
            bio: new.bio,
            preferred_location_id: new.preferred_location_id,
            dietary_preference: new.dietary_preference,
            usual_meal_time: new.usual_meal_time,
            vibe: new.vibe,
            social_battery: new.social_battery,
            interest: new.interest,
            spice_tolerance: new.spice_tolerance,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: UpdateProfile, now: DateTime<Utc>) {
        if let Some(v) = changes.display_name { self.display_name = v; }
        if let Some(v) = changes.major { self.major = Some(v); }
        if let Some(v) = changes.class_year { self.class_year = Some(v); }
        if let Some(v) = changes.bio { self.bio = Some(v); }
        if let Some(v) = changes.preferred_location_id { self.preferred_location_id = Some(v); }
        if let Some(v) = changes.dietary_preference { self.dietary_preference = v; }
        if let Some(v) = changes.usual_meal_time { self.usual_meal_time = v; }
        if let Some(v) = changes.vibe { self.vibe = v; }
        if let Some(v) = changes.social_battery { self.social_battery = v; }
        if let Some(v) = changes.interest { self.interest = v; }
        if let Some(v) = changes.spice_tolerance { self.spice_tolerance = v; }
        self.updated_at = now;
    }
}

// --- Meal ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = meals)]
pub struct Meal {
    pub id: Uuid,
    pub host_id: Uuid,
    pub location_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub max_guests: i32,
    pub status: MealStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = meals)]
pub struct NewMeal {
    pub host_id: Uuid,
    pub location_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub max_guests: i32,
    pub status: MealStatus,
}

/// Host edit of a meal, including the manual status override.
#[derive(Debug, AsChangeset, Default, Clone)]
#[diesel(table_name = meals)]
pub struct UpdateMeal {
    pub location_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub max_guests: Option<i32>,
    pub status: Option<MealStatus>,
}

impl UpdateMeal {
    pub fn is_empty(&self) -> bool {
        self.location_id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.max_guests.is_none()
            && self.status.is_none()
    }
}

impl Meal {
    pub fn from_new(id: Uuid, new: NewMeal, now: DateTime<Utc>) -> Self {
        Self {
            id,
            host_id: new.host_id,
            location_id: new.location_id,
            title: new.title,
            description: new.description,
            start_time: new.start_time,
            end_time: new.end_time,
            max_guests: new.max_guests,
            status: new.status,
            created_at: now,
        }
    }

    pub fn apply(&mut self, changes: UpdateMeal) {
        if let Some(v) = changes.location_id { self.location_id = v; }
        if let Some(v) = changes.title { self.title = v; }
        if let Some(v) = changes.description { self.description = Some(v); }
        if let Some(v) = changes.start_time { self.start_time = v; }
        if let Some(v) = changes.end_time { self.end_time = Some(v); }
        if let Some(v) = changes.max_guests { self.max_guests = v; }
        if let Some(v) = changes.status { self.status = v; }
    }

    pub fn is_hosted_by(&self, profile_id: Uuid) -> bool {
        self.host_id == profile_id
    }
}

// --- JoinRequest ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = join_requests)]
pub struct JoinRequest {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub requester_id: Uuid,
    pub message: Option<String>,
    pub status: JoinStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = join_requests)]
pub struct NewJoinRequest {
    pub meal_id: Uuid,
    pub requester_id: Uuid,
    pub message: Option<String>,
}

// --- Review ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = reviews)]
pub struct Review {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewed_user_id: Uuid,
    pub meal_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = reviews)]
pub struct NewReview {
    pub reviewer_id: Uuid,
    pub reviewed_user_id: Uuid,
    pub meal_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
}

// --- MealMessage ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone, PartialEq)]
#[diesel(table_name = meal_messages)]
pub struct MealMessage {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub sender_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = meal_messages)]
pub struct NewMealMessage {
    pub meal_id: Uuid,
    pub sender_id: Uuid,
    pub message: String,
}
