//! Record Store: persistence for every MealMatch entity.
//!
//! The trait is synchronous, like the diesel pool behind `PgStore`; the
//! in-process `MemoryStore` backs local runs and the test suite.

mod memory;
mod pg;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use mealmatch_shared::errors::AppResult;
use mealmatch_shared::types::PaginationParams;

use crate::models::{
    DiningLocation, JoinRequest, Meal, MealMessage, MealStatus, NewDiningLocation,
    NewJoinRequest, NewMeal, NewMealMessage, NewProfile, NewReview, Profile, Review,
    UpdateMeal, UpdateProfile,
};
use crate::participation::{HostAction, JoinTransition};

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Meal listing filters. Date bounds are inclusive and compare against the
/// UTC calendar date of `start_time`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealFilter {
    pub location_id: Option<Uuid>,
    pub status: Option<MealStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl MealFilter {
    /// Earliest `start_time` admitted, if bounded.
    pub fn starts_at_or_after(&self) -> Option<DateTime<Utc>> {
        self.date_from.map(start_of_day)
    }

    /// First `start_time` excluded, if bounded.
    pub fn starts_before(&self) -> Option<DateTime<Utc>> {
        self.date_to
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .map(start_of_day)
    }

    pub fn matches(&self, meal: &Meal) -> bool {
        if self.location_id.is_some_and(|id| meal.location_id != id) {
            return false;
        }
        if self.status.is_some_and(|s| meal.status != s) {
            return false;
        }
        if self.starts_at_or_after().is_some_and(|t| meal.start_time < t) {
            return false;
        }
        if self.starts_before().is_some_and(|t| meal.start_time >= t) {
            return false;
        }
        true
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub trait RecordStore: Send + Sync {
    // --- Locations ---
    fn create_location(&self, new: NewDiningLocation) -> AppResult<DiningLocation>;
    fn list_locations(&self) -> AppResult<Vec<DiningLocation>>;
    fn get_location(&self, id: Uuid) -> AppResult<Option<DiningLocation>>;

    // --- Profiles ---
    /// Fails with `ProfileAlreadyExists` when the account already has one.
    fn create_profile(&self, new: NewProfile) -> AppResult<Profile>;
    fn profile_by_account(&self, account_id: Uuid) -> AppResult<Option<Profile>>;
    fn get_profile(&self, id: Uuid) -> AppResult<Option<Profile>>;
    fn update_profile(&self, id: Uuid, changes: UpdateProfile) -> AppResult<Profile>;
    /// Every profile except the one with `profile_id`, oldest first.
    fn profiles_except(&self, profile_id: Uuid) -> AppResult<Vec<Profile>>;

    // --- Meals ---
    fn create_meal(&self, new: NewMeal) -> AppResult<Meal>;
    fn get_meal(&self, id: Uuid) -> AppResult<Option<Meal>>;
    fn update_meal(&self, id: Uuid, changes: UpdateMeal) -> AppResult<Meal>;
    /// Removes the meal with its join requests, reviews and messages.
    fn delete_meal(&self, id: Uuid) -> AppResult<()>;
    /// A page of meals matching `filter` by start time, plus the total count.
    fn list_meals(
        &self,
        filter: &MealFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Meal>, u64)>;
    fn meals_hosted_by(&self, host_id: Uuid) -> AppResult<Vec<Meal>>;
    /// Meals where `profile_id` holds an accepted request.
    fn meals_joined_by(&self, profile_id: Uuid) -> AppResult<Vec<Meal>>;

    // --- Join requests ---
    /// Fails with `AlreadyRequested` on a second request for the same meal.
    fn create_join_request(&self, new: NewJoinRequest) -> AppResult<JoinRequest>;
    fn get_join_request(&self, id: Uuid) -> AppResult<Option<JoinRequest>>;
    fn join_requests_for_meal(&self, meal_id: Uuid) -> AppResult<Vec<JoinRequest>>;
    fn find_join_request(
        &self,
        meal_id: Uuid,
        requester_id: Uuid,
    ) -> AppResult<Option<JoinRequest>>;
    fn update_join_message(&self, id: Uuid, message: Option<String>) -> AppResult<JoinRequest>;
    fn delete_join_request(&self, id: Uuid) -> AppResult<()>;
    fn count_accepted(&self, meal_id: Uuid) -> AppResult<i64>;
    /// Apply a host decision atomically with respect to other decisions on
    /// the same meal. Only the meal's host (`actor_id`) may decide.
    fn transition_join_request(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        action: HostAction,
    ) -> AppResult<JoinTransition>;

    // --- Reviews ---
    /// Fails with `DuplicateReview` when the (reviewer, reviewed, meal)
    /// triple already exists.
    fn create_review(&self, new: NewReview) -> AppResult<Review>;
    fn review_exists(
        &self,
        reviewer_id: Uuid,
        reviewed_user_id: Uuid,
        meal_id: Uuid,
    ) -> AppResult<bool>;
    /// Reviews received by `profile_id`, newest first.
    fn reviews_for(&self, profile_id: Uuid) -> AppResult<Vec<Review>>;
    fn reviewed_user_ids(&self, reviewer_id: Uuid, meal_id: Uuid) -> AppResult<Vec<Uuid>>;
    fn ratings_received(&self, profile_id: Uuid) -> AppResult<Vec<i16>>;

    // --- Messages ---
    fn create_message(&self, new: NewMealMessage) -> AppResult<MealMessage>;
    /// Chat history for a meal, oldest first.
    fn messages_for_meal(&self, meal_id: Uuid) -> AppResult<Vec<MealMessage>>;

    fn ping(&self) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meal_at(start: DateTime<Utc>) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            title: "Lunch".into(),
            description: None,
            start_time: start,
            end_time: None,
            max_guests: 2,
            status: MealStatus::Open,
            created_at: start,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let meal = meal_at(Utc::now());
        assert!(MealFilter::default().matches(&meal));
    }

    #[test]
    fn date_bounds_are_inclusive_whole_days() {
        let day = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let filter = MealFilter {
            date_from: Some(day),
            date_to: Some(day),
            ..Default::default()
        };

        let early = meal_at(Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        let late = meal_at(Utc.with_ymd_and_hms(2025, 12, 1, 23, 59, 59).unwrap());
        let before = meal_at(Utc.with_ymd_and_hms(2025, 11, 30, 23, 59, 59).unwrap());
        let after = meal_at(Utc.with_ymd_and_hms(2025, 12, 2, 0, 0, 0).unwrap());

        assert!(filter.matches(&early));
        assert!(filter.matches(&late));
        assert!(!filter.matches(&before));
        assert!(!filter.matches(&after));
    }

    #[test]
    fn location_and_status_must_both_match() {
        let meal = meal_at(Utc::now());
        let filter = MealFilter {
            location_id: Some(meal.location_id),
            status: Some(MealStatus::Full),
            ..Default::default()
        };
        assert!(!filter.matches(&meal));

        let filter = MealFilter {
            status: Some(MealStatus::Open),
            ..filter
        };
        assert!(filter.matches(&meal));
    }
}
