use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use mealmatch_shared::errors::{AppError, AppResult, ErrorCode};
use mealmatch_shared::types::PaginationParams;

use crate::models::{
    DiningLocation, JoinRequest, JoinStatus, Meal, MealMessage, NewDiningLocation,
    NewJoinRequest, NewMeal, NewMealMessage, NewProfile, NewReview, Profile, Review,
    UpdateMeal, UpdateProfile,
};
use crate::participation::{self, HostAction, JoinTransition};

use super::{MealFilter, RecordStore};

#[derive(Default)]
struct Tables {
    locations: Vec<DiningLocation>,
    profiles: Vec<Profile>,
    meals: Vec<Meal>,
    join_requests: Vec<JoinRequest>,
    reviews: Vec<Review>,
    messages: Vec<MealMessage>,
}

impl Tables {
    fn meal_mut(&mut self, id: Uuid) -> AppResult<&mut Meal> {
        self.meals
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::new(ErrorCode::MealNotFound, "meal not found"))
    }

    fn join_request_mut(&mut self, id: Uuid) -> AppResult<&mut JoinRequest> {
        self.join_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::new(ErrorCode::JoinRequestNotFound, "join request not found"))
    }

    fn accepted_count(&self, meal_id: Uuid) -> i64 {
        self.join_requests
            .iter()
            .filter(|r| r.meal_id == meal_id && r.status == JoinStatus::Accepted)
            .count() as i64
    }
}

fn by_start_time(meals: &mut [Meal]) {
    meals.sort_by_key(|m| m.start_time);
}

/// Process-local store. Every operation runs under one mutex, which also
/// makes host decisions on the same meal strictly sequential.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::internal("memory store lock poisoned"))
    }
}

impl RecordStore for MemoryStore {
    fn create_location(&self, new: NewDiningLocation) -> AppResult<DiningLocation> {
        let location = DiningLocation {
            id: Uuid::new_v4(),
            name: new.name,
            location_type: new.location_type,
            campus_area: new.campus_area,
            address: new.address,
            is_on_campus: new.is_on_campus,
        };
        self.lock()?.locations.push(location.clone());
        Ok(location)
    }

    fn list_locations(&self) -> AppResult<Vec<DiningLocation>> {
        let mut locations = self.lock()?.locations.clone();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }

    fn get_location(&self, id: Uuid) -> AppResult<Option<DiningLocation>> {
        Ok(self.lock()?.locations.iter().find(|l| l.id == id).cloned())
    }

    fn create_profile(&self, new: NewProfile) -> AppResult<Profile> {
        let mut tables = self.lock()?;
        if tables.profiles.iter().any(|p| p.account_id == new.account_id) {
            return Err(AppError::new(
                ErrorCode::ProfileAlreadyExists,
                "this account already has a profile",
            ));
        }
        let profile = Profile::from_new(Uuid::new_v4(), new, Utc::now());
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    fn profile_by_account(&self, account_id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self.lock()?.profiles.iter().find(|p| p.account_id == account_id).cloned())
    }

    fn get_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self.lock()?.profiles.iter().find(|p| p.id == id).cloned())
    }

    fn update_profile(&self, id: Uuid, changes: UpdateProfile) -> AppResult<Profile> {
        let mut tables = self.lock()?;
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;
        profile.apply(changes, Utc::now());
        Ok(profile.clone())
    }

    fn profiles_except(&self, profile_id: Uuid) -> AppResult<Vec<Profile>> {
        Ok(self
            .lock()?
            .profiles
            .iter()
            .filter(|p| p.id != profile_id)
            .cloned()
            .collect())
    }

    fn create_meal(&self, new: NewMeal) -> AppResult<Meal> {
        let meal = Meal::from_new(Uuid::new_v4(), new, Utc::now());
        self.lock()?.meals.push(meal.clone());
        Ok(meal)
    }

    fn get_meal(&self, id: Uuid) -> AppResult<Option<Meal>> {
        Ok(self.lock()?.meals.iter().find(|m| m.id == id).cloned())
    }

    fn update_meal(&self, id: Uuid, changes: UpdateMeal) -> AppResult<Meal> {
        let mut tables = self.lock()?;
        let meal = tables.meal_mut(id)?;
        meal.apply(changes);
        Ok(meal.clone())
    }

    fn delete_meal(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.lock()?;
        let before = tables.meals.len();
        tables.meals.retain(|m| m.id != id);
        if tables.meals.len() == before {
            return Err(AppError::new(ErrorCode::MealNotFound, "meal not found"));
        }
        tables.join_requests.retain(|r| r.meal_id != id);
        tables.reviews.retain(|r| r.meal_id != id);
        tables.messages.retain(|m| m.meal_id != id);
        Ok(())
    }

    fn list_meals(
        &self,
        filter: &MealFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Meal>, u64)> {
        let mut meals: Vec<Meal> = self
            .lock()?
            .meals
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        by_start_time(&mut meals);

        let total = meals.len() as u64;
        let items = meals
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .collect();
        Ok((items, total))
    }

    fn meals_hosted_by(&self, host_id: Uuid) -> AppResult<Vec<Meal>> {
        let mut meals: Vec<Meal> = self
            .lock()?
            .meals
            .iter()
            .filter(|m| m.host_id == host_id)
            .cloned()
            .collect();
        by_start_time(&mut meals);
        Ok(meals)
    }

    fn meals_joined_by(&self, profile_id: Uuid) -> AppResult<Vec<Meal>> {
        let tables = self.lock()?;
        let mut meals: Vec<Meal> = tables
            .meals
            .iter()
            .filter(|m| {
                tables.join_requests.iter().any(|r| {
                    r.meal_id == m.id
                        && r.requester_id == profile_id
                        && r.status == JoinStatus::Accepted
                })
            })
            .cloned()
            .collect();
        by_start_time(&mut meals);
        Ok(meals)
    }

    fn create_join_request(&self, new: NewJoinRequest) -> AppResult<JoinRequest> {
        let mut tables = self.lock()?;
        if tables
            .join_requests
            .iter()
            .any(|r| r.meal_id == new.meal_id && r.requester_id == new.requester_id)
        {
            return Err(AppError::new(
                ErrorCode::AlreadyRequested,
                "you have already requested to join this meal",
            ));
        }
        let request = JoinRequest {
            id: Uuid::new_v4(),
            meal_id: new.meal_id,
            requester_id: new.requester_id,
            message: new.message,
            status: JoinStatus::Pending,
            created_at: Utc::now(),
        };
        tables.join_requests.push(request.clone());
        Ok(request)
    }

    fn get_join_request(&self, id: Uuid) -> AppResult<Option<JoinRequest>> {
        Ok(self.lock()?.join_requests.iter().find(|r| r.id == id).cloned())
    }

    fn join_requests_for_meal(&self, meal_id: Uuid) -> AppResult<Vec<JoinRequest>> {
        Ok(self
            .lock()?
            .join_requests
            .iter()
            .filter(|r| r.meal_id == meal_id)
            .cloned()
            .collect())
    }

    fn find_join_request(
        &self,
        meal_id: Uuid,
        requester_id: Uuid,
    ) -> AppResult<Option<JoinRequest>> {
        Ok(self
            .lock()?
            .join_requests
            .iter()
            .find(|r| r.meal_id == meal_id && r.requester_id == requester_id)
            .cloned())
    }

    fn update_join_message(&self, id: Uuid, message: Option<String>) -> AppResult<JoinRequest> {
        let mut tables = self.lock()?;
        let request = tables.join_request_mut(id)?;
        request.message = message;
        Ok(request.clone())
    }

    fn delete_join_request(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.lock()?;
        let before = tables.join_requests.len();
        tables.join_requests.retain(|r| r.id != id);
        if tables.join_requests.len() == before {
            return Err(AppError::new(ErrorCode::JoinRequestNotFound, "join request not found"));
        }
        Ok(())
    }

    fn count_accepted(&self, meal_id: Uuid) -> AppResult<i64> {
        Ok(self.lock()?.accepted_count(meal_id))
    }

    fn transition_join_request(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        action: HostAction,
    ) -> AppResult<JoinTransition> {
        let mut tables = self.lock()?;

        let request = tables.join_request_mut(request_id)?.clone();
        let meal = tables.meal_mut(request.meal_id)?.clone();
        if !meal.is_hosted_by(actor_id) {
            return Err(AppError::new(
                ErrorCode::NotMealHost,
                "only the host can respond to join requests",
            ));
        }

        let accepted = tables.accepted_count(meal.id);
        let transition = participation::plan(
            action,
            request.status,
            meal.status,
            accepted,
            meal.max_guests,
        )?;

        if let Some(status) = transition.request_status {
            tables.join_request_mut(request_id)?.status = status;
        }
        if transition.meal_became_full {
            tables.meal_mut(meal.id)?.status = transition.meal_status;
        }

        Ok(JoinTransition::new(request, action, transition))
    }

    fn create_review(&self, new: NewReview) -> AppResult<Review> {
        let mut tables = self.lock()?;
        if tables.reviews.iter().any(|r| {
            r.reviewer_id == new.reviewer_id
                && r.reviewed_user_id == new.reviewed_user_id
                && r.meal_id == new.meal_id
        }) {
            return Err(AppError::new(
                ErrorCode::DuplicateReview,
                "you have already reviewed this user for this meal",
            ));
        }
        let review = Review {
            id: Uuid::new_v4(),
            reviewer_id: new.reviewer_id,
            reviewed_user_id: new.reviewed_user_id,
            meal_id: new.meal_id,
            rating: new.rating,
            comment: new.comment,
            created_at: Utc::now(),
        };
        tables.reviews.push(review.clone());
        Ok(review)
    }

    fn review_exists(
        &self,
        reviewer_id: Uuid,
        reviewed_user_id: Uuid,
        meal_id: Uuid,
    ) -> AppResult<bool> {
        Ok(self.lock()?.reviews.iter().any(|r| {
            r.reviewer_id == reviewer_id
                && r.reviewed_user_id == reviewed_user_id
                && r.meal_id == meal_id
        }))
    }

    fn reviews_for(&self, profile_id: Uuid) -> AppResult<Vec<Review>> {
        Ok(self
            .lock()?
            .reviews
            .iter()
            .rev()
            .filter(|r| r.reviewed_user_id == profile_id)
            .cloned()
            .collect())
    }

    fn reviewed_user_ids(&self, reviewer_id: Uuid, meal_id: Uuid) -> AppResult<Vec<Uuid>> {
        Ok(self
            .lock()?
            .reviews
            .iter()
            .filter(|r| r.reviewer_id == reviewer_id && r.meal_id == meal_id)
            .map(|r| r.reviewed_user_id)
            .collect())
    }

    fn ratings_received(&self, profile_id: Uuid) -> AppResult<Vec<i16>> {
        Ok(self
            .lock()?
            .reviews
            .iter()
            .filter(|r| r.reviewed_user_id == profile_id)
            .map(|r| r.rating)
            .collect())
    }

    fn create_message(&self, new: NewMealMessage) -> AppResult<MealMessage> {
        let message = MealMessage {
            id: Uuid::new_v4(),
            meal_id: new.meal_id,
            sender_id: new.sender_id,
            message: new.message,
            created_at: Utc::now(),
        };
        self.lock()?.messages.push(message.clone());
        Ok(message)
    }

    fn messages_for_meal(&self, meal_id: Uuid) -> AppResult<Vec<MealMessage>> {
        Ok(self
            .lock()?
            .messages
            .iter()
            .filter(|m| m.meal_id == meal_id)
            .cloned()
            .collect())
    }

    fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DietaryPreference, Interest, MealStatus, MealTime, SocialBattery, SpiceTolerance, Vibe,
    };
    use chrono::Duration;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn new_profile(name: &str) -> NewProfile {
        NewProfile {
            account_id: Uuid::new_v4(),
            display_name: name.to_string(),
            major: None,
            class_year: None,
            bio: None,
            preferred_location_id: None,
            dietary_preference: DietaryPreference::default(),
            usual_meal_time: MealTime::default(),
            vibe: Vibe::default(),
            social_battery: SocialBattery::default(),
            interest: Interest::default(),
            spice_tolerance: SpiceTolerance::default(),
        }
    }

    fn setup_meal(store: &MemoryStore, max_guests: i32) -> (Profile, Meal) {
        let host = store.create_profile(new_profile("host")).unwrap();
        let location = store
            .create_location(NewDiningLocation {
                name: "Warren".into(),
                location_type: "dining_hall".into(),
                campus_area: "East".into(),
                address: None,
                is_on_campus: true,
            })
            .unwrap();
        let meal = store
            .create_meal(NewMeal {
                host_id: host.id,
                location_id: location.id,
                title: "Dinner".into(),
                description: None,
                start_time: Utc::now() + Duration::days(1),
                end_time: None,
                max_guests,
                status: MealStatus::Open,
            })
            .unwrap();
        (host, meal)
    }

    fn request_from(store: &MemoryStore, meal: &Meal, name: &str) -> JoinRequest {
        let guest = store.create_profile(new_profile(name)).unwrap();
        store
            .create_join_request(NewJoinRequest {
                meal_id: meal.id,
                requester_id: guest.id,
                message: None,
            })
            .unwrap()
    }

    #[test]
    fn second_profile_for_account_is_rejected() {
        let store = MemoryStore::new();
        let new = new_profile("a");
        store.create_profile(new.clone()).unwrap();
        let err = store.create_profile(new).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ProfileAlreadyExists));
    }

    #[test]
    fn duplicate_join_request_is_rejected() {
        let store = MemoryStore::new();
        let (_, meal) = setup_meal(&store, 2);
        let req = request_from(&store, &meal, "guest");

        let err = store
            .create_join_request(NewJoinRequest {
                meal_id: meal.id,
                requester_id: req.requester_id,
                message: Some("again".into()),
            })
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::AlreadyRequested));
    }

    #[test]
    fn third_accept_on_two_seat_meal_fails_closed() {
        let store = MemoryStore::new();
        let (host, meal) = setup_meal(&store, 2);
        let r1 = request_from(&store, &meal, "g1");
        let r2 = request_from(&store, &meal, "g2");
        let r3 = request_from(&store, &meal, "g3");

        let t1 = store.transition_join_request(r1.id, host.id, HostAction::Accept).unwrap();
        assert_eq!(t1.meal_status, MealStatus::Open);
        assert_eq!(t1.accepted_guests, 1);

        let t2 = store.transition_join_request(r2.id, host.id, HostAction::Accept).unwrap();
        assert_eq!(t2.meal_status, MealStatus::Full);
        assert!(t2.meal_became_full);

        let err = store.transition_join_request(r3.id, host.id, HostAction::Accept).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::MealFull));

        assert_eq!(store.count_accepted(meal.id).unwrap(), 2);
        assert_eq!(store.get_meal(meal.id).unwrap().unwrap().status, MealStatus::Full);
        assert_eq!(
            store.get_join_request(r3.id).unwrap().unwrap().status,
            JoinStatus::Pending
        );
    }

    #[test]
    fn only_the_host_may_decide() {
        let store = MemoryStore::new();
        let (_, meal) = setup_meal(&store, 2);
        let req = request_from(&store, &meal, "guest");

        let err = store
            .transition_join_request(req.id, req.requester_id, HostAction::Accept)
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotMealHost));
        assert_eq!(store.count_accepted(meal.id).unwrap(), 0);
    }

    #[test]
    fn waitlisted_guest_can_later_be_accepted() {
        let store = MemoryStore::new();
        let (host, meal) = setup_meal(&store, 1);
        let req = request_from(&store, &meal, "guest");

        let t = store.transition_join_request(req.id, host.id, HostAction::Waitlist).unwrap();
        assert_eq!(t.request.status, JoinStatus::Waitlisted);

        let t = store.transition_join_request(req.id, host.id, HostAction::Accept).unwrap();
        assert_eq!(t.request.status, JoinStatus::Accepted);
        assert!(t.meal_became_full);

        let joined = store.meals_joined_by(req.requester_id).unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].id, meal.id);
    }

    #[test]
    fn concurrent_accepts_never_exceed_capacity() {
        const SEATS: i32 = 3;
        const REQUESTS: usize = 8;

        let store = Arc::new(MemoryStore::new());
        let (host, meal) = setup_meal(&store, SEATS);
        let requests: Vec<_> = (0..REQUESTS)
            .map(|i| request_from(&store, &meal, &format!("guest-{i}")))
            .collect();

        let barrier = Arc::new(Barrier::new(REQUESTS));
        let handles: Vec<_> = requests
            .into_iter()
            .map(|req| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                let host_id = host.id;
                thread::spawn(move || {
                    barrier.wait();
                    store.transition_join_request(req.id, host_id, HostAction::Accept)
                })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(t) => {
                    assert!(t.changed);
                    accepted += 1;
                }
                Err(err) => assert_eq!(err.code(), Some(ErrorCode::MealFull)),
            }
        }

        assert_eq!(accepted, SEATS);
        assert_eq!(store.count_accepted(meal.id).unwrap(), i64::from(SEATS));
        assert_eq!(store.get_meal(meal.id).unwrap().unwrap().status, MealStatus::Full);
    }

    #[test]
    fn deleting_a_meal_cascades() {
        let store = MemoryStore::new();
        let (host, meal) = setup_meal(&store, 2);
        let req = request_from(&store, &meal, "guest");
        store
            .create_message(NewMealMessage {
                meal_id: meal.id,
                sender_id: host.id,
                message: "hi".into(),
            })
            .unwrap();

        store.delete_meal(meal.id).unwrap();

        assert!(store.get_join_request(req.id).unwrap().is_none());
        assert!(store.messages_for_meal(meal.id).unwrap().is_empty());
        let err = store.delete_meal(meal.id).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::MealNotFound));
    }

    #[test]
    fn duplicate_review_never_creates_a_second_row() {
        let store = MemoryStore::new();
        let (host, meal) = setup_meal(&store, 2);
        let req = request_from(&store, &meal, "guest");
        let review = NewReview {
            reviewer_id: host.id,
            reviewed_user_id: req.requester_id,
            meal_id: meal.id,
            rating: 5,
            comment: None,
        };

        store.create_review(review.clone()).unwrap();
        let err = store.create_review(review).unwrap_err();

        assert_eq!(err.code(), Some(ErrorCode::DuplicateReview));
        assert_eq!(store.ratings_received(req.requester_id).unwrap(), vec![5]);
        assert!(store.review_exists(host.id, req.requester_id, meal.id).unwrap());
    }

    #[test]
    fn meal_listing_pages_by_start_time() {
        let store = MemoryStore::new();
        let (host, first) = setup_meal(&store, 2);
        let second = store
            .create_meal(NewMeal {
                host_id: host.id,
                location_id: first.location_id,
                title: "Breakfast".into(),
                description: None,
                start_time: first.start_time - Duration::hours(12),
                end_time: None,
                max_guests: 1,
                status: MealStatus::Open,
            })
            .unwrap();

        let (page, total) = store
            .list_meals(&MealFilter::default(), &PaginationParams::new(1, 1))
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, second.id);

        let (page, _) = store
            .list_meals(&MealFilter::default(), &PaginationParams::new(2, 1))
            .unwrap();
        assert_eq!(page[0].id, first.id);
    }
}
