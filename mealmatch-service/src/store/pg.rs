use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use mealmatch_shared::db::{checkout, DbConn, DbPool};
use mealmatch_shared::errors::{AppError, AppResult, ErrorCode};
use mealmatch_shared::types::PaginationParams;

use crate::models::{
    DiningLocation, JoinRequest, JoinStatus, Meal, MealMessage, NewDiningLocation,
    NewJoinRequest, NewMeal, NewMealMessage, NewProfile, NewReview, Profile, Review,
    UpdateMeal, UpdateProfile,
};
use crate::participation::{self, HostAction, JoinTransition};
use crate::schema::{dining_locations, join_requests, meal_messages, meals, profiles, reviews};

use super::{MealFilter, RecordStore};

/// PostgreSQL-backed store over an r2d2 pool.
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> AppResult<DbConn> {
        checkout(&self.pool)
    }
}

/// Map a unique-constraint violation to a domain error; anything else stays
/// a database error.
fn on_conflict(code: ErrorCode, message: &'static str) -> impl FnOnce(DieselError) -> AppError {
    move |err| match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            AppError::new(code, message)
        }
        other => AppError::from(other),
    }
}

fn meal_not_found() -> AppError {
    AppError::new(ErrorCode::MealNotFound, "meal not found")
}

fn join_request_not_found() -> AppError {
    AppError::new(ErrorCode::JoinRequestNotFound, "join request not found")
}

fn filtered_meals(filter: &MealFilter) -> meals::BoxedQuery<'static, Pg> {
    let mut query = meals::table.into_boxed();
    if let Some(location_id) = filter.location_id {
        query = query.filter(meals::location_id.eq(location_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(meals::status.eq(status));
    }
    if let Some(from) = filter.starts_at_or_after() {
        query = query.filter(meals::start_time.ge(from));
    }
    if let Some(until) = filter.starts_before() {
        query = query.filter(meals::start_time.lt(until));
    }
    query
}

fn accepted_count(conn: &mut PgConnection, meal_id: Uuid) -> QueryResult<i64> {
    join_requests::table
        .filter(join_requests::meal_id.eq(meal_id))
        .filter(join_requests::status.eq(JoinStatus::Accepted))
        .count()
        .get_result(conn)
}

impl RecordStore for PgStore {
    fn create_location(&self, new: NewDiningLocation) -> AppResult<DiningLocation> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(dining_locations::table)
            .values(&new)
            .get_result(&mut conn)?)
    }

    fn list_locations(&self) -> AppResult<Vec<DiningLocation>> {
        let mut conn = self.conn()?;
        Ok(dining_locations::table
            .order(dining_locations::name.asc())
            .load(&mut conn)?)
    }

    fn get_location(&self, id: Uuid) -> AppResult<Option<DiningLocation>> {
        let mut conn = self.conn()?;
        Ok(dining_locations::table.find(id).first(&mut conn).optional()?)
    }

    fn create_profile(&self, new: NewProfile) -> AppResult<Profile> {
        let mut conn = self.conn()?;
        diesel::insert_into(profiles::table)
            .values(&new)
            .get_result(&mut conn)
            .map_err(on_conflict(
                ErrorCode::ProfileAlreadyExists,
                "this account already has a profile",
            ))
    }

    fn profile_by_account(&self, account_id: Uuid) -> AppResult<Option<Profile>> {
        let mut conn = self.conn()?;
        Ok(profiles::table
            .filter(profiles::account_id.eq(account_id))
            .first(&mut conn)
            .optional()?)
    }

    fn get_profile(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let mut conn = self.conn()?;
        Ok(profiles::table.find(id).first(&mut conn).optional()?)
    }

    fn update_profile(&self, id: Uuid, changes: UpdateProfile) -> AppResult<Profile> {
        let mut conn = self.conn()?;
        diesel::update(profiles::table.find(id))
            .set((&changes, profiles::updated_at.eq(Utc::now())))
            .get_result(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
    }

    fn profiles_except(&self, profile_id: Uuid) -> AppResult<Vec<Profile>> {
        let mut conn = self.conn()?;
        Ok(profiles::table
            .filter(profiles::id.ne(profile_id))
            .order(profiles::created_at.asc())
            .load(&mut conn)?)
    }

    fn create_meal(&self, new: NewMeal) -> AppResult<Meal> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(meals::table)
            .values(&new)
            .get_result(&mut conn)?)
    }

    fn get_meal(&self, id: Uuid) -> AppResult<Option<Meal>> {
        let mut conn = self.conn()?;
        Ok(meals::table.find(id).first(&mut conn).optional()?)
    }

    fn update_meal(&self, id: Uuid, changes: UpdateMeal) -> AppResult<Meal> {
        // diesel rejects an UPDATE with no columns
        if changes.is_empty() {
            return self.get_meal(id)?.ok_or_else(meal_not_found);
        }

        let mut conn = self.conn()?;
        diesel::update(meals::table.find(id))
            .set(&changes)
            .get_result(&mut conn)
            .optional()?
            .ok_or_else(meal_not_found)
    }

    fn delete_meal(&self, id: Uuid) -> AppResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(meals::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(meal_not_found());
        }
        Ok(())
    }

    fn list_meals(
        &self,
        filter: &MealFilter,
        page: &PaginationParams,
    ) -> AppResult<(Vec<Meal>, u64)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_meals(filter).count().get_result(&mut conn)?;
        let items = filtered_meals(filter)
            .order((meals::start_time.asc(), meals::id.asc()))
            .limit(i64::try_from(page.limit()).unwrap_or(i64::MAX))
            .offset(i64::try_from(page.offset()).unwrap_or(i64::MAX))
            .load(&mut conn)?;

        Ok((items, total as u64))
    }

    fn meals_hosted_by(&self, host_id: Uuid) -> AppResult<Vec<Meal>> {
        let mut conn = self.conn()?;
        Ok(meals::table
            .filter(meals::host_id.eq(host_id))
            .order(meals::start_time.asc())
            .load(&mut conn)?)
    }

    fn meals_joined_by(&self, profile_id: Uuid) -> AppResult<Vec<Meal>> {
        let mut conn = self.conn()?;
        let accepted_meal_ids = join_requests::table
            .filter(join_requests::requester_id.eq(profile_id))
            .filter(join_requests::status.eq(JoinStatus::Accepted))
            .select(join_requests::meal_id);

        Ok(meals::table
            .filter(meals::id.eq_any(accepted_meal_ids))
            .order(meals::start_time.asc())
            .load(&mut conn)?)
    }

    fn create_join_request(&self, new: NewJoinRequest) -> AppResult<JoinRequest> {
        let mut conn = self.conn()?;
        diesel::insert_into(join_requests::table)
            .values(&new)
            .get_result(&mut conn)
            .map_err(on_conflict(
                ErrorCode::AlreadyRequested,
                "you have already requested to join this meal",
            ))
    }

    fn get_join_request(&self, id: Uuid) -> AppResult<Option<JoinRequest>> {
        let mut conn = self.conn()?;
        Ok(join_requests::table.find(id).first(&mut conn).optional()?)
    }

    fn join_requests_for_meal(&self, meal_id: Uuid) -> AppResult<Vec<JoinRequest>> {
        let mut conn = self.conn()?;
        Ok(join_requests::table
            .filter(join_requests::meal_id.eq(meal_id))
            .order(join_requests::created_at.asc())
            .load(&mut conn)?)
    }

    fn find_join_request(
        &self,
        meal_id: Uuid,
        requester_id: Uuid,
    ) -> AppResult<Option<JoinRequest>> {
        let mut conn = self.conn()?;
        Ok(join_requests::table
            .filter(join_requests::meal_id.eq(meal_id))
            .filter(join_requests::requester_id.eq(requester_id))
            .first(&mut conn)
            .optional()?)
    }

    fn update_join_message(&self, id: Uuid, message: Option<String>) -> AppResult<JoinRequest> {
        let mut conn = self.conn()?;
        diesel::update(join_requests::table.find(id))
            .set(join_requests::message.eq(message))
            .get_result(&mut conn)
            .optional()?
            .ok_or_else(join_request_not_found)
    }

    fn delete_join_request(&self, id: Uuid) -> AppResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(join_requests::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(join_request_not_found());
        }
        Ok(())
    }

    fn count_accepted(&self, meal_id: Uuid) -> AppResult<i64> {
        let mut conn = self.conn()?;
        Ok(accepted_count(&mut conn, meal_id)?)
    }

    fn transition_join_request(
        &self,
        request_id: Uuid,
        actor_id: Uuid,
        action: HostAction,
    ) -> AppResult<JoinTransition> {
        let mut pooled = self.conn()?;
        let conn: &mut PgConnection = &mut pooled;

        conn.transaction::<_, AppError, _>(|conn| {
            let meal_id: Uuid = join_requests::table
                .find(request_id)
                .select(join_requests::meal_id)
                .first(conn)
                .optional()?
                .ok_or_else(join_request_not_found)?;

            // Serializes every decision on this meal until commit.
            let meal: Meal = meals::table
                .find(meal_id)
                .for_update()
                .get_result(conn)
                .optional()?
                .ok_or_else(meal_not_found)?;

            if !meal.is_hosted_by(actor_id) {
                return Err(AppError::new(
                    ErrorCode::NotMealHost,
                    "only the host can respond to join requests",
                ));
            }

            let request: JoinRequest = join_requests::table
                .find(request_id)
                .first(conn)
                .optional()?
                .ok_or_else(join_request_not_found)?;
            let accepted = accepted_count(conn, meal.id)?;

            let transition = participation::plan(
                action,
                request.status,
                meal.status,
                accepted,
                meal.max_guests,
            )?;

            if let Some(status) = transition.request_status {
                diesel::update(join_requests::table.find(request_id))
                    .set(join_requests::status.eq(status))
                    .execute(conn)?;
            }
            if transition.meal_became_full {
                diesel::update(meals::table.find(meal.id))
                    .set(meals::status.eq(transition.meal_status))
                    .execute(conn)?;
            }

            Ok(JoinTransition::new(request, action, transition))
        })
    }

    fn create_review(&self, new: NewReview) -> AppResult<Review> {
        let mut conn = self.conn()?;
        diesel::insert_into(reviews::table)
            .values(&new)
            .get_result(&mut conn)
            .map_err(on_conflict(
                ErrorCode::DuplicateReview,
                "you have already reviewed this user for this meal",
            ))
    }

    fn review_exists(
        &self,
        reviewer_id: Uuid,
        reviewed_user_id: Uuid,
        meal_id: Uuid,
    ) -> AppResult<bool> {
        let mut conn = self.conn()?;
        Ok(diesel::select(diesel::dsl::exists(
            reviews::table
                .filter(reviews::reviewer_id.eq(reviewer_id))
                .filter(reviews::reviewed_user_id.eq(reviewed_user_id))
                .filter(reviews::meal_id.eq(meal_id)),
        ))
        .get_result(&mut conn)?)
    }

    fn reviews_for(&self, profile_id: Uuid) -> AppResult<Vec<Review>> {
        let mut conn = self.conn()?;
        Ok(reviews::table
            .filter(reviews::reviewed_user_id.eq(profile_id))
            .order(reviews::created_at.desc())
            .load(&mut conn)?)
    }

    fn reviewed_user_ids(&self, reviewer_id: Uuid, meal_id: Uuid) -> AppResult<Vec<Uuid>> {
        let mut conn = self.conn()?;
        Ok(reviews::table
            .filter(reviews::reviewer_id.eq(reviewer_id))
            .filter(reviews::meal_id.eq(meal_id))
            .select(reviews::reviewed_user_id)
            .load(&mut conn)?)
    }

    fn ratings_received(&self, profile_id: Uuid) -> AppResult<Vec<i16>> {
        let mut conn = self.conn()?;
        Ok(reviews::table
            .filter(reviews::reviewed_user_id.eq(profile_id))
            .select(reviews::rating)
            .load(&mut conn)?)
    }

    fn create_message(&self, new: NewMealMessage) -> AppResult<MealMessage> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(meal_messages::table)
            .values(&new)
            .get_result(&mut conn)?)
    }

    fn messages_for_meal(&self, meal_id: Uuid) -> AppResult<Vec<MealMessage>> {
        let mut conn = self.conn()?;
        Ok(meal_messages::table
            .filter(meal_messages::meal_id.eq(meal_id))
            .order(meal_messages::created_at.asc())
            .load(&mut conn)?)
    }

    fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}
