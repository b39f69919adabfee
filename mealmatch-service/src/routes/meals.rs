use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use mealmatch_shared::errors::{AppError, AppResult};
use mealmatch_shared::middleware::OptionalAuthUser;
use mealmatch_shared::types::auth::AuthUser;
use mealmatch_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::models::{Meal, MealStatus, UpdateMeal};
use crate::services::meals::{self, MealDetail, MealDraft};
use crate::store::MealFilter;
use crate::AppState;

// --- GET /meals, GET /meals/search --- (public)

/// Raw filter parameters. Anything that fails to parse is dropped rather
/// than rejected, so a stale bookmark still lists meals.
#[derive(Debug, Default, Deserialize)]
pub struct MealListQuery {
    pub location: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

impl MealListQuery {
    pub fn to_filter(&self) -> MealFilter {
        MealFilter {
            location_id: self.location.as_deref().and_then(|s| Uuid::parse_str(s.trim()).ok()),
            status: self.status.as_deref().and_then(|s| s.trim().parse::<MealStatus>().ok()),
            date_from: parse_date(self.date_from.as_deref()),
            date_to: parse_date(self.date_to.as_deref()),
        }
    }
}

pub async fn list_meals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MealListQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Meal>>>> {
    let meals = meals::list_meals(state.store.as_ref(), &query.to_filter(), &page)?;
    Ok(Json(ApiResponse::ok(meals)))
}

// --- POST /meals ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMealRequest {
    pub location_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_guests: i32,
}

pub async fn create_meal(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMealRequest>,
) -> AppResult<Json<ApiResponse<Meal>>> {
    req.validate()?;
    if req.end_time.is_some_and(|end| end < req.start_time) {
        return Err(AppError::Validation("end_time must not be before start_time".into()));
    }

    let meal = meals::create_meal(
        state.store.as_ref(),
        user.id,
        MealDraft {
            location_id: req.location_id,
            title: req.title,
            description: req.description,
            start_time: req.start_time,
            end_time: req.end_time,
            max_guests: req.max_guests,
        },
    )?;
    Ok(Json(ApiResponse::ok(meal)))
}

// --- GET /meals/:id --- (optional auth)

pub async fn get_meal(
    OptionalAuthUser(user): OptionalAuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MealDetail>>> {
    let detail = meals::meal_detail(state.store.as_ref(), id, user.map(|u| u.id))?;
    Ok(Json(ApiResponse::ok(detail)))
}

// --- PATCH /meals/:id ---

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMealRequest {
    pub location_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_guests: Option<i32>,
    pub status: Option<MealStatus>,
}

impl From<UpdateMealRequest> for UpdateMeal {
    fn from(req: UpdateMealRequest) -> Self {
        Self {
            location_id: req.location_id,
            title: req.title,
            description: req.description,
            start_time: req.start_time,
            end_time: req.end_time,
            max_guests: req.max_guests,
            status: req.status,
        }
    }
}

pub async fn update_meal(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMealRequest>,
) -> AppResult<Json<ApiResponse<Meal>>> {
    req.validate()?;
    let meal = meals::update_meal(state.store.as_ref(), user.id, id, req.into())?;
    Ok(Json(ApiResponse::ok(meal)))
}

// --- DELETE /meals/:id ---

pub async fn delete_meal(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    meals::delete_meal(state.store.as_ref(), user.id, id)?;
    Ok(Json(ApiResponse::ok_with_message((), "meal deleted")))
}

// --- GET /meals/:id/calendar --- (public)

pub async fn download_calendar(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let file = meals::calendar_file(state.store.as_ref(), id)?;
    let headers = [
        (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.filename),
        ),
    ];
    Ok((headers, file.body))
}

// --- GET /dashboard/hosted ---

pub async fn hosted_meals(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Meal>>>> {
    let meals = meals::hosted_meals(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(meals)))
}

// --- GET /dashboard/joined ---

pub async fn joined_meals(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Meal>>>> {
    let meals = meals::joined_meals(state.store.as_ref(), user.id)?;
    Ok(Json(ApiResponse::ok(meals)))
}
