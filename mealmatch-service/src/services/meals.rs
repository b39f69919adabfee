use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use mealmatch_shared::errors::{AppError, AppResult, ErrorCode};
use mealmatch_shared::types::{Paginated, PaginationParams};

use crate::models::{
    DiningLocation, JoinRequest, Meal, MealMessage, MealStatus, NewMeal, Profile, UpdateMeal,
};
use crate::store::{MealFilter, RecordStore};

use super::{calendar, chat, require_location, require_meal, require_profile};

/// Host-supplied fields of a new meal.
#[derive(Debug, Clone)]
pub struct MealDraft {
    pub location_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub max_guests: i32,
}

/// Everything the meal page shows, tailored to the viewer.
#[derive(Debug, Serialize)]
pub struct MealDetail {
    pub meal: Meal,
    pub host: Option<Profile>,
    pub location: Option<DiningLocation>,
    pub join_requests: Vec<JoinRequest>,
    pub accepted_guests: i64,
    pub can_chat: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<MealMessage>>,
    pub reviewed_user_ids: Vec<Uuid>,
    pub has_requested: bool,
}

pub struct CalendarFile {
    pub filename: String,
    pub body: String,
}

pub fn create_meal(store: &dyn RecordStore, account_id: Uuid, draft: MealDraft) -> AppResult<Meal> {
    let host = require_profile(store, account_id)?;
    require_location(store, draft.location_id)?;

    let meal = store.create_meal(NewMeal {
        host_id: host.id,
        location_id: draft.location_id,
        title: draft.title,
        description: draft.description,
        start_time: draft.start_time,
        end_time: draft.end_time,
        max_guests: draft.max_guests,
        status: MealStatus::Open,
    })?;

    tracing::info!(
        meal_id = %meal.id,
        host_id = %host.id,
        max_guests = meal.max_guests,
        "meal created"
    );

    Ok(meal)
}

pub fn list_meals(
    store: &dyn RecordStore,
    filter: &MealFilter,
    page: &PaginationParams,
) -> AppResult<Paginated<Meal>> {
    let (items, total) = store.list_meals(filter, page)?;
    Ok(Paginated::new(items, total, page))
}

pub fn meal_detail(
    store: &dyn RecordStore,
    meal_id: Uuid,
    viewer_account: Option<Uuid>,
) -> AppResult<MealDetail> {
    let meal = require_meal(store, meal_id)?;
    let viewer = match viewer_account {
        Some(account_id) => store.profile_by_account(account_id)?,
        None => None,
    };

    let join_requests = store.join_requests_for_meal(meal.id)?;
    let accepted_guests = store.count_accepted(meal.id)?;

    let (can_chat, reviewed_user_ids, has_requested) = match &viewer {
        Some(profile) => (
            chat::can_chat(store, &meal, profile.id)?,
            store.reviewed_user_ids(profile.id, meal.id)?,
            join_requests.iter().any(|r| r.requester_id == profile.id),
        ),
        None => (false, Vec::new(), false),
    };
    let messages = if can_chat {
        Some(store.messages_for_meal(meal.id)?)
    } else {
        None
    };

    Ok(MealDetail {
        host: store.get_profile(meal.host_id)?,
        location: store.get_location(meal.location_id)?,
        meal,
        join_requests,
        accepted_guests,
        can_chat,
        messages,
        reviewed_user_ids,
        has_requested,
    })
}

/// Load a meal the acting account hosts.
fn hosted_meal(store: &dyn RecordStore, account_id: Uuid, meal_id: Uuid) -> AppResult<Meal> {
    let profile = require_profile(store, account_id)?;
    let meal = require_meal(store, meal_id)?;
    if !meal.is_hosted_by(profile.id) {
        return Err(AppError::new(ErrorCode::NotMealHost, "only the host can change this meal"));
    }
    Ok(meal)
}

pub fn update_meal(
    store: &dyn RecordStore,
    account_id: Uuid,
    meal_id: Uuid,
    changes: UpdateMeal,
) -> AppResult<Meal> {
    let meal = hosted_meal(store, account_id, meal_id)?;
    if let Some(location_id) = changes.location_id {
        require_location(store, location_id)?;
    }

    let updated = store.update_meal(meal.id, changes)?;
    if updated.status != meal.status {
        tracing::info!(
            meal_id = %updated.id,
            from = %meal.status.as_str(),
            to = %updated.status.as_str(),
            "meal status changed by host"
        );
    } else {
        tracing::debug!(meal_id = %updated.id, "meal updated");
    }

    Ok(updated)
}

pub fn delete_meal(store: &dyn RecordStore, account_id: Uuid, meal_id: Uuid) -> AppResult<()> {
    let meal = hosted_meal(store, account_id, meal_id)?;
    store.delete_meal(meal.id)?;
    tracing::info!(meal_id = %meal.id, "meal deleted");
    Ok(())
}

pub fn hosted_meals(store: &dyn RecordStore, account_id: Uuid) -> AppResult<Vec<Meal>> {
    let profile = require_profile(store, account_id)?;
    store.meals_hosted_by(profile.id)
}

pub fn joined_meals(store: &dyn RecordStore, account_id: Uuid) -> AppResult<Vec<Meal>> {
    let profile = require_profile(store, account_id)?;
    store.meals_joined_by(profile.id)
}

pub fn calendar_file(store: &dyn RecordStore, meal_id: Uuid) -> AppResult<CalendarFile> {
    let meal = require_meal(store, meal_id)?;
    let host_name = store
        .get_profile(meal.host_id)?
        .map(|p| p.display_name)
        .unwrap_or_default();
    let location_name = store
        .get_location(meal.location_id)?
        .map(|l| l.name)
        .unwrap_or_default();

    Ok(CalendarFile {
        filename: format!("meal_{}.ics", meal.id),
        body: calendar::render_ics(&meal, &host_name, &location_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewJoinRequest, NewMealMessage};
    use crate::participation::HostAction;
    use crate::services::testing;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn draft(location_id: Uuid) -> MealDraft {
        MealDraft {
            location_id,
            title: "Brunch".into(),
            description: None,
            start_time: Utc::now() + Duration::hours(3),
            end_time: None,
            max_guests: 2,
        }
    }

    #[test]
    fn creating_a_meal_requires_a_profile() {
        let store = MemoryStore::new();
        let loc = testing::location(&store, "Warren");
        let err = create_meal(&store, Uuid::new_v4(), draft(loc.id)).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ProfileRequired));
    }

    #[test]
    fn new_meals_start_open() {
        let store = MemoryStore::new();
        let host = testing::profile(&store, "Host");
        let loc = testing::location(&store, "Warren");

        let meal = create_meal(&store, host.account_id, draft(loc.id)).unwrap();
        assert_eq!(meal.status, MealStatus::Open);
        assert_eq!(meal.host_id, host.id);
    }

    #[test]
    fn only_the_host_may_edit_or_delete() {
        let store = MemoryStore::new();
        let host = testing::profile(&store, "Host");
        let other = testing::profile(&store, "Other");
        let meal = testing::meal(&store, &host, 2);

        let err = update_meal(
            &store,
            other.account_id,
            meal.id,
            UpdateMeal {
                title: Some("Mine now".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotMealHost));

        let err = delete_meal(&store, other.account_id, meal.id).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotMealHost));
        assert!(store.get_meal(meal.id).unwrap().is_some());
    }

    #[test]
    fn host_can_close_a_meal_manually() {
        let store = MemoryStore::new();
        let host = testing::profile(&store, "Host");
        let meal = testing::meal(&store, &host, 2);

        let updated = update_meal(
            &store,
            host.account_id,
            meal.id,
            UpdateMeal {
                status: Some(MealStatus::Completed),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.status, MealStatus::Completed);
    }

    #[test]
    fn detail_hides_chat_from_outsiders() {
        let store = MemoryStore::new();
        let host = testing::profile(&store, "Host");
        let meal = testing::meal(&store, &host, 2);
        let outsider = testing::profile(&store, "Outsider");
        store
            .create_message(NewMealMessage {
                meal_id: meal.id,
                sender_id: host.id,
                message: "see you at 6".into(),
            })
            .unwrap();

        let anonymous = meal_detail(&store, meal.id, None).unwrap();
        assert!(!anonymous.can_chat);
        assert!(anonymous.messages.is_none());
        assert!(!anonymous.has_requested);

        let outside = meal_detail(&store, meal.id, Some(outsider.account_id)).unwrap();
        assert!(!outside.can_chat);

        let hosted = meal_detail(&store, meal.id, Some(host.account_id)).unwrap();
        assert!(hosted.can_chat);
        assert_eq!(hosted.messages.map(|m| m.len()), Some(1));
        assert_eq!(hosted.host.map(|h| h.id), Some(host.id));
    }

    #[test]
    fn detail_reports_requests_and_accepted_count() {
        let store = MemoryStore::new();
        let host = testing::profile(&store, "Host");
        let meal = testing::meal(&store, &host, 2);
        let guest = testing::profile(&store, "Guest");
        let request = store
            .create_join_request(NewJoinRequest {
                meal_id: meal.id,
                requester_id: guest.id,
                message: Some("hi".into()),
            })
            .unwrap();
        store
            .transition_join_request(request.id, host.id, HostAction::Accept)
            .unwrap();

        let detail = meal_detail(&store, meal.id, Some(guest.account_id)).unwrap();
        assert!(detail.has_requested);
        assert!(detail.can_chat);
        assert_eq!(detail.accepted_guests, 1);
        assert_eq!(detail.join_requests.len(), 1);

        assert_eq!(joined_meals(&store, guest.account_id).unwrap().len(), 1);
        assert_eq!(hosted_meals(&store, host.account_id).unwrap().len(), 1);
        assert!(hosted_meals(&store, guest.account_id).unwrap().is_empty());
    }

    #[test]
    fn calendar_file_is_named_after_the_meal() {
        let store = MemoryStore::new();
        let host = testing::profile(&store, "Sam");
        let meal = testing::meal(&store, &host, 2);

        let file = calendar_file(&store, meal.id).unwrap();
        assert_eq!(file.filename, format!("meal_{}.ics", meal.id));
        assert!(file.body.contains("LOCATION:Warren Dining Hall\r\n"));
        assert!(file.body.contains("DESCRIPTION:Host: Sam\\nGrabbing pasta\r\n"));
    }

    #[test]
    fn listing_filters_by_status() {
        let store = MemoryStore::new();
        let host = testing::profile(&store, "Host");
        let open = testing::meal(&store, &host, 2);
        let closed = testing::meal(&store, &host, 2);
        store
            .update_meal(
                closed.id,
                UpdateMeal {
                    status: Some(MealStatus::Canceled),
                    ..Default::default()
                },
            )
            .unwrap();

        let filter = MealFilter {
            status: Some(MealStatus::Open),
            ..Default::default()
        };
        let page = list_meals(&store, &filter, &PaginationParams::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, open.id);
    }
}
