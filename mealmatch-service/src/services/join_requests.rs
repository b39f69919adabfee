use metrics::counter;
use uuid::Uuid;

use mealmatch_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{JoinRequest, MealStatus, NewJoinRequest};
use crate::participation::{HostAction, JoinTransition};
use crate::store::RecordStore;

use super::{require_meal, require_profile};

pub fn request_to_join(
    store: &dyn RecordStore,
    account_id: Uuid,
    meal_id: Uuid,
    message: Option<String>,
) -> AppResult<JoinRequest> {
    let requester = require_profile(store, account_id)?;
    let meal = require_meal(store, meal_id)?;

    if meal.is_hosted_by(requester.id) {
        return Err(AppError::new(ErrorCode::CannotJoinOwnMeal, "you cannot join your own meal"));
    }
    // Full meals still take requests so the host can waitlist them.
    if matches!(meal.status, MealStatus::Completed | MealStatus::Canceled) {
        return Err(AppError::new(
            ErrorCode::MealNotOpen,
            format!("meal is {} and no longer accepting requests", meal.status),
        ));
    }

    let request = store.create_join_request(NewJoinRequest {
        meal_id: meal.id,
        requester_id: requester.id,
        message,
    })?;

    tracing::info!(
        request_id = %request.id,
        meal_id = %meal.id,
        requester_id = %requester.id,
        "join request created"
    );

    Ok(request)
}

/// Load a request the acting account made.
fn own_request(
    store: &dyn RecordStore,
    account_id: Uuid,
    request_id: Uuid,
) -> AppResult<JoinRequest> {
    let profile = require_profile(store, account_id)?;
    let request = store
        .get_join_request(request_id)?
        .ok_or_else(|| AppError::new(ErrorCode::JoinRequestNotFound, "join request not found"))?;
    if request.requester_id != profile.id {
        return Err(AppError::forbidden("only the requester can change this join request"));
    }
    Ok(request)
}

pub fn edit_message(
    store: &dyn RecordStore,
    account_id: Uuid,
    request_id: Uuid,
    message: Option<String>,
) -> AppResult<JoinRequest> {
    let request = own_request(store, account_id, request_id)?;
    store.update_join_message(request.id, message)
}

/// Withdraw a request. An accepted guest leaving frees a seat but does not
/// reopen a full meal; the host does that by editing the meal.
pub fn cancel_request(
    store: &dyn RecordStore,
    account_id: Uuid,
    request_id: Uuid,
) -> AppResult<()> {
    let request = own_request(store, account_id, request_id)?;
    store.delete_join_request(request.id)?;
    tracing::info!(
        request_id = %request.id,
        meal_id = %request.meal_id,
        status = request.status.as_str(),
        "join request cancelled"
    );
    Ok(())
}

/// Host decision on a join request.
pub fn decide(
    store: &dyn RecordStore,
    account_id: Uuid,
    request_id: Uuid,
    action: HostAction,
) -> AppResult<JoinTransition> {
    let host = require_profile(store, account_id)?;

    let result = store.transition_join_request(request_id, host.id, action);
    let outcome = match &result {
        Ok(t) if t.changed => "applied",
        Ok(_) => "unchanged",
        Err(_) => "rejected",
    };
    counter!(
        "mealmatch_join_transitions_total",
        "action" => action.as_str(),
        "outcome" => outcome
    )
    .increment(1);

    let transition = match result {
        Ok(t) => t,
        Err(err) => {
            tracing::debug!(
                request_id = %request_id,
                action = %action,
                error = %err,
                "join transition rejected"
            );
            return Err(err);
        }
    };

    tracing::info!(
        request_id = %request_id,
        meal_id = %transition.request.meal_id,
        action = %action,
        status = transition.request.status.as_str(),
        accepted_guests = transition.accepted_guests,
        changed = transition.changed,
        "join transition"
    );
    if transition.meal_became_full {
        counter!("mealmatch_meals_filled_total").increment(1);
        tracing::info!(meal_id = %transition.request.meal_id, "meal is now full");
    }

    Ok(transition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JoinStatus, UpdateMeal};
    use crate::services::testing;
    use crate::store::MemoryStore;

    #[test]
    fn host_cannot_join_own_meal() {
        let store = MemoryStore::new();
        let host = testing::profile(&store, "Host");
        let meal = testing::meal(&store, &host, 2);

        let err = request_to_join(&store, host.account_id, meal.id, None).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::CannotJoinOwnMeal));
    }

    #[test]
    fn canceled_meal_takes_no_requests() {
        let store = MemoryStore::new();
        let host = testing::profile(&store, "Host");
        let meal = testing::meal(&store, &host, 2);
        store
            .update_meal(
                meal.id,
                UpdateMeal {
                    status: Some(MealStatus::Canceled),
                    ..Default::default()
                },
            )
            .unwrap();
        let guest = testing::profile(&store, "Guest");

        let err = request_to_join(&store, guest.account_id, meal.id, None).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::MealNotOpen));
    }

    #[test]
    fn only_requester_edits_or_cancels() {
        let store = MemoryStore::new();
        let host = testing::profile(&store, "Host");
        let meal = testing::meal(&store, &host, 2);
        let guest = testing::profile(&store, "Guest");
        let request =
            request_to_join(&store, guest.account_id, meal.id, Some("hi".into())).unwrap();

        let err = edit_message(&store, host.account_id, request.id, None).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::Forbidden));

        let edited =
            edit_message(&store, guest.account_id, request.id, Some("vegan ok?".into())).unwrap();
        assert_eq!(edited.message.as_deref(), Some("vegan ok?"));

        cancel_request(&store, guest.account_id, request.id).unwrap();
        assert!(store.get_join_request(request.id).unwrap().is_none());
    }

    #[test]
    fn two_seat_meal_scenario() {
        let store = MemoryStore::new();
        let host = testing::profile(&store, "Host");
        let meal = testing::meal(&store, &host, 2);
        let requests: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|name| {
                let guest = testing::profile(&store, name);
                request_to_join(&store, guest.account_id, meal.id, None).unwrap()
            })
            .collect();

        let first = decide(&store, host.account_id, requests[0].id, HostAction::Accept).unwrap();
        assert_eq!(first.meal_status, MealStatus::Open);

        let second = decide(&store, host.account_id, requests[1].id, HostAction::Accept).unwrap();
        assert_eq!(second.meal_status, MealStatus::Full);

        let err = decide(&store, host.account_id, requests[2].id, HostAction::Accept).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::MealFull));
        assert_eq!(store.count_accepted(meal.id).unwrap(), 2);

        let waitlisted =
            decide(&store, host.account_id, requests[2].id, HostAction::Waitlist).unwrap();
        assert_eq!(waitlisted.request.status, JoinStatus::Waitlisted);
    }

    #[test]
    fn guest_cannot_decide_their_own_request() {
        let store = MemoryStore::new();
        let host = testing::profile(&store, "Host");
        let meal = testing::meal(&store, &host, 2);
        let guest = testing::profile(&store, "Guest");
        let request = request_to_join(&store, guest.account_id, meal.id, None).unwrap();

        let err = decide(&store, guest.account_id, request.id, HostAction::Accept).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotMealHost));
        assert_eq!(
            store.get_join_request(request.id).unwrap().unwrap().status,
            JoinStatus::Pending
        );
    }
}
