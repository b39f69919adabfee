//! Host decisions on join requests.
//!
//! `plan` is the pure half: given the current request status and a fresh
//! view of the meal (status, accepted count, capacity) it decides what the
//! store must write. Both stores call it after taking their lock on the
//! meal, so the accepted count it sees cannot change underneath it.

use std::fmt;

use serde::Serialize;

use mealmatch_shared::errors::{AppError, ErrorCode};

use crate::models::{JoinRequest, JoinStatus, MealStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostAction {
    Accept,
    Decline,
    Waitlist,
}

impl HostAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Decline => "decline",
            Self::Waitlist => "waitlist",
        }
    }

    fn target(self) -> JoinStatus {
        match self {
            Self::Accept => JoinStatus::Accepted,
            Self::Decline => JoinStatus::Declined,
            Self::Waitlist => JoinStatus::Waitlisted,
        }
    }
}

impl fmt::Display for HostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a transition writes. `request_status == None` means nothing changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub request_status: Option<JoinStatus>,
    pub meal_status: MealStatus,
    pub accepted_guests: i64,
    pub meal_became_full: bool,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.request_status.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("accepted join requests cannot be declined or waitlisted")]
    AlreadyAccepted,
    #[error("meal is full ({accepted}/{max_guests} guests accepted)")]
    MealFull { accepted: i64, max_guests: i32 },
    #[error("meal is {0} and no longer accepting guests")]
    MealNotOpen(MealStatus),
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        let code = match err {
            TransitionError::AlreadyAccepted => ErrorCode::JoinRequestFinal,
            TransitionError::MealFull { .. } => ErrorCode::MealFull,
            TransitionError::MealNotOpen(_) => ErrorCode::MealNotOpen,
        };
        AppError::new(code, err.to_string())
    }
}

/// Decide the outcome of `action` on a request currently in `current`.
///
/// Accept checks capacity before meal status so a meal flipped to full by
/// the previous accept reports `MealFull`.
pub fn plan(
    action: HostAction,
    current: JoinStatus,
    meal_status: MealStatus,
    accepted: i64,
    max_guests: i32,
) -> Result<Transition, TransitionError> {
    let unchanged = Transition {
        request_status: None,
        meal_status,
        accepted_guests: accepted,
        meal_became_full: false,
    };

    if current == JoinStatus::Accepted {
        return match action {
            HostAction::Accept => Ok(unchanged),
            _ => Err(TransitionError::AlreadyAccepted),
        };
    }

    match action {
        HostAction::Accept => {
            let capacity = i64::from(max_guests);
            if accepted >= capacity {
                return Err(TransitionError::MealFull {
                    accepted,
                    max_guests,
                });
            }
            if meal_status != MealStatus::Open {
                return Err(TransitionError::MealNotOpen(meal_status));
            }

            let accepted_guests = accepted + 1;
            let meal_became_full = accepted_guests >= capacity;
            Ok(Transition {
                request_status: Some(JoinStatus::Accepted),
                meal_status: if meal_became_full { MealStatus::Full } else { meal_status },
                accepted_guests,
                meal_became_full,
            })
        }
        HostAction::Decline | HostAction::Waitlist => {
            let target = action.target();
            if current == target {
                return Ok(unchanged);
            }
            Ok(Transition {
                request_status: Some(target),
                ..unchanged
            })
        }
    }
}

/// Result of a host decision as reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct JoinTransition {
    pub request: JoinRequest,
    pub action: HostAction,
    pub meal_status: MealStatus,
    pub accepted_guests: i64,
    pub meal_became_full: bool,
    pub changed: bool,
}

impl JoinTransition {
    /// Report `transition` applied to `request`; `request` is the row as it
    /// was read, before the write.
    pub fn new(mut request: JoinRequest, action: HostAction, transition: Transition) -> Self {
        if let Some(status) = transition.request_status {
            request.status = status;
        }
        Self {
            request,
            action,
            meal_status: transition.meal_status,
            accepted_guests: transition.accepted_guests,
            meal_became_full: transition.meal_became_full,
            changed: transition.changed(),
        }
    }
}
