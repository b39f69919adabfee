pub mod karma;
pub mod scorer;

use serde::Serialize;

use mealmatch_shared::errors::AppResult;

use crate::models::Profile;

pub use karma::karma;
pub use scorer::{score, Compatibility, PreferredLocation, UserPreference, MAX_RAW_SCORE};

/// One decimal, exact halves to even (`1.25` -> `1.2`, `1.35` -> `1.4`).
pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// One ranked candidate on the viewer's match page.
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub profile: Profile,
    pub score: f64,
    pub karma: Option<f64>,
    pub reasons: Vec<String>,
}

/// Score every candidate against `viewer`, drop those with nothing in
/// common and sort best first. Ties keep candidate order.
///
/// `karma_of` is only consulted for candidates that make the list.
pub fn rank_candidates<F>(
    viewer: &UserPreference,
    candidates: Vec<(Profile, UserPreference)>,
    mut karma_of: F,
) -> AppResult<Vec<Match>>
where
    F: FnMut(&Profile) -> AppResult<Option<f64>>,
{
    let mut matches = Vec::new();

    for (profile, preference) in candidates {
        let compatibility = score(viewer, &preference);
        if compatibility.raw == 0 {
            continue;
        }

        let karma = karma_of(&profile)?;
        matches.push(Match {
            score: compatibility.scaled(),
            reasons: compatibility.reasons,
            karma,
            profile,
        });
    }

    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(matches)
}
