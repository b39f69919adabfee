use std::collections::HashMap;

use uuid::Uuid;

use mealmatch_shared::errors::AppResult;

use crate::matching::{self, Match, UserPreference};
use crate::store::RecordStore;

use super::{profiles, require_profile};

/// Every other profile ranked by compatibility with the acting account.
pub fn find_matches(store: &dyn RecordStore, account_id: Uuid) -> AppResult<Vec<Match>> {
    let viewer = require_profile(store, account_id)?;

    let locations: HashMap<_, _> = store
        .list_locations()?
        .into_iter()
        .map(|l| (l.id, l))
        .collect();
    let viewer_preference = UserPreference::from_profile(&viewer, &locations);

    let candidates = store
        .profiles_except(viewer.id)?
        .into_iter()
        .map(|p| {
            let preference = UserPreference::from_profile(&p, &locations);
            (p, preference)
        })
        .collect();

    let matches = matching::rank_candidates(&viewer_preference, candidates, |p| {
        profiles::karma_for(store, p.id)
    })?;

    tracing::debug!(profile_id = %viewer.id, matches = matches.len(), "matches computed");
    Ok(matches)
}
