use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{
    DietaryPreference, DiningLocation, Interest, MealTime, Profile, SocialBattery, SpiceTolerance,
    Vibe,
};

use super::round_one_decimal;

// -- Weights: one independent bonus per matching field --
const W_LOCATION: u32 = 3;
const W_MEAL_TIME: u32 = 2;
const W_DIET: u32 = 2;
const W_VIBE: u32 = 1;
const W_SOCIAL_BATTERY: u32 = 2;
const W_INTEREST: u32 = 2;
const W_SPICE: u32 = 1;

/// Highest attainable raw score: every field matches.
pub const MAX_RAW_SCORE: u32 =
    W_LOCATION + W_MEAL_TIME + W_DIET + W_VIBE + W_SOCIAL_BATTERY + W_INTEREST + W_SPICE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferredLocation {
    pub id: Uuid,
    pub name: String,
}

/// The preference slice of a profile that compatibility is computed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPreference {
    pub preferred_location: Option<PreferredLocation>,
    pub usual_meal_time: MealTime,
    pub dietary_preference: DietaryPreference,
    pub vibe: Vibe,
    pub social_battery: SocialBattery,
    pub interest: Interest,
    pub spice_tolerance: SpiceTolerance,
}

impl UserPreference {
    /// Build from a stored profile. A preferred location missing from
    /// `locations` is treated as unset.
    pub fn from_profile(profile: &Profile, locations: &HashMap<Uuid, DiningLocation>) -> Self {
        let preferred_location = profile
            .preferred_location_id
            .and_then(|id| locations.get(&id))
            .map(|loc| PreferredLocation {
                id: loc.id,
                name: loc.name.clone(),
            });

        Self {
            preferred_location,
            usual_meal_time: profile.usual_meal_time,
            dietary_preference: profile.dietary_preference,
            vibe: profile.vibe,
            social_battery: profile.social_battery,
            interest: profile.interest,
            spice_tolerance: profile.spice_tolerance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compatibility {
    pub raw: u32,
    pub reasons: Vec<String>,
}

impl Compatibility {
    /// Raw score normalised to 0–10, one decimal.
    pub fn scaled(&self) -> f64 {
        round_one_decimal(f64::from(self.raw) / f64::from(MAX_RAW_SCORE) * 10.0)
    }
}

/// Score `candidate` from `viewer`'s point of view. Reasons are emitted in
/// field order; neutral diet/spice matches score but stay silent.
pub fn score(viewer: &UserPreference, candidate: &UserPreference) -> Compatibility {
    let mut raw = 0;
    let mut reasons = Vec::new();

    if let (Some(mine), Some(theirs)) =
        (&viewer.preferred_location, &candidate.preferred_location)
    {
        if mine.id == theirs.id {
            raw += W_LOCATION;
            reasons.push(format!("Same preferred location: {}", mine.name));
        }
    }

    if viewer.usual_meal_time == candidate.usual_meal_time {
        raw += W_MEAL_TIME;
        reasons.push(format!("Same meal time: {}", viewer.usual_meal_time));
    }

    if viewer.dietary_preference == candidate.dietary_preference {
        raw += W_DIET;
        if !viewer.dietary_preference.is_neutral() {
            reasons.push(format!("Same dietary preference: {}", viewer.dietary_preference));
        }
    }

    if viewer.vibe == candidate.vibe {
        raw += W_VIBE;
        reasons.push(format!("Same vibe: {}", viewer.vibe));
    }

    if viewer.social_battery == candidate.social_battery {
        raw += W_SOCIAL_BATTERY;
        reasons.push(format!("Same social battery: {}", viewer.social_battery));
    }

    if viewer.interest == candidate.interest {
        raw += W_INTEREST;
        reasons.push(format!("Same interest: {}", viewer.interest));
    }

    if viewer.spice_tolerance == candidate.spice_tolerance {
        raw += W_SPICE;
        if !viewer.spice_tolerance.is_neutral() {
            reasons.push(format!("Same spice tolerance: {}", viewer.spice_tolerance));
        }
    }

    Compatibility { raw, reasons }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(name: &str) -> PreferredLocation {
        PreferredLocation {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    fn preference() -> UserPreference {
        UserPreference {
            preferred_location: Some(location("Warren Dining Hall")),
            usual_meal_time: MealTime::Dinner,
            dietary_preference: DietaryPreference::Vegetarian,
            vibe: Vibe::Social,
            social_battery: SocialBattery::High,
            interest: Interest::Music,
            spice_tolerance: SpiceTolerance::Hot,
        }
    }

    fn opposite() -> UserPreference {
        UserPreference {
            preferred_location: Some(location("Marciano Commons")),
            usual_meal_time: MealTime::Breakfast,
            dietary_preference: DietaryPreference::Halal,
            vibe: Vibe::QuickMeal,
            social_battery: SocialBattery::Low,
            interest: Interest::Gaming,
            spice_tolerance: SpiceTolerance::Mild,
        }
    }

    #[test]
    fn max_raw_score_is_thirteen() {
        assert_eq!(MAX_RAW_SCORE, 13);
    }

    #[test]
    fn identical_preferences_score_ten() {
        let a = preference();
        let result = score(&a, &a.clone());

        assert_eq!(result.raw, 13);
        assert_eq!(result.scaled(), 10.0);
        assert_eq!(
            result.reasons,
            vec![
                "Same preferred location: Warren Dining Hall",
                "Same meal time: Dinner",
                "Same dietary preference: Vegetarian",
                "Same vibe: Social",
                "Same social battery: High",
                "Same interest: Music",
                "Same spice tolerance: Hot",
            ]
        );
    }

    #[test]
    fn identical_without_location_gives_six_reasons() {
        let mut a = preference();
        a.preferred_location = None;
        let result = score(&a, &a.clone());

        assert_eq!(result.raw, 10);
        assert_eq!(result.reasons.len(), 6);
        assert_eq!(result.scaled(), 7.7);
    }

    #[test]
    fn nothing_in_common_scores_zero() {
        let result = score(&preference(), &opposite());
        assert_eq!(result.raw, 0);
        assert!(result.reasons.is_empty());
        assert_eq!(result.scaled(), 0.0);
    }

    #[test]
    fn neutral_diet_and_spice_score_without_reasons() {
        let mut a = opposite();
        a.dietary_preference = DietaryPreference::NoPreference;
        a.spice_tolerance = SpiceTolerance::NoPreference;
        let mut b = preference();
        b.dietary_preference = DietaryPreference::NoPreference;
        b.spice_tolerance = SpiceTolerance::NoPreference;

        let result = score(&a, &b);
        assert_eq!(result.raw, 3);
        assert!(result.reasons.is_empty());
        assert_eq!(result.scaled(), 2.3);
    }

    #[test]
    fn location_only_counts_when_both_set() {
        let mut a = opposite();
        let mut b = opposite();
        a.preferred_location = None;
        b.usual_meal_time = MealTime::Lunch;
        b.dietary_preference = DietaryPreference::Kosher;
        b.vibe = Vibe::Casual;
        b.social_battery = SocialBattery::Medium;
        b.interest = Interest::Arts;
        b.spice_tolerance = SpiceTolerance::Medium;

        assert_eq!(score(&a, &b).raw, 0);

        a.preferred_location = b.preferred_location.clone();
        let result = score(&a, &b);
        assert_eq!(result.raw, 3);
        assert_eq!(result.reasons, vec!["Same preferred location: Marciano Commons"]);
    }

    #[test]
    fn scaling_rounds_to_one_decimal() {
        let scaled = |raw| {
            Compatibility {
                raw,
                reasons: vec![],
            }
            .scaled()
        };
        assert_eq!(scaled(1), 0.8);
        assert_eq!(scaled(5), 3.8);
        assert_eq!(scaled(12), 9.2);
    }

    #[test]
    fn labels_appear_in_reasons() {
        let mut a = opposite();
        a.usual_meal_time = MealTime::LateNight;
        a.vibe = Vibe::StudyAndEat;
        let mut b = preference();
        b.usual_meal_time = MealTime::LateNight;
        b.vibe = Vibe::StudyAndEat;

        let result = score(&a, &b);
        assert_eq!(
            result.reasons,
            vec!["Same meal time: Late Night", "Same vibe: Study + eat"]
        );
    }
}
