//! Closed choice lists for profile preferences and record statuses.
//!
//! Each enum is stored as its lowercase value in a `VARCHAR` column and
//! rendered with a human label (`"Late Night"`, `"Study + eat"`) in match
//! reasons and calendar text.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($value:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
            diesel::expression::AsExpression, diesel::deserialize::FromSqlRow,
        )]
        #[diesel(sql_type = diesel::sql_types::Text)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stored value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }

            /// Human-readable label.
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} value: {other}", stringify!($name))),
                }
            }
        }

        impl diesel::serialize::ToSql<diesel::sql_types::Text, diesel::pg::Pg> for $name {
            fn to_sql<'b>(
                &'b self,
                out: &mut diesel::serialize::Output<'b, '_, diesel::pg::Pg>,
            ) -> diesel::serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(diesel::serialize::IsNull::No)
            }
        }

        impl diesel::deserialize::FromSql<diesel::sql_types::Text, diesel::pg::Pg> for $name {
            fn from_sql(bytes: diesel::pg::PgValue<'_>) -> diesel::deserialize::Result<Self> {
                let raw = <String as diesel::deserialize::FromSql<
                    diesel::sql_types::Text,
                    diesel::pg::Pg,
                >>::from_sql(bytes)?;
                raw.parse::<Self>().map_err(Into::into)
            }
        }
    };
}

choice_enum! {
    DietaryPreference {
        NoPreference => ("none", "None"),
        Vegetarian => ("vegetarian", "Vegetarian"),
        Vegan => ("vegan", "Vegan"),
        Halal => ("halal", "Halal"),
        Kosher => ("kosher", "Kosher"),
        Other => ("other", "Other"),
    }
}

choice_enum! {
    MealTime {
        Breakfast => ("breakfast", "Breakfast"),
        Lunch => ("lunch", "Lunch"),
        Dinner => ("dinner", "Dinner"),
        LateNight => ("late_night", "Late Night"),
    }
}

choice_enum! {
    Vibe {
        QuickMeal => ("quick_meal", "Quick meal"),
        StudyAndEat => ("study_and_eat", "Study + eat"),
        GymBros => ("gym_bros", "Gym bros"),
        Social => ("social", "Social"),
        Casual => ("casual", "Casual"),
    }
}

choice_enum! {
    SocialBattery {
        Low => ("low", "Low"),
        Medium => ("medium", "Medium"),
        High => ("high", "High"),
    }
}

choice_enum! {
    Interest {
        Sports => ("sports", "Sports"),
        Music => ("music", "Music"),
        Gaming => ("gaming", "Gaming"),
        Tech => ("tech", "Tech"),
        Arts => ("arts", "Arts"),
        Outdoors => ("outdoors", "Outdoors"),
    }
}

choice_enum! {
    SpiceTolerance {
        NoPreference => ("none", "None"),
        Mild => ("mild", "Mild"),
        Medium => ("medium", "Medium"),
        Hot => ("hot", "Hot"),
    }
}

choice_enum! {
    MealStatus {
        Open => ("open", "Open"),
        Full => ("full", "Full"),
        Completed => ("completed", "Completed"),
        Canceled => ("canceled", "Canceled"),
    }
}

choice_enum! {
    JoinStatus {
        Pending => ("pending", "Pending"),
        Accepted => ("accepted", "Accepted"),
        Waitlisted => ("waitlisted", "Waitlisted"),
        Declined => ("declined", "Declined"),
    }
}

impl DietaryPreference {
    /// "Eats everything": matching on it earns points but says nothing.
    pub fn is_neutral(self) -> bool {
        matches!(self, Self::NoPreference)
    }
}

impl SpiceTolerance {
    pub fn is_neutral(self) -> bool {
        matches!(self, Self::NoPreference)
    }
}

impl Default for DietaryPreference {
    fn default() -> Self { Self::NoPreference }
}

impl Default for MealTime {
    fn default() -> Self { Self::Lunch }
}

impl Default for Vibe {
    fn default() -> Self { Self::Casual }
}

impl Default for SocialBattery {
    fn default() -> Self { Self::Medium }
}

impl Default for Interest {
    fn default() -> Self { Self::Sports }
}

impl Default for SpiceTolerance {
    fn default() -> Self { Self::NoPreference }
}

impl Default for MealStatus {
    fn default() -> Self { Self::Open }
}
