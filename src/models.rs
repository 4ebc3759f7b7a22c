use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::load::session_load;
use crate::validation;
use crate::wellness::sleep_duration_hours;

/// User role; gates every staff-only operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Player,
}

impl Role {
    /// Staff and admins can review squad data and edit schedules
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Staff => write!(f, "staff"),
            Role::Player => write!(f, "player"),
        }
    }
}

/// User identity and display fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Backend user id
    pub id: String,

    pub display_name: String,

    pub role: Role,

    /// Playing position, players only
    pub position: Option<String>,

    pub squad_number: Option<u8>,

    /// Inactive profiles are left out of squad overviews
    pub active: bool,
}

impl Profile {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Profile {
            id: id.into(),
            display_name: display_name.into(),
            role,
            position: None,
            squad_number: None,
            active: true,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

/// Daily wellness questionnaire, one per player per day
///
/// All 1-10 scales are "higher is more": a fatigue of 9 means very tired,
/// a sleep quality of 9 means slept very well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessEntry {
    pub id: Uuid,

    pub user_id: String,

    pub date: NaiveDate,

    /// Bed time as a local HH:MM clock string
    pub bed_time: Option<String>,

    /// Wake time as a local HH:MM clock string
    pub wake_time: Option<String>,

    /// Sleep duration in hours derived from bed/wake time
    pub sleep_hours: Option<f64>,

    pub sleep_quality: Option<u8>,
    pub fatigue: Option<u8>,
    pub soreness: Option<u8>,
    pub stress: Option<u8>,
    pub mood: Option<u8>,
    pub motivation: Option<u8>,

    /// Morning bodyweight in kilograms
    pub bodyweight_kg: Option<Decimal>,

    pub illness: Option<bool>,

    /// Per body part soreness or pain, 1-10
    #[serde(default)]
    pub body_soreness: BTreeMap<String, u8>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl WellnessEntry {
    /// Create an empty entry for a player and day
    pub fn new(user_id: impl Into<String>, date: NaiveDate) -> Self {
        WellnessEntry {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            date,
            bed_time: None,
            wake_time: None,
            sleep_hours: None,
            sleep_quality: None,
            fatigue: None,
            soreness: None,
            stress: None,
            mood: None,
            motivation: None,
            bodyweight_kg: None,
            illness: None,
            body_soreness: BTreeMap::new(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Validate a player submission and fill in the derived sleep duration
    pub fn submit(mut self) -> Result<Self, ValidationError> {
        validation::validate_wellness(&self)?;
        self.sleep_hours = sleep_duration_hours(self.bed_time.as_deref(), self.wake_time.as_deref());
        Ok(self)
    }

    /// Stored sleep duration, or one derived from bed/wake time
    pub fn resolved_sleep_hours(&self) -> Option<f64> {
        self.sleep_hours
            .or_else(|| sleep_duration_hours(self.bed_time.as_deref(), self.wake_time.as_deref()))
            .filter(|hours| hours.is_finite())
    }
}

/// A single training session with its perceived exertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub id: Uuid,

    pub user_id: String,

    pub date: NaiveDate,

    /// Session duration in minutes
    pub duration_minutes: u16,

    /// Rate of perceived exertion, 1-10
    pub rpe: Option<u8>,

    /// Session load (duration x RPE); absent without an RPE
    pub load: Option<f64>,

    /// Free-form label such as "pitch" or "gym"
    pub session_type: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl SessionEntry {
    pub fn new(
        user_id: impl Into<String>,
        date: NaiveDate,
        duration_minutes: u16,
        rpe: Option<u8>,
    ) -> Self {
        SessionEntry {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            date,
            duration_minutes,
            rpe,
            load: rpe.map(|rpe| session_load(f64::from(duration_minutes), f64::from(rpe))),
            session_type: None,
            created_at: Utc::now(),
        }
    }

    /// Validate a player submission and recompute the derived load
    pub fn submit(mut self) -> Result<Self, ValidationError> {
        validation::validate_session(&self)?;
        self.load = self
            .rpe
            .map(|rpe| session_load(f64::from(self.duration_minutes), f64::from(rpe)));
        Ok(self)
    }

    /// Load contribution, zero when no RPE was given
    pub fn load_or_zero(&self) -> f64 {
        self.load.unwrap_or(0.0)
    }
}

/// Kinds of activity on the team schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Meal,
    Training,
    Recovery,
    Match,
    Gym,
    Meeting,
    Travel,
    Rest,
    Other,
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityType::Meal => "Meal",
            ActivityType::Training => "Training",
            ActivityType::Recovery => "Recovery",
            ActivityType::Match => "Match",
            ActivityType::Gym => "Gym",
            ActivityType::Meeting => "Meeting",
            ActivityType::Travel => "Travel",
            ActivityType::Rest => "Rest",
            ActivityType::Other => "Other",
        };
        write!(f, "{}", label)
    }
}

/// One item on the team's daily schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: Uuid,
    pub date: NaiveDate,
    pub activity: ActivityType,
    pub title: String,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Manual ordering within the day, lower first
    pub sort_order: i32,
}

impl ScheduleItem {
    pub fn new(date: NaiveDate, activity: ActivityType, title: impl Into<String>) -> Self {
        ScheduleItem {
            id: Uuid::new_v4(),
            date,
            activity,
            title: title.into(),
            start_time: None,
            end_time: None,
            sort_order: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 23).unwrap()
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Staff.is_staff());
        assert!(!Role::Player.is_staff());
        assert_eq!(Role::Staff.to_string(), "staff");
    }

    #[test]
    fn test_wellness_submit_derives_sleep() {
        let entry = WellnessEntry {
            bed_time: Some("23:00".to_string()),
            wake_time: Some("07:00".to_string()),
            sleep_quality: Some(7),
            bodyweight_kg: Some(dec!(78.4)),
            ..WellnessEntry::new("p1", date())
        }
        .submit()
        .unwrap();

        assert_eq!(entry.sleep_hours, Some(8.0));
        assert_eq!(entry.resolved_sleep_hours(), Some(8.0));
    }

    #[test]
    fn test_wellness_submit_rejects_bad_scale() {
        let result = WellnessEntry {
            fatigue: Some(11),
            ..WellnessEntry::new("p1", date())
        }
        .submit();

        assert!(result.is_err());
    }

    #[test]
    fn test_resolved_sleep_hours_skips_malformed_times() {
        let entry = WellnessEntry {
            bed_time: Some("late".to_string()),
            wake_time: Some("07:00".to_string()),
            ..WellnessEntry::new("p1", date())
        };
        assert_eq!(entry.resolved_sleep_hours(), None);
    }

    #[test]
    fn test_session_load_derived() {
        let session = SessionEntry::new("p1", date(), 60, Some(7));
        assert_eq!(session.load, Some(420.0));

        let no_rpe = SessionEntry::new("p1", date(), 45, None);
        assert_eq!(no_rpe.load, None);
        assert_eq!(no_rpe.load_or_zero(), 0.0);
    }

    #[test]
    fn test_session_submit_validates_duration() {
        assert!(SessionEntry::new("p1", date(), 0, Some(5)).submit().is_err());
        assert!(SessionEntry::new("p1", date(), 301, Some(5)).submit().is_err());
        assert!(SessionEntry::new("p1", date(), 90, Some(5)).submit().is_ok());
    }

    #[test]
    fn test_profile_serialization() {
        let profile = Profile::new("p1", "Sam Carter", Role::Player);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"role\":\"player\""));

        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
