//! Submission checks applied before a record is stored

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{SessionEntry, WellnessEntry};

pub const SCALE_MIN: u8 = 1;
pub const SCALE_MAX: u8 = 10;
pub const SESSION_MIN_MINUTES: u16 = 1;
pub const SESSION_MAX_MINUTES: u16 = 300;
pub const BODYWEIGHT_MIN_KG: i64 = 20;
pub const BODYWEIGHT_MAX_KG: i64 = 250;

fn out_of_range(field: &str, min: f64, max: f64, value: f64) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min,
        max,
        value,
    }
}

/// Check an optional 1-10 questionnaire answer
pub fn check_scale(field: &str, value: Option<u8>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !(SCALE_MIN..=SCALE_MAX).contains(&v) => Err(out_of_range(
            field,
            f64::from(SCALE_MIN),
            f64::from(SCALE_MAX),
            f64::from(v),
        )),
        _ => Ok(()),
    }
}

/// Parse a strict `HH:MM` clock time
pub fn parse_clock_time(field: &str, value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| ValidationError::InvalidClockTime {
        field: field.to_string(),
        value: value.to_string(),
    })
}

pub fn validate_wellness(entry: &WellnessEntry) -> Result<(), ValidationError> {
    if entry.user_id.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "user_id".to_string(),
        });
    }

    check_scale("sleep_quality", entry.sleep_quality)?;
    check_scale("fatigue", entry.fatigue)?;
    check_scale("soreness", entry.soreness)?;
    check_scale("stress", entry.stress)?;
    check_scale("mood", entry.mood)?;
    check_scale("motivation", entry.motivation)?;

    if let Some(bed) = entry.bed_time.as_deref().filter(|s| !s.trim().is_empty()) {
        parse_clock_time("bed_time", bed)?;
    }
    if let Some(wake) = entry.wake_time.as_deref().filter(|s| !s.trim().is_empty()) {
        parse_clock_time("wake_time", wake)?;
    }

    for (part, value) in &entry.body_soreness {
        check_scale(&format!("body_soreness.{}", part), Some(*value))?;
    }

    if let Some(weight) = entry.bodyweight_kg {
        if weight < Decimal::from(BODYWEIGHT_MIN_KG) || weight > Decimal::from(BODYWEIGHT_MAX_KG) {
            return Err(out_of_range(
                "bodyweight_kg",
                BODYWEIGHT_MIN_KG as f64,
                BODYWEIGHT_MAX_KG as f64,
                weight.to_f64().unwrap_or(f64::NAN),
            ));
        }
    }

    Ok(())
}

pub fn validate_session(session: &SessionEntry) -> Result<(), ValidationError> {
    if session.user_id.trim().is_empty() {
        return Err(ValidationError::MissingField {
            field: "user_id".to_string(),
        });
    }

    if !(SESSION_MIN_MINUTES..=SESSION_MAX_MINUTES).contains(&session.duration_minutes) {
        return Err(out_of_range(
            "duration_minutes",
            f64::from(SESSION_MIN_MINUTES),
            f64::from(SESSION_MAX_MINUTES),
            f64::from(session.duration_minutes),
        ));
    }

    check_scale("rpe", session.rpe)
}

/// Reject a second wellness submission for the same player and day
pub fn ensure_first_submission(
    existing: &[WellnessEntry],
    user_id: &str,
    date: NaiveDate,
) -> Result<(), ValidationError> {
    if existing.iter().any(|e| e.user_id == user_id && e.date == date) {
        return Err(ValidationError::AlreadySubmitted {
            user_id: user_id.to_string(),
            date: date.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 23).unwrap()
    }

    #[test]
    fn test_check_scale() {
        assert!(check_scale("mood", None).is_ok());
        assert!(check_scale("mood", Some(1)).is_ok());
        assert!(check_scale("mood", Some(10)).is_ok());
        assert!(check_scale("mood", Some(0)).is_err());
        assert!(check_scale("mood", Some(11)).is_err());
    }

    #[test]
    fn test_parse_clock_time() {
        assert_eq!(
            parse_clock_time("bed_time", "23:15").unwrap(),
            NaiveTime::from_hms_opt(23, 15, 0).unwrap()
        );
        assert!(parse_clock_time("bed_time", "24:00").is_err());
        assert!(parse_clock_time("bed_time", "7pm").is_err());
    }

    #[test]
    fn test_wellness_clock_times_validated() {
        let entry = WellnessEntry {
            bed_time: Some("25:00".to_string()),
            ..WellnessEntry::new("p1", date())
        };
        assert_eq!(
            validate_wellness(&entry),
            Err(ValidationError::InvalidClockTime {
                field: "bed_time".to_string(),
                value: "25:00".to_string(),
            })
        );
    }

    #[test]
    fn test_wellness_body_soreness_validated() {
        let mut entry = WellnessEntry::new("p1", date());
        entry.body_soreness.insert("hamstring".to_string(), 12);
        assert!(validate_wellness(&entry).is_err());

        entry.body_soreness.insert("hamstring".to_string(), 6);
        assert!(validate_wellness(&entry).is_ok());
    }

    #[test]
    fn test_wellness_bodyweight_range() {
        let entry = WellnessEntry {
            bodyweight_kg: Some(dec!(312.5)),
            ..WellnessEntry::new("p1", date())
        };
        assert!(validate_wellness(&entry).is_err());

        let entry = WellnessEntry {
            bodyweight_kg: Some(dec!(81.2)),
            ..WellnessEntry::new("p1", date())
        };
        assert!(validate_wellness(&entry).is_ok());
    }

    #[test]
    fn test_missing_user_id() {
        let entry = WellnessEntry::new(" ", date());
        assert!(matches!(
            validate_wellness(&entry),
            Err(ValidationError::MissingField { .. })
        ));
    }

    #[test]
    fn test_session_rpe_range() {
        assert!(validate_session(&SessionEntry::new("p1", date(), 60, Some(11))).is_err());
        assert!(validate_session(&SessionEntry::new("p1", date(), 60, None)).is_ok());
    }

    #[test]
    fn test_ensure_first_submission() {
        let existing = vec![WellnessEntry::new("p1", date())];

        assert!(ensure_first_submission(&existing, "p1", date()).is_err());
        assert!(ensure_first_submission(&existing, "p2", date()).is_ok());
        assert!(ensure_first_submission(&existing, "p1", date().succ_opt().unwrap()).is_ok());
    }
}
