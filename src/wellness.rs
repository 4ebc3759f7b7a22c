//! Wellness questionnaire metrics
//!
//! Turns the raw morning questionnaire into the numbers staff look at:
//! sleep duration, a per-entry composite score, period averages and a
//! 0-100 readiness score.
//!
//! # Scales
//!
//! Every questionnaire item is a 1-10 scale where a higher number means
//! "more" of the thing being asked. For sleep quality, mood and motivation
//! more is better. For soreness, fatigue and stress more is worse, so those
//! items are inverted as `11 - value` before they are averaged.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::models::WellnessEntry;
use crate::round_to;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Sleep duration that maps to a full 10 in the readiness score
pub const DEFAULT_SLEEP_TARGET_HOURS: f64 = 8.0;

/// Sleep duration in hours between a bed time and a wake time
///
/// Both times are local `HH:MM` clock strings. When the wake time is not
/// later than the bed time the player is assumed to have woken the next day.
/// A blank or missing time gives `None`. Malformed times are not rejected:
/// a component that is not a number becomes `NaN` and the result is
/// `Some(NaN)`. Use [`crate::validation::parse_clock_time`] to validate.
///
/// ```rust
/// use squadrs::wellness::sleep_duration_hours;
///
/// assert_eq!(sleep_duration_hours(Some("23:00"), Some("07:00")), Some(8.0));
/// assert_eq!(sleep_duration_hours(None, Some("07:00")), None);
/// ```
pub fn sleep_duration_hours(bed_time: Option<&str>, wake_time: Option<&str>) -> Option<f64> {
    let bed = bed_time.map(str::trim).filter(|s| !s.is_empty())?;
    let wake = wake_time.map(str::trim).filter(|s| !s.is_empty())?;

    let bed_minutes = clock_minutes(bed);
    let mut wake_minutes = clock_minutes(wake);
    if wake_minutes <= bed_minutes {
        wake_minutes += MINUTES_PER_DAY;
    }

    Some(round_to((wake_minutes - bed_minutes) / 60.0, 2))
}

fn clock_minutes(value: &str) -> f64 {
    let mut parts = value
        .split(':')
        .map(|part| part.trim().parse::<f64>().unwrap_or(f64::NAN));
    let hours = parts.next().unwrap_or(f64::NAN);
    let minutes = parts.next().unwrap_or(f64::NAN);
    hours * 60.0 + minutes
}

fn inverted(value: u8) -> f64 {
    11.0 - f64::from(value)
}

/// Composite wellness score (1-10) for a single entry
///
/// Averages whichever items were answered. Returns `None` when none were.
pub fn wellness_average_from_row(entry: &WellnessEntry) -> Option<f64> {
    let direct = [entry.sleep_quality, entry.mood, entry.motivation]
        .into_iter()
        .flatten()
        .map(f64::from);
    let negative = [entry.soreness, entry.fatigue, entry.stress]
        .into_iter()
        .flatten()
        .map(inverted);

    let components: Vec<f64> = direct.chain(negative).collect();
    mean(&components).map(|avg| round_to(avg, 1))
}

/// Mean composite score across entries that have one
pub fn average_wellness(entries: &[WellnessEntry]) -> Option<f64> {
    let scores: Vec<f64> = entries.iter().filter_map(wellness_average_from_row).collect();
    mean(&scores).map(|avg| round_to(avg, 1))
}

/// Mean sleep duration across entries that have one
pub fn average_sleep_hours(entries: &[WellnessEntry]) -> Option<f64> {
    let hours: Vec<f64> = entries
        .iter()
        .filter_map(WellnessEntry::resolved_sleep_hours)
        .collect();
    mean(&hours).map(|avg| round_to(avg, 1))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Inputs to the readiness score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadinessInputs {
    pub sleep_quality: Option<u8>,
    pub soreness: Option<u8>,
    pub fatigue: Option<u8>,
    pub stress: Option<u8>,
    pub mood: Option<u8>,
    pub sleep_hours: Option<f64>,
}

impl From<&WellnessEntry> for ReadinessInputs {
    fn from(entry: &WellnessEntry) -> Self {
        ReadinessInputs {
            sleep_quality: entry.sleep_quality,
            soreness: entry.soreness,
            fatigue: entry.fatigue,
            stress: entry.stress,
            mood: entry.mood,
            sleep_hours: entry.resolved_sleep_hours(),
        }
    }
}

/// Readiness score (0-100) against the default 8 hour sleep target
pub fn readiness_score(inputs: &ReadinessInputs) -> Option<u8> {
    readiness_score_with_target(inputs, DEFAULT_SLEEP_TARGET_HOURS)
}

/// Readiness score (0-100) against a custom sleep target
///
/// # Algorithm
///
/// Each available input becomes a 1-10 sub-score: sleep quality and mood as
/// is, soreness, fatigue and stress inverted, and sleep hours scaled so the
/// target maps to 10 (capped at 10). The mean sub-score is scaled to 0-100.
pub fn readiness_score_with_target(inputs: &ReadinessInputs, sleep_target_hours: f64) -> Option<u8> {
    let mut sub_scores = Vec::with_capacity(6);

    sub_scores.extend(inputs.sleep_quality.map(f64::from));
    sub_scores.extend(inputs.soreness.map(inverted));
    sub_scores.extend(inputs.fatigue.map(inverted));
    sub_scores.extend(inputs.stress.map(inverted));
    sub_scores.extend(inputs.mood.map(f64::from));

    if let Some(hours) = inputs.sleep_hours.filter(|h| h.is_finite()) {
        if sleep_target_hours > 0.0 {
            sub_scores.push((hours / sleep_target_hours * 10.0).min(10.0));
        }
    }

    let average = mean(&sub_scores)?;
    let score = (average * 10.0).round().clamp(0.0, 100.0) as u8;

    debug!(sub_scores = sub_scores.len(), score, "readiness score");
    Some(score)
}

/// Readiness bands shown next to the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessLevel {
    Ready,    // 75 and above
    Moderate, // 50 to 74
    Low,      // 30 to 49
    Poor,     // below 30
}

impl ReadinessLevel {
    pub fn from_score(score: u8) -> Self {
        if score >= 75 {
            ReadinessLevel::Ready
        } else if score >= 50 {
            ReadinessLevel::Moderate
        } else if score >= 30 {
            ReadinessLevel::Low
        } else {
            ReadinessLevel::Poor
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ReadinessLevel::Ready => "Well recovered",
            ReadinessLevel::Moderate => "Partially recovered",
            ReadinessLevel::Low => "Under-recovered",
            ReadinessLevel::Poor => "Poorly recovered",
        }
    }

    /// Suggestion for staff planning the day's session
    pub fn recommendation(&self) -> &'static str {
        match self {
            ReadinessLevel::Ready => "Cleared for full training",
            ReadinessLevel::Moderate => "Train as planned, monitor intensity",
            ReadinessLevel::Low => "Reduce volume, check in with the player",
            ReadinessLevel::Poor => "Consider modified session or rest",
        }
    }
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessLevel::Ready => write!(f, "Ready"),
            ReadinessLevel::Moderate => write!(f, "Moderate"),
            ReadinessLevel::Low => write!(f, "Low"),
            ReadinessLevel::Poor => write!(f, "Poor"),
        }
    }
}
