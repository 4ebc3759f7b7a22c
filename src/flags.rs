//! Red-flag detection for staff dashboards
//!
//! Each rule compares one metric with a fixed threshold. Rules are
//! independent: every rule is checked on every call and a missing input
//! only skips its own rule.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Which rule raised the flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedFlagKind {
    WellnessLow,
    SleepLow,
    MonotonyHigh,
    LoadSpike,
    FatigueHigh,
}

impl RedFlagKind {
    /// Stable key used by the dashboards
    pub fn as_str(&self) -> &'static str {
        match self {
            RedFlagKind::WellnessLow => "wellness_low",
            RedFlagKind::SleepLow => "sleep_low",
            RedFlagKind::MonotonyHigh => "monotony_high",
            RedFlagKind::LoadSpike => "load_spike",
            RedFlagKind::FatigueHigh => "fatigue_high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RedFlagKind::WellnessLow => "Low wellness",
            RedFlagKind::SleepLow => "Low sleep",
            RedFlagKind::MonotonyHigh => "High monotony",
            RedFlagKind::LoadSpike => "Load spike",
            RedFlagKind::FatigueHigh => "High fatigue",
        }
    }
}

impl fmt::Display for RedFlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    Warning,
    Critical,
}

/// A triggered rule with its offending value formatted for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlag {
    pub kind: RedFlagKind,
    pub label: String,
    pub value: String,
    pub severity: FlagSeverity,
}

impl RedFlag {
    fn new(kind: RedFlagKind, value: String, critical: bool) -> Self {
        RedFlag {
            kind,
            label: kind.label().to_string(),
            value,
            severity: if critical {
                FlagSeverity::Critical
            } else {
                FlagSeverity::Warning
            },
        }
    }
}

impl fmt::Display for RedFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

/// Metrics checked by the detector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RedFlagInputs {
    pub wellness_average: Option<f64>,
    pub avg_sleep_hours: Option<f64>,
    pub monotony_value: Option<f64>,
    pub weekly_load: Option<f64>,
    pub previous_week_load: Option<f64>,
    pub fatigue: Option<u8>,
}

/// Rule thresholds; a flag is raised past the first value and marked
/// critical past the second
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlagThresholds {
    /// Wellness average below this is flagged (default: 5)
    pub wellness_min: f64,
    pub wellness_critical: f64,

    /// Average sleep hours below this is flagged (default: 6)
    pub sleep_min_hours: f64,
    pub sleep_critical_hours: f64,

    /// Monotony above this is flagged (default: 2)
    pub monotony_max: f64,
    pub monotony_critical: f64,

    /// Weekly load above this multiple of the previous week is flagged (default: 1.3)
    pub load_spike_ratio: f64,
    pub load_spike_critical_ratio: f64,

    /// Fatigue above this is flagged (default: 8)
    pub fatigue_max: u8,
    pub fatigue_critical: u8,
}

impl Default for RedFlagThresholds {
    fn default() -> Self {
        RedFlagThresholds {
            wellness_min: 5.0,
            wellness_critical: 3.0,
            sleep_min_hours: 6.0,
            sleep_critical_hours: 5.0,
            monotony_max: 2.0,
            monotony_critical: 2.5,
            load_spike_ratio: 1.3,
            load_spike_critical_ratio: 1.5,
            fatigue_max: 8,
            fatigue_critical: 10,
        }
    }
}

/// Rule evaluator over a set of thresholds
#[derive(Debug, Clone, Default)]
pub struct RedFlagDetector {
    thresholds: RedFlagThresholds,
}

impl RedFlagDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: RedFlagThresholds) -> Self {
        RedFlagDetector { thresholds }
    }

    pub fn thresholds(&self) -> &RedFlagThresholds {
        &self.thresholds
    }

    /// Evaluate every rule and return the flags that fired, in rule order
    pub fn detect(&self, inputs: &RedFlagInputs) -> Vec<RedFlag> {
        let t = &self.thresholds;
        let mut flags = Vec::new();

        if let Some(avg) = inputs.wellness_average {
            if avg < t.wellness_min {
                flags.push(RedFlag::new(
                    RedFlagKind::WellnessLow,
                    format!("{:.1}", avg),
                    avg < t.wellness_critical,
                ));
            }
        }

        if let Some(hours) = inputs.avg_sleep_hours {
            if hours < t.sleep_min_hours {
                flags.push(RedFlag::new(
                    RedFlagKind::SleepLow,
                    format!("{:.1}h", hours),
                    hours < t.sleep_critical_hours,
                ));
            }
        }

        if let Some(value) = inputs.monotony_value {
            if value > t.monotony_max {
                flags.push(RedFlag::new(
                    RedFlagKind::MonotonyHigh,
                    format!("{:.2}", value),
                    value > t.monotony_critical,
                ));
            }
        }

        if let (Some(weekly), Some(previous)) = (inputs.weekly_load, inputs.previous_week_load) {
            if previous > 0.0 && weekly > previous * t.load_spike_ratio {
                let change = (weekly / previous - 1.0) * 100.0;
                flags.push(RedFlag::new(
                    RedFlagKind::LoadSpike,
                    format!("+{:.0}%", change),
                    weekly > previous * t.load_spike_critical_ratio,
                ));
            }
        }

        if let Some(fatigue) = inputs.fatigue {
            if fatigue > t.fatigue_max {
                flags.push(RedFlag::new(
                    RedFlagKind::FatigueHigh,
                    format!("{}/10", fatigue),
                    fatigue >= t.fatigue_critical,
                ));
            }
        }

        debug!(flags = flags.len(), "red flag evaluation");
        flags
    }
}

/// Evaluate the red-flag rules with the default thresholds
pub fn detect_red_flags(inputs: &RedFlagInputs) -> Vec<RedFlag> {
    RedFlagDetector::new().detect(inputs)
}
