use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::SessionEntry;
use crate::round_to;
use crate::wellness::DEFAULT_SLEEP_TARGET_HOURS;

/// Session load: duration in minutes multiplied by RPE
///
/// No range checks here; submissions are validated before they are stored.
pub fn session_load(duration_minutes: f64, rpe: f64) -> f64 {
    round_to(duration_minutes * rpe, 2)
}

// Standard deviation at or below this fraction of the mean is rounding noise
const FLAT_WINDOW_TOLERANCE: f64 = 1e-9;

/// Training monotony: mean daily load over its population standard deviation
///
/// A window with no variation (standard deviation of zero) has a monotony
/// of 1. An empty window has a monotony of 0.
pub fn monotony(daily_loads: &[f64]) -> f64 {
    if daily_loads.is_empty() {
        return 0.0;
    }
    if daily_loads.windows(2).all(|pair| pair[0] == pair[1]) {
        return 1.0;
    }

    let mean = daily_loads.iter().mean();
    let std_dev = daily_loads.iter().population_std_dev();

    if std_dev < f64::EPSILON || std_dev <= mean.abs() * FLAT_WINDOW_TOLERANCE {
        return 1.0;
    }

    round_to(mean / std_dev, 2)
}

/// Training strain: weekly load multiplied by monotony
pub fn strain(weekly_load: f64, monotony: f64) -> f64 {
    round_to(weekly_load * monotony, 2)
}

/// Metric calculation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Days in the rolling load window (default: 7)
    pub window_days: u16,

    /// Sleep duration that scores a full 10 in readiness (default: 8)
    pub sleep_target_hours: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            window_days: 7,
            sleep_target_hours: DEFAULT_SLEEP_TARGET_HOURS,
        }
    }
}

/// Load totals for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLoad {
    pub date: NaiveDate,

    /// Sum of session loads
    pub total_load: f64,

    pub session_count: u16,

    pub total_minutes: u32,

    /// Individual session loads, sessions without RPE count as 0
    pub session_loads: Vec<f64>,
}

/// Load picture for the window ending on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyLoadSummary {
    /// First day of the window (inclusive)
    pub week_start: NaiveDate,

    /// Last day of the window (inclusive)
    pub week_end: NaiveDate,

    pub weekly_load: f64,

    /// Total load of the window immediately before this one
    pub previous_week_load: f64,

    /// Daily totals oldest first, rest days as 0
    pub daily_loads: Vec<f64>,

    pub monotony: f64,

    pub strain: f64,

    pub session_count: usize,

    /// Week-over-week change in percent; absent when the previous week was empty
    pub load_change_pct: Option<f64>,
}

/// Session load aggregation engine
pub struct LoadCalculator {
    config: MetricsConfig,
}

impl LoadCalculator {
    /// Create new load calculator with default configuration
    pub fn new() -> Self {
        LoadCalculator {
            config: MetricsConfig::default(),
        }
    }

    /// Create new load calculator with custom configuration
    pub fn with_config(config: MetricsConfig) -> Self {
        LoadCalculator { config }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    fn window_days(&self) -> u64 {
        u64::from(self.config.window_days.max(1))
    }

    /// Aggregate daily load from a collection of sessions
    pub fn aggregate_daily_load(&self, sessions: &[SessionEntry]) -> BTreeMap<NaiveDate, DailyLoad> {
        let mut daily: BTreeMap<NaiveDate, DailyLoad> = BTreeMap::new();

        for session in sessions {
            let load = session.load_or_zero();

            daily
                .entry(session.date)
                .and_modify(|day| {
                    day.total_load = round_to(day.total_load + load, 2);
                    day.session_count += 1;
                    day.total_minutes += u32::from(session.duration_minutes);
                    day.session_loads.push(load);
                })
                .or_insert(DailyLoad {
                    date: session.date,
                    total_load: load,
                    session_count: 1,
                    total_minutes: u32::from(session.duration_minutes),
                    session_loads: vec![load],
                });
        }

        daily
    }

    /// Daily totals for the `days` days ending at `end`, oldest first
    pub fn daily_load_window(
        &self,
        daily: &BTreeMap<NaiveDate, DailyLoad>,
        end: NaiveDate,
        days: u64,
    ) -> Vec<f64> {
        (0..days)
            .rev()
            .filter_map(|offset| end.checked_sub_days(Days::new(offset)))
            .map(|date| daily.get(&date).map(|d| d.total_load).unwrap_or(0.0))
            .collect()
    }

    /// Summarise the load window ending on `as_of` and compare it with the one before
    pub fn weekly_summary(&self, sessions: &[SessionEntry], as_of: NaiveDate) -> WeeklyLoadSummary {
        let days = self.window_days();
        let daily = self.aggregate_daily_load(sessions);

        let week_start = as_of
            .checked_sub_days(Days::new(days - 1))
            .unwrap_or(as_of);
        let previous_end = as_of.checked_sub_days(Days::new(days)).unwrap_or(as_of);

        let daily_loads = self.daily_load_window(&daily, as_of, days);
        let previous_loads = self.daily_load_window(&daily, previous_end, days);

        let weekly_load = round_to(daily_loads.iter().sum(), 2);
        let previous_week_load = round_to(previous_loads.iter().sum(), 2);
        let monotony_value = monotony(&daily_loads);
        let strain_value = strain(weekly_load, monotony_value);

        let session_count = sessions
            .iter()
            .filter(|s| s.date >= week_start && s.date <= as_of)
            .count();

        let load_change_pct = if previous_week_load > 0.0 {
            Some(round_to(
                (weekly_load - previous_week_load) / previous_week_load * 100.0,
                1,
            ))
        } else {
            None
        };

        debug!(
            %as_of,
            weekly_load,
            previous_week_load,
            monotony = monotony_value,
            strain = strain_value,
            "weekly load summary"
        );

        WeeklyLoadSummary {
            week_start,
            week_end: as_of,
            weekly_load,
            previous_week_load,
            daily_loads,
            monotony: monotony_value,
            strain: strain_value,
            session_count,
            load_change_pct,
        }
    }
}

impl Default for LoadCalculator {
    fn default() -> Self {
        Self::new()
    }
}
