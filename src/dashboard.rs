//! Per-player snapshots and the staff squad overview
//!
//! Takes the rows the app has already fetched and assembles the numbers one
//! dashboard card shows: wellness and sleep averages over the load window,
//! the latest readiness, the weekly load picture and any red flags.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{Result, SquadError};
use crate::flags::{RedFlag, RedFlagDetector, RedFlagInputs};
use crate::load::{LoadCalculator, MetricsConfig, WeeklyLoadSummary};
use crate::models::{Profile, Role, SessionEntry, WellnessEntry};
use crate::wellness::{
    average_sleep_hours, average_wellness, readiness_score_with_target, ReadinessInputs,
    ReadinessLevel,
};

/// Everything a staff member sees for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub player_id: String,
    pub display_name: String,
    pub as_of: NaiveDate,

    /// Wellness entries inside the window
    pub wellness_entries: usize,
    pub wellness_average: Option<f64>,
    pub avg_sleep_hours: Option<f64>,

    /// Date of the most recent wellness entry used for readiness
    pub latest_wellness_date: Option<NaiveDate>,
    pub readiness: Option<u8>,
    pub readiness_level: Option<ReadinessLevel>,
    pub fatigue: Option<u8>,

    pub load: WeeklyLoadSummary,
    pub red_flags: Vec<RedFlag>,
}

impl PlayerSnapshot {
    pub fn is_flagged(&self) -> bool {
        !self.red_flags.is_empty()
    }
}

/// All active players, most concerning first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadOverview {
    pub generated_at: DateTime<Utc>,
    pub as_of: NaiveDate,
    pub players: Vec<PlayerSnapshot>,
    pub flagged_players: usize,
}

/// Builds snapshots from fetched rows using one set of settings
pub struct SquadAnalyzer {
    metrics: MetricsConfig,
    load: LoadCalculator,
    detector: RedFlagDetector,
}

impl SquadAnalyzer {
    pub fn new() -> Self {
        Self::from_config(&AppConfig::default())
    }

    pub fn from_config(config: &AppConfig) -> Self {
        SquadAnalyzer {
            metrics: config.metrics.clone(),
            load: LoadCalculator::with_config(config.metrics.clone()),
            detector: RedFlagDetector::with_thresholds(config.red_flags.clone()),
        }
    }

    fn window_start(&self, as_of: NaiveDate) -> NaiveDate {
        let days = u64::from(self.metrics.window_days.max(1));
        as_of.checked_sub_days(Days::new(days - 1)).unwrap_or(as_of)
    }

    /// Snapshot for one player; rows belonging to other users are ignored
    pub fn player_snapshot(
        &self,
        profile: &Profile,
        wellness: &[WellnessEntry],
        sessions: &[SessionEntry],
        as_of: NaiveDate,
    ) -> PlayerSnapshot {
        let start = self.window_start(as_of);

        let window_wellness: Vec<WellnessEntry> = wellness
            .iter()
            .filter(|e| e.user_id == profile.id && e.date >= start && e.date <= as_of)
            .cloned()
            .collect();
        let player_sessions: Vec<SessionEntry> = sessions
            .iter()
            .filter(|s| s.user_id == profile.id && s.date <= as_of)
            .cloned()
            .collect();

        let latest = window_wellness.iter().max_by_key(|e| (e.date, e.created_at));

        let wellness_average = average_wellness(&window_wellness);
        let avg_sleep_hours = average_sleep_hours(&window_wellness);
        let readiness = latest.and_then(|entry| {
            readiness_score_with_target(&ReadinessInputs::from(entry), self.metrics.sleep_target_hours)
        });
        let fatigue = latest.and_then(|entry| entry.fatigue);

        let load = self.load.weekly_summary(&player_sessions, as_of);

        let red_flags = self.detector.detect(&RedFlagInputs {
            wellness_average,
            avg_sleep_hours,
            monotony_value: Some(load.monotony),
            weekly_load: Some(load.weekly_load),
            previous_week_load: Some(load.previous_week_load),
            fatigue,
        });

        if !red_flags.is_empty() {
            warn!(
                player = %profile.id,
                flags = ?red_flags.iter().map(|f| f.kind.as_str()).collect::<Vec<_>>(),
                "player flagged"
            );
        }

        PlayerSnapshot {
            player_id: profile.id.clone(),
            display_name: profile.display_name.clone(),
            as_of,
            wellness_entries: window_wellness.len(),
            wellness_average,
            avg_sleep_hours,
            latest_wellness_date: latest.map(|e| e.date),
            readiness,
            readiness_level: readiness.map(ReadinessLevel::from_score),
            fatigue,
            load,
            red_flags,
        }
    }

    /// Snapshot requested by `viewer`: staff see anyone, players only themselves
    pub fn snapshot_for(
        &self,
        viewer: &Profile,
        player: &Profile,
        wellness: &[WellnessEntry],
        sessions: &[SessionEntry],
        as_of: NaiveDate,
    ) -> Result<PlayerSnapshot> {
        if !viewer.is_staff() && viewer.id != player.id {
            return Err(SquadError::Authorization(format!(
                "{} cannot view another player's data",
                viewer.display_name
            )));
        }
        Ok(self.player_snapshot(player, wellness, sessions, as_of))
    }

    /// Overview of every active player; staff and admins only
    pub fn squad_overview(
        &self,
        viewer: &Profile,
        profiles: &[Profile],
        wellness: &[WellnessEntry],
        sessions: &[SessionEntry],
        as_of: NaiveDate,
    ) -> Result<SquadOverview> {
        if !viewer.is_staff() {
            return Err(SquadError::Authorization(format!(
                "{} ({}) cannot view the squad overview",
                viewer.display_name, viewer.role
            )));
        }

        let mut players: Vec<PlayerSnapshot> = profiles
            .iter()
            .filter(|p| p.active && p.role == Role::Player)
            .map(|p| self.player_snapshot(p, wellness, sessions, as_of))
            .collect();

        players.sort_by(|a, b| {
            b.red_flags
                .len()
                .cmp(&a.red_flags.len())
                .then(a.readiness.cmp(&b.readiness))
                .then_with(|| a.display_name.cmp(&b.display_name))
        });

        let flagged_players = players.iter().filter(|p| p.is_flagged()).count();
        info!(%as_of, players = players.len(), flagged_players, "squad overview built");

        Ok(SquadOverview {
            generated_at: Utc::now(),
            as_of,
            players,
            flagged_players,
        })
    }
}

impl Default for SquadAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::RedFlagKind;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn wellness(user: &str, date: NaiveDate, sleep_quality: u8, fatigue: u8, hours: f64) -> WellnessEntry {
        WellnessEntry {
            sleep_quality: Some(sleep_quality),
            fatigue: Some(fatigue),
            sleep_hours: Some(hours),
            ..WellnessEntry::new(user, date)
        }
    }

    #[test]
    fn test_snapshot_uses_latest_entry_for_readiness() {
        let analyzer = SquadAnalyzer::new();
        let player = Profile::new("p1", "Sam Carter", Role::Player);
        let rows = vec![
            wellness("p1", day(21), 4, 9, 5.0),
            wellness("p1", day(23), 10, 1, 8.0),
            wellness("p2", day(23), 1, 10, 3.0),
        ];

        let snapshot = analyzer.player_snapshot(&player, &rows, &[], day(23));

        assert_eq!(snapshot.wellness_entries, 2);
        assert_eq!(snapshot.latest_wellness_date, Some(day(23)));
        assert_eq!(snapshot.readiness, Some(100));
        assert_eq!(snapshot.readiness_level, Some(ReadinessLevel::Ready));
        assert_eq!(snapshot.fatigue, Some(1));
        assert_eq!(snapshot.avg_sleep_hours, Some(6.5));
    }

    #[test]
    fn test_snapshot_ignores_entries_outside_window() {
        let analyzer = SquadAnalyzer::new();
        let player = Profile::new("p1", "Sam Carter", Role::Player);
        let rows = vec![wellness("p1", day(10), 5, 5, 7.0), wellness("p1", day(24), 5, 5, 7.0)];

        let snapshot = analyzer.player_snapshot(&player, &rows, &[], day(23));

        assert_eq!(snapshot.wellness_entries, 0);
        assert_eq!(snapshot.readiness, None);
        assert_eq!(snapshot.wellness_average, None);
    }

    #[test]
    fn test_snapshot_flags_tired_player() {
        let analyzer = SquadAnalyzer::new();
        let player = Profile::new("p1", "Sam Carter", Role::Player);
        let rows = vec![wellness("p1", day(23), 2, 9, 5.0)];

        let snapshot = analyzer.player_snapshot(&player, &rows, &[], day(23));
        let kinds: Vec<RedFlagKind> = snapshot.red_flags.iter().map(|f| f.kind).collect();

        // composite: (2 + 11 - 9) / 2 = 2.0
        assert_eq!(snapshot.wellness_average, Some(2.0));
        assert!(kinds.contains(&RedFlagKind::WellnessLow));
        assert!(kinds.contains(&RedFlagKind::SleepLow));
        assert!(kinds.contains(&RedFlagKind::FatigueHigh));
        assert!(!kinds.contains(&RedFlagKind::LoadSpike));
    }

    #[test]
    fn test_player_cannot_view_teammate() {
        let analyzer = SquadAnalyzer::new();
        let me = Profile::new("p1", "Sam Carter", Role::Player);
        let teammate = Profile::new("p2", "Alex Moss", Role::Player);

        assert!(analyzer.snapshot_for(&me, &me, &[], &[], day(23)).is_ok());
        assert!(analyzer.snapshot_for(&me, &teammate, &[], &[], day(23)).is_err());
    }

    #[test]
    fn test_squad_overview_requires_staff() {
        let analyzer = SquadAnalyzer::new();
        let player = Profile::new("p1", "Sam Carter", Role::Player);

        let result = analyzer.squad_overview(&player, &[player.clone()], &[], &[], day(23));
        assert!(matches!(result, Err(SquadError::Authorization(_))));
    }

    #[test]
    fn test_squad_overview_ordering() {
        let analyzer = SquadAnalyzer::new();
        let staff = Profile::new("s1", "Coach Reid", Role::Staff);
        let mut retired = Profile::new("p4", "Retired", Role::Player);
        retired.active = false;
        let profiles = vec![
            Profile::new("p1", "Fresh", Role::Player),
            Profile::new("p2", "Tired", Role::Player),
            Profile::new("p3", "Unknown", Role::Player),
            retired,
            staff.clone(),
        ];
        let rows = vec![
            wellness("p1", day(23), 9, 2, 8.0),
            wellness("p2", day(23), 2, 9, 5.0),
            wellness("p4", day(23), 2, 9, 5.0),
        ];

        let overview = analyzer.squad_overview(&staff, &profiles, &rows, &[], day(23)).unwrap();
        let names: Vec<&str> = overview.players.iter().map(|p| p.display_name.as_str()).collect();

        assert_eq!(names, vec!["Tired", "Unknown", "Fresh"]);
        assert_eq!(overview.flagged_players, 1);
    }
}
