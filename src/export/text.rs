use chrono::Days;
use std::fmt::{self, Write};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::dashboard::{PlayerSnapshot, SquadOverview};

fn or_dash<T: fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Plain-text report for one player
pub fn snapshot_report(snapshot: &PlayerSnapshot) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "PLAYER REPORT: {}", snapshot.display_name)?;
    writeln!(
        out,
        "Window: {} to {}",
        snapshot.load.week_start.format("%Y-%m-%d"),
        snapshot.as_of.format("%Y-%m-%d")
    )?;
    writeln!(out)?;

    writeln!(out, "WELLNESS")?;
    writeln!(out, "Entries: {}", snapshot.wellness_entries)?;
    writeln!(out, "Wellness average: {}", or_dash(snapshot.wellness_average.map(|v| format!("{:.1}", v))))?;
    writeln!(out, "Average sleep: {}", or_dash(snapshot.avg_sleep_hours.map(|v| format!("{:.1}h", v))))?;
    match (snapshot.readiness, snapshot.readiness_level) {
        (Some(score), Some(level)) => {
            writeln!(out, "Readiness: {}/100 ({})", score, level)?;
            writeln!(out, "Recommendation: {}", level.recommendation())?;
        }
        _ => writeln!(out, "Readiness: -")?,
    }
    writeln!(out)?;

    let load = &snapshot.load;
    writeln!(out, "LOAD")?;
    writeln!(out, "Sessions: {}", load.session_count)?;
    writeln!(out, "Weekly load: {:.0}", load.weekly_load)?;
    writeln!(out, "Previous week: {:.0}", load.previous_week_load)?;
    if let Some(change) = load.load_change_pct {
        writeln!(out, "Change: {:+.1}%", change)?;
    }
    writeln!(out, "Monotony: {:.2}", load.monotony)?;
    writeln!(out, "Strain: {:.0}", load.strain)?;
    writeln!(out)?;

    writeln!(out, "RED FLAGS")?;
    if snapshot.red_flags.is_empty() {
        writeln!(out, "None")?;
    }
    for flag in &snapshot.red_flags {
        writeln!(out, "• {} [{:?}]", flag, flag.severity)?;
    }

    Ok(out)
}

/// Plain-text report for the squad
pub fn overview_report(overview: &SquadOverview) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "SQUAD OVERVIEW {}", overview.as_of.format("%Y-%m-%d"))?;
    writeln!(
        out,
        "Players: {}  Flagged: {}",
        overview.players.len(),
        overview.flagged_players
    )?;
    writeln!(out)?;

    for player in &overview.players {
        let flags: Vec<&str> = player.red_flags.iter().map(|f| f.kind.as_str()).collect();
        writeln!(
            out,
            "{:<24} readiness {:>4}  load {:>6.0}  {}",
            player.display_name,
            or_dash(player.readiness),
            player.load.weekly_load,
            if flags.is_empty() { "-".to_string() } else { flags.join(", ") }
        )?;
    }

    Ok(out)
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Load")]
    load: String,
}

/// Day-by-day load table for one player's window
pub fn daily_load_table(snapshot: &PlayerSnapshot) -> String {
    let load = &snapshot.load;
    let rows: Vec<DayRow> = load
        .daily_loads
        .iter()
        .enumerate()
        .filter_map(|(offset, value)| {
            load.week_start
                .checked_add_days(Days::new(offset as u64))
                .map(|date| DayRow {
                    date: date.format("%a %d %b").to_string(),
                    load: format!("{:.0}", value),
                })
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct PlayerRow {
    #[tabled(rename = "Player")]
    name: String,
    #[tabled(rename = "Readiness")]
    readiness: String,
    #[tabled(rename = "Wellness")]
    wellness: String,
    #[tabled(rename = "Sleep")]
    sleep: String,
    #[tabled(rename = "Load")]
    load: String,
    #[tabled(rename = "Monotony")]
    monotony: String,
    #[tabled(rename = "Flags")]
    flags: String,
}

/// One row per player
pub fn overview_table(overview: &SquadOverview) -> String {
    let rows: Vec<PlayerRow> = overview
        .players
        .iter()
        .map(|p| PlayerRow {
            name: p.display_name.clone(),
            readiness: or_dash(p.readiness),
            wellness: or_dash(p.wellness_average.map(|v| format!("{:.1}", v))),
            sleep: or_dash(p.avg_sleep_hours.map(|v| format!("{:.1}h", v))),
            load: format!("{:.0}", p.load.weekly_load),
            monotony: format!("{:.2}", p.load.monotony),
            flags: p
                .red_flags
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}
