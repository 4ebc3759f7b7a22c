use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

use squadrs::config::AppConfig;
use squadrs::dashboard::SquadAnalyzer;
use squadrs::error::{cli_report, ErrorSeverity, SquadError};
use squadrs::export::{self, ExportFormat};
use squadrs::flags::FlagSeverity;
use squadrs::import::DataSet;
use squadrs::logging::{init_logging, LogFormat, LogLevel};
use squadrs::models::{Profile, Role};
use squadrs::wellness::{readiness_score_with_target, ReadinessInputs, ReadinessLevel};
use squadrs::{monotony, session_load, sleep_duration_hours, strain};

/// squadrs - athlete wellness and load monitoring
///
/// Computes sleep, session load, monotony, strain, readiness and red flags
/// from wellness and session exports.
#[derive(Parser)]
#[command(name = "squadrs")]
#[command(version)]
#[command(about = "Athlete wellness and load monitoring", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sleep duration from bed and wake time (HH:MM)
    Sleep { bed: String, wake: String },

    /// Session load from duration and RPE
    Load {
        /// Duration in minutes
        duration: f64,
        /// Rate of perceived exertion (1-10)
        rpe: f64,
    },

    /// Readiness score from questionnaire answers
    Readiness {
        #[arg(long)]
        sleep_quality: Option<u8>,
        #[arg(long)]
        soreness: Option<u8>,
        #[arg(long)]
        fatigue: Option<u8>,
        #[arg(long)]
        stress: Option<u8>,
        #[arg(long)]
        mood: Option<u8>,
        #[arg(long)]
        sleep_hours: Option<f64>,
    },

    /// Monotony and strain for a list of daily loads
    Monotony {
        /// Daily loads, oldest first
        #[arg(required = true, num_args = 1..)]
        loads: Vec<f64>,
    },

    /// Report for one player from CSV exports
    Report {
        /// Directory holding profiles.csv, wellness.csv and sessions.csv
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Player id (defaults to settings.default_player_id)
        #[arg(short, long)]
        player: Option<String>,

        /// Last day of the window (YYYY-MM-DD, default today)
        #[arg(long)]
        as_of: Option<NaiveDate>,

        /// Output format (table, text, json)
        #[arg(short = 'f', long, default_value = "text")]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Overview of every active player from CSV exports
    Squad {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Profile id of the staff member viewing the overview
        #[arg(long = "as", value_name = "PROFILE_ID")]
        viewer: Option<String>,

        #[arg(long)]
        as_of: Option<NaiveDate>,

        #[arg(short = 'f', long, default_value = "table")]
        format: ExportFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage the configuration file
    Config {
        /// Print the active configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file if none exists
        #[arg(short, long)]
        init: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        let (severity, message) = cli_report(&err);
        match severity {
            ErrorSeverity::Error => {
                error!(error = %format!("{:#}", err), "command failed");
                eprintln!("{} {}", "Error:".red().bold(), message);
            }
            ErrorSeverity::Warning => {
                warn!(error = %format!("{:#}", err), "command rejected");
                eprintln!("{} {}", "Warning:".yellow().bold(), message);
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default()?,
    };

    if cli.verbose > 0 {
        config.logging.level = LogLevel::from_verbosity(cli.verbose);
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Sleep { bed, wake } => match sleep_duration_hours(Some(&bed), Some(&wake)) {
            Some(hours) if hours.is_finite() => println!("{:.2} h", hours),
            _ => bail!("Could not read bed/wake times '{}' and '{}'", bed, wake),
        },

        Commands::Load { duration, rpe } => {
            println!("{}", session_load(duration, rpe));
        }

        Commands::Readiness {
            sleep_quality,
            soreness,
            fatigue,
            stress,
            mood,
            sleep_hours,
        } => {
            let inputs = ReadinessInputs {
                sleep_quality,
                soreness,
                fatigue,
                stress,
                mood,
                sleep_hours,
            };
            match readiness_score_with_target(&inputs, config.metrics.sleep_target_hours) {
                Some(score) => {
                    let level = ReadinessLevel::from_score(score);
                    println!("{} {}", format!("{}/100", score).bold(), level);
                    println!("  {}", level.recommendation().dimmed());
                }
                None => println!("{}", "No answers given".yellow()),
            }
        }

        Commands::Monotony { loads } => {
            let weekly: f64 = loads.iter().sum();
            let value = monotony(&loads);
            println!("Weekly load: {}", weekly);
            println!("Monotony:    {}", value);
            println!("Strain:      {}", strain(weekly, value));
        }

        Commands::Report {
            data_dir,
            player,
            as_of,
            format,
            output,
        } => {
            let data = load_data(data_dir.as_ref().unwrap_or(&config.settings.data_dir))?;
            let player_id = player
                .or_else(|| config.settings.default_player_id.clone())
                .context("No player given and settings.default_player_id is not set")?;
            let profile = data.profile(&player_id).ok_or_else(|| SquadError::NotFound {
                kind: "player".to_string(),
                id: player_id.clone(),
            })?;

            let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
            let snapshot = SquadAnalyzer::from_config(&config).player_snapshot(
                profile,
                &data.wellness,
                &data.sessions,
                as_of,
            );

            let rendered = export::render_snapshot(&snapshot, format).map_err(SquadError::from)?;
            emit(&rendered, output)?;

            for flag in &snapshot.red_flags {
                let line = format!("⚑ {}", flag);
                match flag.severity {
                    FlagSeverity::Critical => eprintln!("{}", line.red().bold()),
                    FlagSeverity::Warning => eprintln!("{}", line.yellow()),
                }
            }
        }

        Commands::Squad {
            data_dir,
            viewer,
            as_of,
            format,
            output,
        } => {
            let data = load_data(data_dir.as_ref().unwrap_or(&config.settings.data_dir))?;
            let viewer = match viewer {
                Some(id) => data.profile(&id).cloned().ok_or_else(|| SquadError::NotFound {
                    kind: "profile".to_string(),
                    id,
                })?,
                None => Profile::new("cli", "Command line", Role::Admin),
            };

            let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
            let overview = SquadAnalyzer::from_config(&config).squad_overview(
                &viewer,
                &data.profiles,
                &data.wellness,
                &data.sessions,
                as_of,
            )?;

            println!(
                "{}",
                format!("{} - {}", config.settings.squad_name, as_of).green().bold()
            );
            let rendered = export::render_overview(&overview, format).map_err(SquadError::from)?;
            emit(&rendered, output)?;

            if overview.flagged_players > 0 {
                println!(
                    "{}",
                    format!("{} player(s) flagged", overview.flagged_players).red()
                );
            }
        }

        Commands::Config { show, init } => {
            if init {
                if config_path.exists() {
                    println!("Config already exists: {}", config_path.display());
                } else {
                    AppConfig::default().save_to_file(&config_path)?;
                    println!("{} {}", "✓ Wrote".green(), config_path.display());
                }
            }
            if show {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            if !show && !init {
                println!("{}", config_path.display());
            }
        }
    }

    Ok(())
}

fn load_data(dir: &Path) -> Result<DataSet> {
    DataSet::load_dir(dir)
        .map_err(SquadError::from)
        .with_context(|| format!("Failed to load data from {}", dir.display()))
}

fn emit(rendered: &str, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            export::write_output(rendered, &path).map_err(SquadError::from)?;
            println!("{} {}", "✓ Written to".green(), path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
