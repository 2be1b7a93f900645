// vaxtrack CLI - immunization schedule tracking from the shell

mod calendar;
mod child_id;
mod exit_codes;
mod inputs;
mod mark_done;
mod records;
mod schedule;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use vaxtrack_config::Settings;
use vaxtrack_schedule::records::COLUMNS;
use vaxtrack_schedule::ScheduleError;

use exit_codes::{schedule_exit_code, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "vaxtrack")]
#[command(about = "Immunization schedule tracking (Moroccan PNI calendar built in)")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG is used otherwise.
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Settings file (default: per-user settings.json)
    #[arg(long, global = true, env = "VAXTRACK_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a child's records against the vaccination calendar
    #[command(after_help = "\
Examples:
  vaxtrack schedule --child yasmine.toml --records yasmine.csv
  vaxtrack schedule --child yasmine.toml --records yasmine.csv --json
  vaxtrack schedule --child yasmine.toml --records yasmine.csv --as-of 2026-10-17
  vaxtrack schedule --child yasmine.toml --records yasmine.csv --calendar epi.toml --fail-on-overdue")]
    Schedule(schedule::ScheduleArgs),

    /// Inspect or validate vaccination calendars
    #[command(subcommand)]
    Calendar(calendar::CalendarCommands),

    /// Record a pending or overdue dose as administered
    #[command(after_help = "\
Examples:
  vaxtrack mark-done --child yasmine.toml --records yasmine.csv --vaccine DTC --dose 1 --clinic 'CHU Ibn Rochd'
  vaxtrack mark-done --child yasmine.toml --records yasmine.csv --vaccine VHB --dose 2 \\
      --date 2026-10-17 --by 'Dr. Alaoui' --batch B-221 --site 'left thigh' --next-dose 2026-11-17")]
    MarkDone(mark_done::MarkDoneArgs),

    /// Booster reminder from the most recent vaccination
    #[command(after_help = "\
Examples:
  vaxtrack reminders --records yasmine.csv
  vaxtrack reminders --records yasmine.csv --json")]
    Reminders {
        /// Vaccination record CSV file
        #[arg(long)]
        records: PathBuf,

        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = inputs::parse_day)]
        as_of: Option<chrono::NaiveDate>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,
    },

    /// List recorded vaccinations, newest first
    History {
        /// Vaccination record CSV file
        #[arg(long)]
        records: PathBuf,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Generate or check CHR-XXXX-XXXX child identifiers
    #[command(subcommand)]
    ChildId(child_id::ChildIdCommands),
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  vaxtrack-schedule ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  vaxtrack-schedule ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

/// Log to stderr so stdout stays clean for tables and JSON.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => std::env::var("RUST_LOG")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Level::WARN),
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<PathBuf>) -> Settings {
    match path {
        Some(path) => {
            log::debug!("settings from {}", path.display());
            Settings::load_from(&path)
        }
        None => {
            log::debug!("settings from {}", Settings::config_path_display());
            Settings::load()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: vaxtrack <command> [options]");
            eprintln!("       vaxtrack --help for more information");
            Ok(())
        }
        Some(Commands::Schedule(args)) => schedule::cmd_schedule(args, &load_settings(cli.settings)),
        Some(Commands::Calendar(cmd)) => calendar::cmd_calendar(cmd, &load_settings(cli.settings)),
        Some(Commands::MarkDone(args)) => mark_done::cmd_mark_done(args, &load_settings(cli.settings)),
        Some(Commands::Reminders { records, as_of, json }) => {
            records::cmd_reminders(records, as_of, json, &load_settings(cli.settings))
        }
        Some(Commands::History { records, json }) => records::cmd_history(records, json),
        Some(Commands::ChildId(cmd)) => child_id::cmd_child_id(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ScheduleError> for CliError {
    fn from(err: ScheduleError) -> Self {
        let hint = match &err {
            ScheduleError::MissingColumn { .. } => Some(format!("record files need a header row: {}", COLUMNS.join(","))),
            ScheduleError::NotInCalendar { .. } => Some("run `vaxtrack calendar show` to list calendar doses".to_string()),
            ScheduleError::AlreadyCompleted { .. } => {
                Some("the dose is already recorded; check `vaxtrack history`".to_string())
            }
            _ => None,
        };
        Self { code: schedule_exit_code(&err), message: err.to_string(), hint }
    }
}
