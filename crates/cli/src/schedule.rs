//! `vaxtrack schedule` - reconcile a child's records against the calendar.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use vaxtrack_config::{OutputFormat, Settings};
use vaxtrack_schedule::{reconcile, ChildProfile, ComputedScheduleRow, DoseStatus, ScheduleResult};

use crate::exit_codes::{EXIT_ERROR, EXIT_OVERDUE};
use crate::inputs;
use crate::util::{format_age, pad_right};
use crate::CliError;

#[derive(Args)]
pub struct ScheduleArgs {
    /// Child profile TOML (identifier, full_name, birth_date)
    #[arg(long)]
    pub child: PathBuf,

    /// Vaccination record CSV file
    #[arg(long)]
    pub records: PathBuf,

    /// Calendar TOML (default: settings, then built-in)
    #[arg(long)]
    pub calendar: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = inputs::parse_day)]
    pub as_of: Option<NaiveDate>,

    /// Output JSON to stdout instead of the schedule table
    #[arg(long)]
    pub json: bool,

    /// Write JSON output to file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Exit 3 when any dose is overdue
    #[arg(long)]
    pub fail_on_overdue: bool,
}

pub fn cmd_schedule(args: ScheduleArgs, settings: &Settings) -> Result<(), CliError> {
    let child = inputs::load_child(&args.child)?;
    let records = inputs::load_records(&args.records)?;
    let calendar = inputs::load_calendar(args.calendar.as_deref(), settings)?;
    let today = inputs::today(args.as_of);

    let result = reconcile(&calendar, &child, &records, today);
    let json_output = args.json || settings.output_format == OutputFormat::Json;

    if json_output || args.output.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = args.output {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }
        if json_output {
            println!("{json_str}");
        }
    }

    if json_output {
        // Human summary to stderr
        eprintln!("{}", summary_line(&result));
    } else {
        print!("{}", render_schedule(&child, &result));
    }

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    let overdue = result.summary.overdue;
    if overdue > 0 && (args.fail_on_overdue || settings.fail_on_overdue) {
        return Err(CliError::new(EXIT_OVERDUE, format!("{overdue} overdue dose(s)")));
    }
    Ok(())
}

pub(crate) fn summary_line(result: &ScheduleResult) -> String {
    let s = &result.summary;
    format!(
        "{} completed, {} overdue, {} pending of {} ({:.0}%)",
        s.completed,
        s.overdue,
        s.pending,
        s.total,
        s.completion_ratio() * 100.0
    )
}

/// One table line for a calendar row.
pub(crate) fn render_row(row: &ComputedScheduleRow) -> String {
    let detail = match (&row.status, &row.record) {
        (DoseStatus::Completed, Some(record)) => {
            format!("{}  {}", record.administration_date, record.clinic_name)
        }
        _ => String::new(),
    };
    format!(
        "  {} {} {} {} {}",
        pad_right(&row.vaccine_code, 8),
        pad_right(&row.dose_number.to_string(), 2),
        pad_right(&row.display_label, 30),
        pad_right(&row.status.to_string(), 9),
        detail
    )
    .trim_end()
    .to_string()
}

pub(crate) fn render_schedule(child: &ChildProfile, result: &ScheduleResult) -> String {
    let mut out = String::new();
    let name = child.full_name.as_deref().unwrap_or("(unnamed)");
    let _ = writeln!(out, "{name} ({})", child.identifier);
    let _ = writeln!(
        out,
        "{} as of {}, {}",
        format_age(result.meta.child_age_months),
        result.meta.as_of,
        result.meta.calendar_name
    );

    for milestone in &result.milestones {
        let s = &milestone.summary;
        let mut badge = format!("{}/{} completed", s.completed, s.total);
        if s.overdue > 0 {
            let _ = write!(badge, ", {} overdue", s.overdue);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{} {badge}", pad_right(&milestone.age_label, 12));
        for row in &milestone.rows {
            let _ = writeln!(out, "{}", render_row(row));
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", summary_line(result));
    out
}
