//! `vaxtrack mark-done` - record a pending or overdue dose.
//!
//! Order matters: eligibility is checked against the current schedule before
//! the request is validated, and nothing is written unless both pass.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use vaxtrack_config::Settings;
use vaxtrack_schedule::{append_csv_record, reconcile, AddVaccination};

use crate::exit_codes::EXIT_ERROR;
use crate::inputs;
use crate::schedule::render_row;
use crate::CliError;

#[derive(Args)]
pub struct MarkDoneArgs {
    /// Child profile TOML
    #[arg(long)]
    pub child: PathBuf,

    /// Vaccination record CSV file (created if missing)
    #[arg(long)]
    pub records: PathBuf,

    /// Vaccine code from the calendar (case-insensitive)
    #[arg(long)]
    pub vaccine: String,

    /// Dose number from the calendar
    #[arg(long)]
    pub dose: u32,

    /// Administration date (default: reference date)
    #[arg(long)]
    pub date: Option<String>,

    /// Clinic name (default: settings)
    #[arg(long)]
    pub clinic: Option<String>,

    /// Healthcare professional (default: settings)
    #[arg(long = "by")]
    pub administered_by: Option<String>,

    /// Vaccine batch number
    #[arg(long)]
    pub batch: Option<String>,

    /// Injection site
    #[arg(long)]
    pub site: Option<String>,

    /// Next dose date (YYYY-MM-DD)
    #[arg(long)]
    pub next_dose: Option<String>,

    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Calendar TOML (default: settings, then built-in)
    #[arg(long)]
    pub calendar: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = inputs::parse_day)]
    pub as_of: Option<NaiveDate>,
}

pub fn cmd_mark_done(args: MarkDoneArgs, settings: &Settings) -> Result<(), CliError> {
    let child = inputs::load_child(&args.child)?;
    let calendar = inputs::load_calendar(args.calendar.as_deref(), settings)?;
    let today = inputs::today(args.as_of);

    let records = if args.records.exists() {
        inputs::load_records(&args.records)?
    } else {
        log::info!("{} does not exist yet; starting empty", args.records.display());
        Vec::new()
    };

    let before = reconcile(&calendar, &child, &records, today);
    let target = before.record_target(&args.vaccine, args.dose)?;

    let date = args.date.unwrap_or_else(|| today.format("%Y-%m-%d").to_string());
    let clinic = args.clinic.or_else(|| settings.default_clinic.clone()).unwrap_or_default();

    let mut request = AddVaccination::for_target(&child.identifier, &target, &date, &clinic);
    request.administered_by = args.administered_by.or_else(|| settings.default_professional.clone());
    request.batch_number = args.batch;
    request.injection_site = args.site;
    request.next_dose_date = args.next_dose;
    request.notes = args.notes;

    let missing_clinic = clinic.trim().is_empty();
    let validated = request.validate().map_err(|e| {
        let err = CliError::from(e);
        if missing_clinic {
            err.with_hint("pass --clinic or set markDone.defaultClinic in settings")
        } else {
            err
        }
    })?;
    append_csv_record(&args.records, &validated.record)?;
    eprintln!(
        "recorded {} ({}) for {} in {}",
        target.label,
        validated.record.id,
        validated.child_identifier,
        args.records.display()
    );

    let refreshed = inputs::load_records(&args.records)?;
    let after = reconcile(&calendar, &child, &refreshed, today);
    let row = after
        .find_row(&target.vaccine_code, target.dose_number)
        .ok_or_else(|| CliError::new(EXIT_ERROR, "recorded dose missing from refreshed schedule"))?;
    println!("{}", render_row(row));
    Ok(())
}
