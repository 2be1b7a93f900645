//! `vaxtrack reminders` and `vaxtrack history` - views over the record file alone.

use std::path::PathBuf;

use chrono::NaiveDate;
use vaxtrack_config::{OutputFormat, Settings};
use vaxtrack_schedule::records::sort_newest_first;
use vaxtrack_schedule::{booster_reminder, BoosterReminder, VaccinationRecord};

use crate::exit_codes::EXIT_ERROR;
use crate::inputs;
use crate::util::pad_right;
use crate::CliError;

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))
}

pub fn cmd_reminders(
    records_path: PathBuf,
    as_of: Option<NaiveDate>,
    json: bool,
    settings: &Settings,
) -> Result<(), CliError> {
    let records = inputs::load_records(&records_path)?;
    let reminder = booster_reminder(&records, inputs::today(as_of));

    if json || settings.output_format == OutputFormat::Json {
        println!("{}", to_json(&reminder)?);
    } else {
        println!("{}", describe_reminder(reminder.as_ref()));
    }
    Ok(())
}

pub(crate) fn describe_reminder(reminder: Option<&BoosterReminder>) -> String {
    let Some(r) = reminder else {
        return "no vaccinations recorded".to_string();
    };
    let last = format!("last dose: {} {} on {}", r.vaccine_code, r.dose_number, r.administered_on);
    match r.next_dose_date {
        None => format!("{last}; no next dose scheduled"),
        Some(next) if r.overdue => format!("{last}; booster overdue since {next}"),
        Some(next) => format!("{last}; next dose due {next}"),
    }
}

pub fn cmd_history(records_path: PathBuf, json: bool) -> Result<(), CliError> {
    let mut records = inputs::load_records(&records_path)?;
    sort_newest_first(&mut records);

    if json {
        println!("{}", to_json(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("no vaccinations recorded");
    }
    for record in &records {
        println!("{}", history_line(record));
    }
    Ok(())
}

pub(crate) fn history_line(record: &VaccinationRecord) -> String {
    let mut line = format!(
        "{} {} {} {}",
        pad_right(&record.administration_date, 10),
        pad_right(&record.vaccine_code, 8),
        pad_right(&record.dose_number.to_string(), 2),
        record.clinic_name
    );
    if let Some(by) = &record.administered_by {
        line.push_str(&format!(" ({by})"));
    }
    if let Some(next) = &record.next_dose_date {
        line.push_str(&format!(", next {next}"));
    }
    line
}
