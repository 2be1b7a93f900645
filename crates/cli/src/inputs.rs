//! Loading command inputs: child profile, record file, calendar, reference date.

use std::path::Path;

use chrono::NaiveDate;
use vaxtrack_config::Settings;
use vaxtrack_schedule::age::parse_date;
use vaxtrack_schedule::{builtin, load_csv_records, Calendar, ChildProfile, VaccinationRecord};

use crate::exit_codes::{EXIT_INVALID_CALENDAR, EXIT_RECORD_FILE};
use crate::CliError;

/// clap value parser for `--as-of`.
pub(crate) fn parse_day(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
}

pub(crate) fn today(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn read(path: &Path, code: u8, what: &str) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::new(code, format!("cannot read {what} {}: {e}", path.display())))
}

pub(crate) fn load_child(path: &Path) -> Result<ChildProfile, CliError> {
    let text = read(path, EXIT_RECORD_FILE, "child profile")?;
    ChildProfile::from_toml(&text).map_err(|e| {
        CliError::from(e).with_hint("expected keys: identifier, birth_date (YYYY-MM-DD), optional full_name")
    })
}

pub(crate) fn load_records(path: &Path) -> Result<Vec<VaccinationRecord>, CliError> {
    let text = read(path, EXIT_RECORD_FILE, "record file")?;
    let loaded = load_csv_records(&text)?;
    if !loaded.skipped.is_empty() {
        eprintln!(
            "note: skipped {} unreadable row(s) in {}",
            loaded.skipped.len(),
            path.display()
        );
    }
    Ok(loaded.records)
}

/// `--calendar` wins over the settings file; without either, the built-in calendar.
pub(crate) fn load_calendar(arg: Option<&Path>, settings: &Settings) -> Result<Calendar, CliError> {
    let configured = settings.resolved_calendar_path();
    let Some(path) = arg.or(configured.as_deref()) else {
        return Ok(builtin().clone());
    };
    log::debug!("calendar from {}", path.display());
    let text = read(path, EXIT_INVALID_CALENDAR, "calendar")?;
    Calendar::from_toml(&text).map_err(|e| CliError::from(e).with_hint(format!("check {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_day_accepts_iso() {
        assert_eq!(parse_day("2026-10-17"), Ok(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()));
        assert!(parse_day("17/10/2026").is_err());
    }

    #[test]
    fn builtin_calendar_by_default() {
        let calendar = load_calendar(None, &Settings::default()).unwrap();
        assert_eq!(calendar.total_entries(), 25);
    }

    #[test]
    fn missing_calendar_file_is_calendar_error() {
        let err = load_calendar(Some(Path::new("/nonexistent/pni.toml")), &Settings::default()).unwrap_err();
        assert_eq!(err.code, EXIT_INVALID_CALENDAR);
    }

    #[test]
    fn settings_calendar_used_when_no_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mini.toml");
        std::fs::write(
            &path,
            "name = \"Mini\"\n[[milestones]]\nage_label = \"Birth\"\nage_in_months = 0\nvaccines = [{ code = \"BCG\", dose = 1, label = \"BCG\" }]\n",
        )
        .unwrap();
        let settings = Settings { calendar_path: Some(path.display().to_string()), ..Settings::default() };
        let calendar = load_calendar(None, &settings).unwrap();
        assert_eq!(calendar.name, "Mini");
        assert_eq!(calendar.grace_months, 1);
    }

    #[test]
    fn missing_record_file() {
        let err = load_records(Path::new("/nonexistent/records.csv")).unwrap_err();
        assert_eq!(err.code, EXIT_RECORD_FILE);
    }
}
