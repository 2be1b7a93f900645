//! Vaccination record files (CSV).
//!
//! The record file stands in for the clinic's record store: one header row,
//! then one row per administered dose.

use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::ScheduleError;
use crate::model::VaccinationRecord;

/// Header written for new files. Columns after `clinic_name` are optional
/// when reading.
pub const COLUMNS: [&str; 10] = [
    "id",
    "vaccine",
    "dose",
    "date",
    "clinic_name",
    "administered_by",
    "batch_number",
    "injection_site",
    "next_dose_date",
    "notes",
];

const REQUIRED_COLUMNS: usize = 5;

/// A row that could not be decoded and was left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub records: Vec<VaccinationRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Parse a record file. A missing required column fails the load; a single
/// undecodable row is skipped and reported.
pub fn load_csv_records(csv_data: &str) -> Result<LoadedRecords, ScheduleError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let headers = reader.headers()?.clone();
    for column in &COLUMNS[..REQUIRED_COLUMNS] {
        if !headers.iter().any(|h| h == *column) {
            return Err(ScheduleError::MissingColumn {
                column: (*column).to_string(),
            });
        }
    }

    let mut loaded = LoadedRecords::default();
    for row in reader.deserialize::<VaccinationRecord>() {
        match row {
            Ok(record) => loaded.records.push(record),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                log::warn!("record file line {line}: skipped ({e})");
                loaded.skipped.push(SkippedRow {
                    line,
                    reason: e.to_string(),
                });
            }
        }
    }

    log::debug!(
        "loaded {} record(s), skipped {}",
        loaded.records.len(),
        loaded.skipped.len()
    );
    Ok(loaded)
}

fn field<'a>(record: &'a VaccinationRecord, column: &str) -> &'a str {
    let opt = |v: &'a Option<String>| v.as_deref().unwrap_or("");
    match column {
        "id" => &record.id,
        "vaccine" => &record.vaccine_code,
        "date" => &record.administration_date,
        "clinic_name" => &record.clinic_name,
        "administered_by" => opt(&record.administered_by),
        "batch_number" => opt(&record.batch_number),
        "injection_site" => opt(&record.injection_site),
        "next_dose_date" => opt(&record.next_dose_date),
        "notes" => opt(&record.notes),
        _ => "",
    }
}

/// Cells for `record` in the order of `columns`; unknown columns stay empty.
fn row_for(record: &VaccinationRecord, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|c| match c.as_str() {
            "dose" => record.dose_number.to_string(),
            other => field(record, other).to_string(),
        })
        .collect()
}

/// Append one record, creating the file (with header) if needed.
///
/// Fields are written in the order of the existing header, so files that
/// carry only some of the optional columns stay rectangular. When the record
/// has a value for an optional column the header lacks, the file is rewritten
/// with that column added instead of dropping the value.
pub fn append_csv_record(path: &Path, record: &VaccinationRecord) -> Result<(), ScheduleError> {
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;

    let mut existing = String::new();
    file.read_to_string(&mut existing)?;

    let columns: Vec<String> = if existing.trim().is_empty() {
        COLUMNS.iter().map(|c| c.to_string()).collect()
    } else {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(existing.as_bytes());
        reader.headers()?.iter().map(|h| h.to_string()).collect()
    };

    let missing: Vec<&str> = COLUMNS[REQUIRED_COLUMNS..]
        .iter()
        .copied()
        .filter(|c| !columns.iter().any(|h| h == c) && !field(record, c).is_empty())
        .collect();
    if !existing.trim().is_empty() && !missing.is_empty() {
        drop(file);
        return widen_and_append(path, &existing, columns, &missing, record);
    }

    if !existing.is_empty() && !existing.ends_with('\n') {
        file.write_all(b"\n")?;
    }

    let mut writer = csv::WriterBuilder::new().from_writer(file);
    if existing.trim().is_empty() {
        writer.write_record(&columns)?;
    }
    writer.write_record(row_for(record, &columns))?;
    writer.flush()?;

    log::info!(
        "appended {} dose {} ('{}') to {}",
        record.vaccine_code,
        record.dose_number,
        record.id,
        path.display()
    );
    Ok(())
}

/// Rewrite the file with `missing` columns added after the existing ones,
/// existing rows padded with empty cells, then the new record.
fn widen_and_append(
    path: &Path,
    existing: &str,
    mut columns: Vec<String>,
    missing: &[&str],
    record: &VaccinationRecord,
) -> Result<(), ScheduleError> {
    let width = columns.len();
    columns.extend(missing.iter().map(|c| c.to_string()));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(existing.as_bytes());
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    writer.write_record(&columns)?;
    for row in reader.records() {
        let row = row?;
        let mut cells: Vec<&str> = row.iter().collect();
        if cells.len() < width {
            cells.resize(width, "");
        }
        cells.extend(std::iter::repeat("").take(missing.len()));
        writer.write_record(&cells)?;
    }
    writer.write_record(row_for(record, &columns))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ScheduleError::Io(e.to_string()))?;

    let tmp = path.with_extension("csv.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;

    log::info!(
        "added column(s) {} to {} and appended {} dose {} ('{}')",
        missing.join(", "),
        path.display(),
        record.vaccine_code,
        record.dose_number,
        record.id
    );
    Ok(())
}

/// Newest first by administration date; unparseable dates sort last.
pub fn sort_newest_first(records: &mut [VaccinationRecord]) {
    records.sort_by(|a, b| b.administered_on().cmp(&a.administered_on()));
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
id,vaccine,dose,date,clinic_name,administered_by,batch_number,injection_site,next_dose_date,notes
v1,BCG,1,2026-06-17,CHU Ibn Rochd,Dr. Alaoui,B-221,left arm,,
v2,VHB,1,2026-06-17,CHU Ibn Rochd,,,,2026-08-17,
";

    #[test]
    fn load_full_file() {
        let loaded = load_csv_records(SAMPLE).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert!(loaded.skipped.is_empty());
        let bcg = &loaded.records[0];
        assert_eq!(bcg.vaccine_code, "BCG");
        assert_eq!(bcg.administered_by.as_deref(), Some("Dr. Alaoui"));
        assert_eq!(bcg.next_dose_date, None);
        assert_eq!(loaded.records[1].next_dose_date.as_deref(), Some("2026-08-17"));
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv = "id,vaccine,dose,date,clinic_name\nv1,DTC,1,2026-08-20,Centre Hay Hassani\n";
        let loaded = load_csv_records(csv).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].batch_number, None);
    }

    #[test]
    fn missing_required_column_fails() {
        let csv = "id,vaccine,date,clinic_name\nv1,DTC,2026-08-20,X\n";
        let err = load_csv_records(csv).unwrap_err();
        assert!(err.to_string().contains("'dose'"));
    }

    #[test]
    fn bad_row_is_skipped_not_fatal() {
        let csv = "id,vaccine,dose,date,clinic_name\nv1,DTC,first,2026-08-20,X\nv2,DTC,2,2026-09-20,X\n";
        let loaded = load_csv_records(csv).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].id, "v2");
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].line, 2);
    }

    #[test]
    fn append_creates_header_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaccinations.csv");

        let loaded = load_csv_records(SAMPLE).unwrap();
        append_csv_record(&path, &loaded.records[0]).unwrap();
        append_csv_record(&path, &loaded.records[1]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("id,vaccine,dose,date,clinic_name,"));
        let reloaded = load_csv_records(&text).unwrap();
        assert_eq!(reloaded.records, loaded.records);
    }

    #[test]
    fn append_after_missing_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaccinations.csv");
        std::fs::write(&path, "id,vaccine,dose,date,clinic_name\nv1,BCG,1,2026-06-17,X").unwrap();

        let loaded = load_csv_records(SAMPLE).unwrap();
        append_csv_record(&path, &loaded.records[1]).unwrap();

        let reloaded = load_csv_records(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.records.len(), 2);
        assert_eq!(reloaded.records[1].id, "v2");
        assert!(reloaded.skipped.is_empty());
    }

    #[test]
    fn append_adds_optional_columns_the_header_lacks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaccinations.csv");
        std::fs::write(&path, "id,vaccine,dose,date,clinic_name\nv1,BCG,1,2026-06-17,CHU Ibn Rochd\n").unwrap();

        let record = VaccinationRecord {
            id: "v2".into(),
            vaccine_code: "DTC".into(),
            dose_number: 1,
            administration_date: "2026-08-20".into(),
            clinic_name: "Centre Hay Hassani".into(),
            administered_by: Some("Dr. Alaoui".into()),
            batch_number: None,
            injection_site: None,
            next_dose_date: Some("2026-11-01".into()),
            notes: None,
        };
        append_csv_record(&path, &record).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("id,vaccine,dose,date,clinic_name,administered_by,next_dose_date\n"));
        let reloaded = load_csv_records(&text).unwrap();
        assert!(reloaded.skipped.is_empty());
        assert_eq!(reloaded.records.len(), 2);
        assert_eq!(reloaded.records[0].id, "v1");
        assert_eq!(reloaded.records[0].next_dose_date, None);
        assert_eq!(reloaded.records[1], record);
        assert!(!dir.path().join("vaccinations.csv.tmp").exists());
    }

    #[test]
    fn append_without_optional_values_keeps_narrow_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaccinations.csv");
        std::fs::write(&path, "id,vaccine,dose,date,clinic_name\n").unwrap();

        let loaded = load_csv_records(SAMPLE).unwrap();
        let mut plain = loaded.records[1].clone();
        plain.next_dose_date = None;
        append_csv_record(&path, &plain).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "id,vaccine,dose,date,clinic_name\nv2,VHB,1,2026-06-17,CHU Ibn Rochd\n");
    }

    #[test]
    fn newest_first_puts_bad_dates_last() {
        let mut records = load_csv_records(
            "id,vaccine,dose,date,clinic_name\na,BCG,1,2026-01-01,X\nb,DTC,1,??,X\nc,DTC,2,2026-03-01,X\n",
        )
        .unwrap()
        .records;
        sort_newest_first(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
