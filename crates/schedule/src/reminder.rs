use chrono::NaiveDate;
use serde::Serialize;

use crate::model::VaccinationRecord;

/// Booster status derived from the most recent record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoosterReminder {
    pub record_id: String,
    pub vaccine_code: String,
    pub dose_number: u32,
    pub administered_on: NaiveDate,
    /// `None` when absent or unparseable.
    pub next_dose_date: Option<NaiveDate>,
    /// `next_dose_date` is strictly before `today`.
    pub overdue: bool,
}

/// Reminder for the most recently administered dose, if any record has a
/// usable administration date. Equal dates keep the first record listed.
pub fn booster_reminder(records: &[VaccinationRecord], today: NaiveDate) -> Option<BoosterReminder> {
    let mut latest: Option<(NaiveDate, &VaccinationRecord)> = None;
    for record in records {
        let Some(date) = record.administered_on() else {
            continue;
        };
        if latest.map_or(true, |(best, _)| date > best) {
            latest = Some((date, record));
        }
    }

    let (administered_on, record) = latest?;
    let next_dose_date = record.next_dose_on();
    if next_dose_date.is_none() && record.next_dose_date.is_some() {
        log::warn!(
            "record '{}': cannot parse next dose date '{}'",
            record.id,
            record.next_dose_date.as_deref().unwrap_or_default()
        );
    }

    Some(BoosterReminder {
        record_id: record.id.clone(),
        vaccine_code: record.vaccine_code.clone(),
        dose_number: record.dose_number,
        administered_on,
        next_dose_date,
        overdue: next_dose_date.map_or(false, |next| next < today),
    })
}
