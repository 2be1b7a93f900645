use std::collections::HashMap;

use crate::age::ChildAge;
use crate::model::{DoseStatus, ScheduleVaccine, ScheduleWarning, VaccinationRecord};

/// Usable records keyed by (lowercased code, dose), each bucket ordered by
/// administration date. Equal dates keep input order.
pub struct RecordIndex<'a> {
    by_dose: HashMap<(String, u32), Vec<&'a VaccinationRecord>>,
}

impl<'a> RecordIndex<'a> {
    /// Index `records`, dropping any whose administration date does not parse.
    /// Each dropped record yields an `UnparseableDate` warning.
    pub fn build(records: &'a [VaccinationRecord]) -> (Self, Vec<ScheduleWarning>) {
        let mut warnings = Vec::new();
        let mut dated = Vec::with_capacity(records.len());

        for record in records {
            match record.administered_on() {
                Some(date) => dated.push((date, record)),
                None => {
                    log::warn!(
                        "record '{}' ({} dose {}): unparseable date '{}', excluded from matching",
                        record.id,
                        record.vaccine_code,
                        record.dose_number,
                        record.administration_date
                    );
                    warnings.push(ScheduleWarning::UnparseableDate {
                        record_id: record.id.clone(),
                        value: record.administration_date.clone(),
                    });
                }
            }
        }

        // Stable: ties keep input order.
        dated.sort_by_key(|(date, _)| *date);

        let mut by_dose: HashMap<(String, u32), Vec<&'a VaccinationRecord>> = HashMap::new();
        for (_, record) in dated {
            by_dose
                .entry((record.vaccine_code.to_ascii_lowercase(), record.dose_number))
                .or_default()
                .push(record);
        }

        (Self { by_dose }, warnings)
    }

    /// All usable records for a dose, earliest first.
    pub fn matches(&self, vaccine_code: &str, dose_number: u32) -> &[&'a VaccinationRecord] {
        self.by_dose
            .get(&(vaccine_code.to_ascii_lowercase(), dose_number))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The earliest-dated matching record.
    pub fn best_match(&self, vaccine_code: &str, dose_number: u32) -> Option<&'a VaccinationRecord> {
        self.matches(vaccine_code, dose_number).first().copied()
    }
}

/// Resolve one calendar entry, in priority order: completed, overdue, pending.
pub fn resolve_status<'a>(
    vaccine: &ScheduleVaccine,
    milestone_age_months: u32,
    child_age: ChildAge,
    grace_months: u32,
    index: &RecordIndex<'a>,
) -> (DoseStatus, Option<&'a VaccinationRecord>) {
    if let Some(record) = index.best_match(&vaccine.vaccine_code, vaccine.dose_number) {
        return (DoseStatus::Completed, Some(record));
    }
    let due_by = i64::from(milestone_age_months) + i64::from(grace_months);
    if child_age.is_past(due_by) {
        (DoseStatus::Overdue, None)
    } else {
        (DoseStatus::Pending, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, code: &str, dose: u32, date: &str) -> VaccinationRecord {
        VaccinationRecord {
            id: id.into(),
            vaccine_code: code.into(),
            dose_number: dose,
            administration_date: date.into(),
            clinic_name: "CHU Ibn Rochd".into(),
            administered_by: None,
            batch_number: None,
            injection_site: None,
            next_dose_date: None,
            notes: None,
        }
    }

    fn dtc1() -> ScheduleVaccine {
        ScheduleVaccine {
            vaccine_code: "DTC".into(),
            dose_number: 1,
            display_label: "DTC (dose 1)".into(),
        }
    }

    #[test]
    fn earliest_match_wins() {
        let records = vec![
            rec("late", "DTC", 1, "2026-05-10"),
            rec("early", "dtc", 1, "2026-04-02"),
        ];
        let (index, warnings) = RecordIndex::build(&records);
        assert!(warnings.is_empty());
        assert_eq!(index.best_match("DTC", 1).unwrap().id, "early");
        assert_eq!(index.matches("Dtc", 1).len(), 2);
    }

    #[test]
    fn same_date_keeps_input_order() {
        let records = vec![
            rec("first", "DTC", 1, "2026-04-02"),
            rec("second", "DTC", 1, "2026-04-02"),
        ];
        let (index, _) = RecordIndex::build(&records);
        assert_eq!(index.best_match("DTC", 1).unwrap().id, "first");
    }

    #[test]
    fn unparseable_date_excluded() {
        let records = vec![rec("bad", "DTC", 1, "yesterday")];
        let (index, warnings) = RecordIndex::build(&records);
        assert!(index.best_match("DTC", 1).is_none());
        assert_eq!(
            warnings,
            vec![ScheduleWarning::UnparseableDate {
                record_id: "bad".into(),
                value: "yesterday".into(),
            }]
        );
    }

    #[test]
    fn dose_must_match_exactly() {
        let records = vec![rec("r", "DTC", 2, "2026-04-02")];
        let (index, _) = RecordIndex::build(&records);
        let (status, record) = resolve_status(&dtc1(), 2, ChildAge::Known(2), 1, &index);
        assert_eq!(status, DoseStatus::Pending);
        assert!(record.is_none());
    }

    #[test]
    fn grace_window_boundaries() {
        let (index, _) = RecordIndex::build(&[]);
        let status = |age| resolve_status(&dtc1(), 2, ChildAge::Known(age), 1, &index).0;
        assert_eq!(status(2), DoseStatus::Pending);
        assert_eq!(status(3), DoseStatus::Pending);
        assert_eq!(status(4), DoseStatus::Overdue);
    }

    #[test]
    fn completed_beats_overdue() {
        let records = vec![rec("r", "DTC", 1, "2026-09-01")];
        let (index, _) = RecordIndex::build(&records);
        let (status, record) = resolve_status(&dtc1(), 2, ChildAge::Known(30), 1, &index);
        assert_eq!(status, DoseStatus::Completed);
        assert_eq!(record.unwrap().id, "r");
    }

    #[test]
    fn unknown_age_stays_pending() {
        let (index, _) = RecordIndex::build(&[]);
        let (status, _) = resolve_status(&dtc1(), 2, ChildAge::Unknown, 1, &index);
        assert_eq!(status, DoseStatus::Pending);
    }
}
