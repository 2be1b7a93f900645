use chrono::NaiveDate;

use crate::age::ChildAge;
use crate::calendar::Calendar;
use crate::child::ChildProfile;
use crate::model::{
    ComputedScheduleRow, MilestoneView, ScheduleMeta, ScheduleResult, ScheduleWarning, VaccinationRecord,
};
use crate::resolve::{resolve_status, RecordIndex};
use crate::summary::{compute_summary, summarize_rows};

/// Reconcile a child's records against `calendar` as of `today`.
///
/// Pure: the result depends only on the arguments. Nothing is cached, so a
/// record appended by the caller shows up on the next call.
pub fn reconcile(
    calendar: &Calendar,
    child: &ChildProfile,
    records: &[VaccinationRecord],
    today: NaiveDate,
) -> ScheduleResult {
    let age = child.age(today);
    let mut result = reconcile_with_age(calendar, age, records, today);

    if age == ChildAge::Unknown {
        log::warn!(
            "child '{}': cannot parse birth date '{}', no dose will be marked overdue",
            child.identifier,
            child.birth_date
        );
        result.warnings.insert(
            0,
            ScheduleWarning::UnknownBirthDate {
                value: child.birth_date.clone(),
            },
        );
    }

    result
}

/// Reconcile with an already-computed age.
pub fn reconcile_with_age(
    calendar: &Calendar,
    age: ChildAge,
    records: &[VaccinationRecord],
    today: NaiveDate,
) -> ScheduleResult {
    let (index, mut warnings) = RecordIndex::build(records);

    let milestones: Vec<MilestoneView> = calendar
        .milestones
        .iter()
        .map(|m| {
            let rows: Vec<ComputedScheduleRow> = m
                .vaccines
                .iter()
                .map(|v| {
                    let (status, record) =
                        resolve_status(v, m.age_in_months, age, calendar.grace_months, &index);
                    ComputedScheduleRow {
                        vaccine_code: v.vaccine_code.clone(),
                        dose_number: v.dose_number,
                        display_label: v.display_label.clone(),
                        status,
                        record: record.cloned(),
                    }
                })
                .collect();
            let summary = summarize_rows(&rows);
            MilestoneView {
                age_label: m.age_label.clone(),
                age_in_months: m.age_in_months,
                rows,
                summary,
            }
        })
        .collect();

    // Duplicates only matter where they feed a calendar row.
    for m in &calendar.milestones {
        for v in &m.vaccines {
            let matches = index.matches(&v.vaccine_code, v.dose_number);
            if matches.len() > 1 {
                log::warn!(
                    "{} dose {} recorded {} times, using earliest ('{}')",
                    v.vaccine_code,
                    v.dose_number,
                    matches.len(),
                    matches[0].id
                );
                warnings.push(ScheduleWarning::DuplicateDose {
                    vaccine_code: v.vaccine_code.clone(),
                    dose_number: v.dose_number,
                    record_ids: matches.iter().map(|r| r.id.clone()).collect(),
                });
            }
        }
    }

    let summary = compute_summary(&milestones);
    log::debug!(
        "reconciled {} record(s) against '{}': {} completed, {} overdue, {} pending of {}",
        records.len(),
        calendar.name,
        summary.completed,
        summary.overdue,
        summary.pending,
        summary.total
    );

    ScheduleResult {
        meta: ScheduleMeta {
            calendar_name: calendar.name.clone(),
            as_of: today,
            child_age_months: age.months(),
            grace_months: calendar.grace_months,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        summary,
        milestones,
        warnings,
    }
}
