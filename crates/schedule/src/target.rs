//! "Mark done": from a pending/overdue row to a validated new record.
//!
//! The reconciler only hands out the target. Persisting the record and
//! re-running the schedule is the caller's side of the contract.

use serde::Deserialize;

use crate::age::parse_date;
use crate::error::ScheduleError;
use crate::identifier::{generate_record_id, normalize_identifier};
use crate::model::{DoseStatus, RecordTarget, ScheduleResult, VaccinationRecord};

const MAX_TEXT: usize = 120;
const MAX_DOSE: u32 = 10;

impl ScheduleResult {
    /// Target for recording `vaccine_code` dose `dose_number`. Only pending
    /// and overdue rows are eligible.
    pub fn record_target(&self, vaccine_code: &str, dose_number: u32) -> Result<RecordTarget, ScheduleError> {
        let row = self.find_row(vaccine_code, dose_number).ok_or_else(|| {
            ScheduleError::NotInCalendar {
                vaccine_code: vaccine_code.to_string(),
                dose_number,
            }
        })?;

        match row.status {
            DoseStatus::Completed => Err(ScheduleError::AlreadyCompleted {
                vaccine_code: row.vaccine_code.clone(),
                dose_number,
            }),
            DoseStatus::Overdue | DoseStatus::Pending => Ok(RecordTarget {
                vaccine_code: row.vaccine_code.clone(),
                dose_number: row.dose_number,
                label: row.display_label.clone(),
            }),
        }
    }
}

/// An "add vaccination" request as entered by clinic staff.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddVaccination {
    pub child_identifier: String,
    pub vaccine_code: String,
    pub dose_number: u32,
    pub administration_date: String,
    pub clinic_name: String,
    #[serde(default)]
    pub administered_by: Option<String>,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub injection_site: Option<String>,
    #[serde(default)]
    pub next_dose_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedVaccination {
    /// Normalized (trimmed, uppercased).
    pub child_identifier: String,
    pub record: VaccinationRecord,
}

impl AddVaccination {
    pub fn for_target(
        child_identifier: &str,
        target: &RecordTarget,
        administration_date: &str,
        clinic_name: &str,
    ) -> Self {
        Self {
            child_identifier: child_identifier.to_string(),
            vaccine_code: target.vaccine_code.clone(),
            dose_number: target.dose_number,
            administration_date: administration_date.to_string(),
            clinic_name: clinic_name.to_string(),
            ..Self::default()
        }
    }

    pub fn validate(self) -> Result<ValidatedVaccination, ScheduleError> {
        self.validate_with_id(generate_record_id())
    }

    /// Validate, collecting every violation rather than stopping at the first.
    pub fn validate_with_id(self, record_id: String) -> Result<ValidatedVaccination, ScheduleError> {
        let mut issues = Vec::new();

        let child_identifier = normalize_identifier(&self.child_identifier);
        if child_identifier.is_empty() {
            issues.push("child identifier is required".to_string());
        }

        let vaccine_code = self.vaccine_code.trim().to_string();
        check_text(&mut issues, "vaccine code", &vaccine_code, true);

        if self.dose_number > MAX_DOSE {
            issues.push(format!("dose must be between 0 and {MAX_DOSE}"));
        }

        let administration_date = if self.administration_date.trim().is_empty() {
            issues.push("administration date is required".to_string());
            None
        } else {
            let parsed = parse_date(&self.administration_date);
            if parsed.is_none() {
                issues.push(format!("administration date '{}' is invalid", self.administration_date.trim()));
            }
            parsed
        };

        let clinic_name = self.clinic_name.trim().to_string();
        check_text(&mut issues, "clinic name", &clinic_name, true);

        let administered_by = non_blank(self.administered_by);
        if let Some(ref name) = administered_by {
            check_text(&mut issues, "healthcare professional name", name, false);
        }

        let next_dose_date = match non_blank(self.next_dose_date) {
            Some(raw) => match parse_date(&raw) {
                Some(d) => Some(d),
                None => {
                    issues.push(format!("next dose date '{raw}' is invalid"));
                    None
                }
            },
            None => None,
        };

        let Some(administration_date) = administration_date else {
            return Err(ScheduleError::Validation(issues));
        };
        if !issues.is_empty() {
            return Err(ScheduleError::Validation(issues));
        }

        Ok(ValidatedVaccination {
            child_identifier,
            record: VaccinationRecord {
                id: record_id,
                vaccine_code,
                dose_number: self.dose_number,
                administration_date: administration_date.format("%Y-%m-%d").to_string(),
                clinic_name,
                administered_by,
                batch_number: non_blank(self.batch_number),
                injection_site: non_blank(self.injection_site),
                next_dose_date: next_dose_date.map(|d| d.format("%Y-%m-%d").to_string()),
                notes: non_blank(self.notes),
            },
        })
    }
}

fn check_text(issues: &mut Vec<String>, what: &str, value: &str, required: bool) {
    if required && value.is_empty() {
        issues.push(format!("{what} is required"));
    } else if value.chars().count() > MAX_TEXT {
        issues.push(format!("{what} must be at most {MAX_TEXT} characters"));
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::builtin;
    use crate::child::ChildProfile;
    use crate::engine::reconcile;
    use chrono::NaiveDate;

    fn request() -> AddVaccination {
        AddVaccination {
            child_identifier: " chr-ab23-cd45".into(),
            vaccine_code: "DTC".into(),
            dose_number: 1,
            administration_date: "2026-10-01".into(),
            clinic_name: "  CHU Ibn Rochd ".into(),
            administered_by: Some("Dr. Alaoui".into()),
            batch_number: Some("   ".into()),
            ..AddVaccination::default()
        }
    }

    #[test]
    fn valid_request_normalizes_fields() {
        let v = request().validate_with_id("VAC-TEST0001".into()).unwrap();
        assert_eq!(v.child_identifier, "CHR-AB23-CD45");
        assert_eq!(v.record.id, "VAC-TEST0001");
        assert_eq!(v.record.clinic_name, "CHU Ibn Rochd");
        assert_eq!(v.record.administered_by.as_deref(), Some("Dr. Alaoui"));
        assert_eq!(v.record.batch_number, None);
        assert_eq!(v.record.next_dose_date, None);
    }

    #[test]
    fn timestamps_are_stored_as_dates() {
        let mut req = request();
        req.administration_date = "2026-10-01T09:15:00Z".into();
        req.next_dose_date = Some("2026-11-01".into());
        let v = req.validate().unwrap();
        assert_eq!(v.record.administration_date, "2026-10-01");
        assert_eq!(v.record.next_dose_date.as_deref(), Some("2026-11-01"));
        assert!(v.record.id.starts_with("VAC-"));
    }

    #[test]
    fn birth_dose_zero_is_accepted() {
        let mut req = request();
        req.vaccine_code = "VPO".into();
        req.dose_number = 0;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn all_violations_are_reported() {
        let req = AddVaccination {
            child_identifier: "  ".into(),
            vaccine_code: String::new(),
            dose_number: 11,
            administration_date: "31/02/2026".into(),
            clinic_name: "x".repeat(121),
            administered_by: Some("y".repeat(121)),
            next_dose_date: Some("later".into()),
            ..AddVaccination::default()
        };
        let ScheduleError::Validation(issues) = req.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(issues.len(), 7, "{issues:?}");
        assert!(issues.iter().any(|i| i.contains("child identifier")));
        assert!(issues.iter().any(|i| i.contains("vaccine code is required")));
        assert!(issues.iter().any(|i| i.contains("dose must be between 0 and 10")));
        assert!(issues.iter().any(|i| i.contains("administration date '31/02/2026' is invalid")));
        assert!(issues.iter().any(|i| i.contains("clinic name must be at most 120")));
        assert!(issues.iter().any(|i| i.contains("healthcare professional name")));
        assert!(issues.iter().any(|i| i.contains("next dose date 'later'")));
    }

    #[test]
    fn missing_date_is_required() {
        let mut req = request();
        req.administration_date = " ".into();
        let err = req.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid vaccination: administration date is required");
    }

    #[test]
    fn record_target_eligibility() {
        let child = ChildProfile {
            identifier: "CHR-AB23-CD45".into(),
            full_name: None,
            birth_date: "2026-06-17".into(),
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let done = request().validate_with_id("v1".into()).unwrap().record;
        let result = reconcile(builtin(), &child, &[done], today);

        let target = result.record_target("vhb", 2).unwrap();
        assert_eq!(target.vaccine_code, "VHB");
        assert_eq!(target.label, "Hepatitis B (dose 2)");

        assert!(matches!(
            result.record_target("DTC", 1),
            Err(ScheduleError::AlreadyCompleted { .. })
        ));
        assert!(matches!(
            result.record_target("YF", 1),
            Err(ScheduleError::NotInCalendar { .. })
        ));
    }

    #[test]
    fn marking_done_completes_only_that_row() {
        let child = ChildProfile {
            identifier: "CHR-AB23-CD45".into(),
            full_name: None,
            birth_date: "2026-06-17".into(),
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let before = reconcile(builtin(), &child, &[], today);
        let target = before.record_target("Pneumo", 1).unwrap();

        let record = AddVaccination::for_target(&child.identifier, &target, "2026-10-17", "CHU Ibn Rochd")
            .validate()
            .unwrap()
            .record;
        let after = reconcile(builtin(), &child, &[record], today);

        for (a, b) in before.rows().zip(after.rows()) {
            if a.vaccine_code == "Pneumo" && a.dose_number == 1 {
                assert_eq!(b.status, DoseStatus::Completed);
            } else {
                assert_eq!(a.status, b.status);
            }
        }
        assert_eq!(after.summary.completed, before.summary.completed + 1);
    }
}
