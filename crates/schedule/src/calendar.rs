use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;
use crate::model::{AgeMilestone, ScheduleVaccine};

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// A national immunization calendar: milestones ascending by age.
///
/// Calendars are configuration. Load one per deployment with
/// [`Calendar::from_toml`] or use the built-in [`builtin`] calendar; either way
/// it is read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Calendar {
    pub name: String,
    /// Months after a milestone's age during which a missing dose is still
    /// pending rather than overdue.
    #[serde(default = "default_grace_months")]
    pub grace_months: u32,
    pub milestones: Vec<AgeMilestone>,
}

fn default_grace_months() -> u32 {
    1
}

static BUILTIN: Lazy<Calendar> = Lazy::new(Calendar::morocco_pni);

/// The built-in calendar (Moroccan PNI), initialized on first use.
pub fn builtin() -> &'static Calendar {
    &BUILTIN
}

impl Calendar {
    /// Number of (milestone, vaccine) entries. Fixed by the calendar,
    /// independent of any child's records.
    pub fn total_entries(&self) -> usize {
        self.milestones.iter().map(|m| m.vaccines.len()).sum()
    }

    /// Locate a calendar entry. Code comparison is case-insensitive.
    pub fn find(&self, vaccine_code: &str, dose_number: u32) -> Option<(&AgeMilestone, &ScheduleVaccine)> {
        self.milestones.iter().find_map(|m| {
            m.vaccines
                .iter()
                .find(|v| v.dose_number == dose_number && v.vaccine_code.eq_ignore_ascii_case(vaccine_code))
                .map(|v| (m, v))
        })
    }

    /// Moroccan National Immunization Program (Programme National
    /// d'Immunisation).
    pub fn morocco_pni() -> Self {
        Self {
            name: "Morocco National Immunization Program".into(),
            grace_months: default_grace_months(),
            milestones: vec![
                milestone("Birth", 0, &[
                    ("BCG", 1, "BCG"),
                    ("VHB", 1, "Hepatitis B (dose 1)"),
                    ("VPO", 0, "Oral polio (dose 0)"),
                ]),
                milestone("2 months", 2, &[
                    ("DTC", 1, "DTC (dose 1)"),
                    ("VPO", 1, "Oral polio (dose 1)"),
                    ("Hib", 1, "Haemophilus b (dose 1)"),
                    ("VHB", 2, "Hepatitis B (dose 2)"),
                    ("Pneumo", 1, "Pneumococcal (dose 1)"),
                    ("Rota", 1, "Rotavirus (dose 1)"),
                ]),
                milestone("3 months", 3, &[
                    ("DTC", 2, "DTC (dose 2)"),
                    ("VPO", 2, "Oral polio (dose 2)"),
                    ("Hib", 2, "Haemophilus b (dose 2)"),
                    ("Pneumo", 2, "Pneumococcal (dose 2)"),
                    ("Rota", 2, "Rotavirus (dose 2)"),
                ]),
                milestone("4 months", 4, &[
                    ("DTC", 3, "DTC (dose 3)"),
                    ("VPO", 3, "Oral polio (dose 3)"),
                    ("Hib", 3, "Haemophilus b (dose 3)"),
                    ("VHB", 3, "Hepatitis B (dose 3)"),
                    ("Pneumo", 3, "Pneumococcal (dose 3)"),
                ]),
                milestone("9 months", 9, &[("RR", 1, "Measles-Rubella (dose 1)")]),
                milestone("12 months", 12, &[("RR", 2, "Measles-Rubella (dose 2)")]),
                milestone("18 months", 18, &[
                    ("DTC", 4, "DTC (1st booster)"),
                    ("VPO", 4, "Oral polio (1st booster)"),
                ]),
                milestone("5 years", 60, &[
                    ("DTC", 5, "DTC (2nd booster)"),
                    ("VPO", 5, "Oral polio (2nd booster)"),
                ]),
            ],
        }
    }
}

fn milestone(label: &str, months: u32, vaccines: &[(&str, u32, &str)]) -> AgeMilestone {
    AgeMilestone {
        age_label: label.into(),
        age_in_months: months,
        vaccines: vaccines
            .iter()
            .map(|(code, dose, label)| ScheduleVaccine {
                vaccine_code: (*code).into(),
                dose_number: *dose,
                display_label: (*label).into(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl Calendar {
    pub fn from_toml(input: &str) -> Result<Self, ScheduleError> {
        let calendar: Calendar =
            toml::from_str(input).map_err(|e| ScheduleError::CalendarParse(e.to_string()))?;
        calendar.validate()?;
        Ok(calendar)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.milestones.is_empty() {
            return Err(ScheduleError::CalendarValidation(
                "at least one milestone is required".into(),
            ));
        }

        let mut previous: Option<&AgeMilestone> = None;
        let mut seen: HashSet<(String, u32)> = HashSet::new();

        for m in &self.milestones {
            if let Some(prev) = previous {
                if m.age_in_months <= prev.age_in_months {
                    return Err(ScheduleError::CalendarValidation(format!(
                        "milestone '{}' ({} months) must come after '{}' ({} months)",
                        m.age_label, m.age_in_months, prev.age_label, prev.age_in_months
                    )));
                }
            }
            previous = Some(m);

            if m.age_label.trim().is_empty() {
                return Err(ScheduleError::CalendarValidation(format!(
                    "milestone at {} months has an empty label",
                    m.age_in_months
                )));
            }
            if m.vaccines.is_empty() {
                return Err(ScheduleError::CalendarValidation(format!(
                    "milestone '{}' has no vaccines",
                    m.age_label
                )));
            }

            for v in &m.vaccines {
                if v.vaccine_code.trim().is_empty() {
                    return Err(ScheduleError::CalendarValidation(format!(
                        "milestone '{}': empty vaccine code",
                        m.age_label
                    )));
                }
                if v.display_label.trim().is_empty() {
                    return Err(ScheduleError::CalendarValidation(format!(
                        "milestone '{}': {} dose {} has an empty label",
                        m.age_label, v.vaccine_code, v.dose_number
                    )));
                }
                if !seen.insert((v.vaccine_code.to_ascii_lowercase(), v.dose_number)) {
                    return Err(ScheduleError::CalendarValidation(format!(
                        "{} dose {} appears more than once",
                        v.vaccine_code, v.dose_number
                    )));
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
name = "Small"
grace_months = 2

[[milestones]]
age_label = "Birth"
age_in_months = 0
vaccines = [
  { code = "BCG", dose = 1, label = "BCG" },
  { code = "OPV", dose = 0, label = "Polio (birth)" },
]

[[milestones]]
age_label = "6 weeks"
age_in_months = 1
vaccines = [{ code = "OPV", dose = 1, label = "Polio 1" }]
"#;

    #[test]
    fn parse_valid_calendar() {
        let cal = Calendar::from_toml(SMALL).unwrap();
        assert_eq!(cal.name, "Small");
        assert_eq!(cal.grace_months, 2);
        assert_eq!(cal.milestones.len(), 2);
        assert_eq!(cal.total_entries(), 3);
        assert_eq!(cal.milestones[0].vaccines[1].dose_number, 0);
    }

    #[test]
    fn grace_defaults_to_one_month() {
        let input = SMALL.replace("grace_months = 2\n", "");
        let cal = Calendar::from_toml(&input).unwrap();
        assert_eq!(cal.grace_months, 1);
    }

    #[test]
    fn builtin_calendar_is_valid() {
        let cal = builtin();
        cal.validate().unwrap();
        assert_eq!(cal.total_entries(), 25);
        assert_eq!(cal.milestones.len(), 8);
        assert_eq!(cal.milestones.last().unwrap().age_in_months, 60);
    }

    #[test]
    fn find_is_case_insensitive() {
        let cal = Calendar::morocco_pni();
        let (m, v) = cal.find("dtc", 1).unwrap();
        assert_eq!(m.age_label, "2 months");
        assert_eq!(v.vaccine_code, "DTC");
        assert!(cal.find("DTC", 9).is_none());
        assert!(cal.find("YF", 1).is_none());
    }

    #[test]
    fn reject_unsorted_milestones() {
        let input = SMALL.replace("age_in_months = 1", "age_in_months = 0");
        let err = Calendar::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("must come after"));
    }

    #[test]
    fn reject_duplicate_dose_across_milestones() {
        let input = SMALL.replace(r#"{ code = "OPV", dose = 1, label = "Polio 1" }"#, r#"{ code = "bcg", dose = 1, label = "BCG again" }"#);
        let err = Calendar::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("appears more than once"));
    }

    #[test]
    fn reject_empty_milestone() {
        let input = r#"
name = "Bad"
[[milestones]]
age_label = "Birth"
age_in_months = 0
vaccines = []
"#;
        let err = Calendar::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("no vaccines"));
    }

    #[test]
    fn reject_no_milestones() {
        let err = Calendar::from_toml("name = \"Empty\"\nmilestones = []\n").unwrap_err();
        assert!(err.to_string().contains("at least one milestone"));
    }

    #[test]
    fn reject_unknown_field() {
        let input = format!("grace_month = 3\n{SMALL}");
        let err = Calendar::from_toml(&input).unwrap_err();
        assert!(matches!(err, ScheduleError::CalendarParse(_)));
    }
}
