use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::age::parse_date;

// ---------------------------------------------------------------------------
// Calendar definition
// ---------------------------------------------------------------------------

/// One expected dose in the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleVaccine {
    #[serde(rename = "code")]
    pub vaccine_code: String,
    /// 0 is a birth-dose variant, distinct from dose 1.
    #[serde(rename = "dose")]
    pub dose_number: u32,
    #[serde(rename = "label")]
    pub display_label: String,
}

/// A named age checkpoint with the doses due at that age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeMilestone {
    pub age_label: String,
    /// 0 = birth.
    pub age_in_months: u32,
    pub vaccines: Vec<ScheduleVaccine>,
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// An administered dose, as stored by the clinic.
///
/// Dates are kept as the raw stored strings. A record whose
/// `administration_date` does not parse is never matched against the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationRecord {
    pub id: String,
    #[serde(rename = "vaccine")]
    pub vaccine_code: String,
    #[serde(rename = "dose")]
    pub dose_number: u32,
    #[serde(rename = "date")]
    pub administration_date: String,
    pub clinic_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administered_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injection_site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_dose_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl VaccinationRecord {
    pub fn administered_on(&self) -> Option<NaiveDate> {
        parse_date(&self.administration_date)
    }

    pub fn next_dose_on(&self) -> Option<NaiveDate> {
        self.next_dose_date.as_deref().and_then(parse_date)
    }

    /// Case-insensitive on the code, exact on the dose.
    pub fn matches(&self, vaccine_code: &str, dose_number: u32) -> bool {
        self.dose_number == dose_number && self.vaccine_code.eq_ignore_ascii_case(vaccine_code)
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoseStatus {
    Completed,
    Overdue,
    Pending,
}

impl std::fmt::Display for DoseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Overdue => write!(f, "overdue"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputedScheduleRow {
    pub vaccine_code: String,
    pub dose_number: u32,
    pub display_label: String,
    pub status: DoseStatus,
    /// Present only when `status` is `Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<VaccinationRecord>,
}

/// Status counts, for the whole schedule or a single milestone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleSummary {
    pub completed: usize,
    pub overdue: usize,
    pub pending: usize,
    pub total: usize,
}

impl ScheduleSummary {
    pub fn record(&mut self, status: DoseStatus) {
        match status {
            DoseStatus::Completed => self.completed += 1,
            DoseStatus::Overdue => self.overdue += 1,
            DoseStatus::Pending => self.pending += 1,
        }
        self.total += 1;
    }

    /// Fraction of calendar entries completed, in `0.0..=1.0`.
    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneView {
    pub age_label: String,
    pub age_in_months: u32,
    pub rows: Vec<ComputedScheduleRow>,
    pub summary: ScheduleSummary,
}

/// Partial-data conditions noticed while reconciling. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleWarning {
    UnknownBirthDate {
        value: String,
    },
    UnparseableDate {
        record_id: String,
        value: String,
    },
    DuplicateDose {
        vaccine_code: String,
        dose_number: u32,
        record_ids: Vec<String>,
    },
}

impl std::fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBirthDate { value } => {
                write!(f, "birth date '{value}' cannot be parsed; overdue detection disabled")
            }
            Self::UnparseableDate { record_id, value } => {
                write!(f, "record '{record_id}': cannot parse date '{value}', record ignored")
            }
            Self::DuplicateDose { vaccine_code, dose_number, record_ids } => write!(
                f,
                "{vaccine_code} dose {dose_number} recorded {} times ({})",
                record_ids.len(),
                record_ids.join(", ")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleMeta {
    pub calendar_name: String,
    pub as_of: NaiveDate,
    /// `None` when the birth date could not be parsed.
    pub child_age_months: Option<i32>,
    pub grace_months: u32,
    pub engine_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleResult {
    pub meta: ScheduleMeta,
    pub summary: ScheduleSummary,
    pub milestones: Vec<MilestoneView>,
    pub warnings: Vec<ScheduleWarning>,
}

impl ScheduleResult {
    pub fn rows(&self) -> impl Iterator<Item = &ComputedScheduleRow> {
        self.milestones.iter().flat_map(|m| m.rows.iter())
    }

    pub fn find_row(&self, vaccine_code: &str, dose_number: u32) -> Option<&ComputedScheduleRow> {
        self.rows().find(|r| {
            r.dose_number == dose_number && r.vaccine_code.eq_ignore_ascii_case(vaccine_code)
        })
    }
}

/// The (vaccine, dose, label) handed to the add-vaccination write when a
/// pending or overdue row is marked done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordTarget {
    pub vaccine_code: String,
    pub dose_number: u32,
    pub label: String,
}
