//! `vaxtrack-schedule`: immunization schedule reconciliation.
//!
//! Pure engine crate: receives a calendar, a child and pre-loaded vaccination
//! records, returns per-dose status and counts. The record-file helpers in
//! [`records`] are the only IO.

pub mod age;
pub mod calendar;
pub mod child;
pub mod engine;
pub mod error;
pub mod identifier;
pub mod model;
pub mod records;
pub mod reminder;
pub mod resolve;
pub mod summary;
pub mod target;

pub use age::ChildAge;
pub use calendar::{builtin, Calendar};
pub use child::ChildProfile;
pub use engine::{reconcile, reconcile_with_age};
pub use error::ScheduleError;
pub use model::{
    AgeMilestone, ComputedScheduleRow, DoseStatus, MilestoneView, RecordTarget, ScheduleResult,
    ScheduleSummary, ScheduleVaccine, ScheduleWarning, VaccinationRecord,
};
pub use records::{append_csv_record, load_csv_records, LoadedRecords};
pub use reminder::{booster_reminder, BoosterReminder};
pub use target::{AddVaccination, ValidatedVaccination};
