use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::age::ChildAge;
use crate::error::ScheduleError;
use crate::identifier::{is_valid_identifier, normalize_identifier};

/// The parts of a child's record the schedule needs.
///
/// `birth_date` stays a raw string: a malformed value degrades the schedule
/// to "age unknown" instead of failing the load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub birth_date: String,
}

impl ChildProfile {
    pub fn from_toml(input: &str) -> Result<Self, ScheduleError> {
        let mut child: ChildProfile =
            toml::from_str(input).map_err(|e| ScheduleError::ChildParse(e.to_string()))?;
        child.identifier = normalize_identifier(&child.identifier);
        if !is_valid_identifier(&child.identifier) {
            log::warn!("child identifier '{}' is not in CHR-XXXX-XXXX form", child.identifier);
        }
        Ok(child)
    }

    pub fn age(&self, today: NaiveDate) -> ChildAge {
        ChildAge::from_birth_date_str(&self.birth_date, today)
    }
}
