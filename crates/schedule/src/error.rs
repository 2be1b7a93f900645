use std::fmt;

#[derive(Debug)]
pub enum ScheduleError {
    /// TOML parse / deserialization error in a calendar file.
    CalendarParse(String),
    /// Calendar validation error (unsorted milestones, duplicate dose, etc.).
    CalendarValidation(String),
    /// Child profile parse error.
    ChildParse(String),
    /// Missing required column in a record file.
    MissingColumn { column: String },
    /// CSV reader/writer error.
    Csv(String),
    /// IO error (file read, append, etc.).
    Io(String),
    /// No calendar row for the requested (vaccine, dose).
    NotInCalendar { vaccine_code: String, dose_number: u32 },
    /// The requested row already has a matching record.
    AlreadyCompleted { vaccine_code: String, dose_number: u32 },
    /// Add-vaccination input failed validation. One message per violation.
    Validation(Vec<String>),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CalendarParse(msg) => write!(f, "calendar parse error: {msg}"),
            Self::CalendarValidation(msg) => write!(f, "calendar validation error: {msg}"),
            Self::ChildParse(msg) => write!(f, "child profile parse error: {msg}"),
            Self::MissingColumn { column } => {
                write!(f, "record file: missing column '{column}'")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::NotInCalendar { vaccine_code, dose_number } => {
                write!(f, "{vaccine_code} dose {dose_number} is not part of the calendar")
            }
            Self::AlreadyCompleted { vaccine_code, dose_number } => {
                write!(f, "{vaccine_code} dose {dose_number} is already recorded")
            }
            Self::Validation(issues) => write!(f, "invalid vaccination: {}", issues.join(", ")),
        }
    }
}

impl std::error::Error for ScheduleError {}

impl From<csv::Error> for ScheduleError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

impl From<std::io::Error> for ScheduleError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
