//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: clinic scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad date)     |
//! | 3-9     | schedule         | Schedule and record-keeping codes        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `schedule_exit_code` or the relevant command

use vaxtrack_schedule::ScheduleError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options, unparseable `--as-of`.
/// clap exits with this code itself while parsing arguments, so no command
/// returns it; it is listed to keep 2 reserved.
#[allow(dead_code)]
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Schedule (3-9)
// =============================================================================

/// `schedule --fail-on-overdue` found at least one overdue dose.
pub const EXIT_OVERDUE: u8 = 3;

/// Calendar file cannot be read, parsed, or fails validation.
pub const EXIT_INVALID_CALENDAR: u8 = 4;

/// Record file or child profile cannot be read, parsed, or written.
pub const EXIT_RECORD_FILE: u8 = 5;

/// New vaccination failed field validation.
pub const EXIT_VALIDATION: u8 = 6;

/// Mark-done target is not in the calendar or is already completed.
pub const EXIT_NOT_ELIGIBLE: u8 = 7;

/// Map a library error to its exit code.
pub fn schedule_exit_code(err: &ScheduleError) -> u8 {
    match err {
        ScheduleError::CalendarParse(_) | ScheduleError::CalendarValidation(_) => EXIT_INVALID_CALENDAR,
        ScheduleError::ChildParse(_)
        | ScheduleError::MissingColumn { .. }
        | ScheduleError::Csv(_)
        | ScheduleError::Io(_) => EXIT_RECORD_FILE,
        ScheduleError::Validation(_) => EXIT_VALIDATION,
        ScheduleError::NotInCalendar { .. } | ScheduleError::AlreadyCompleted { .. } => EXIT_NOT_ELIGIBLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_OVERDUE,
            EXIT_INVALID_CALENDAR,
            EXIT_RECORD_FILE,
            EXIT_VALIDATION,
            EXIT_NOT_ELIGIBLE,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn error_mapping() {
        assert_eq!(schedule_exit_code(&ScheduleError::CalendarValidation("x".into())), EXIT_INVALID_CALENDAR);
        assert_eq!(
            schedule_exit_code(&ScheduleError::MissingColumn { column: "dose".into() }),
            EXIT_RECORD_FILE
        );
        assert_eq!(schedule_exit_code(&ScheduleError::Validation(vec![])), EXIT_VALIDATION);
        assert_eq!(
            schedule_exit_code(&ScheduleError::AlreadyCompleted { vaccine_code: "BCG".into(), dose_number: 1 }),
            EXIT_NOT_ELIGIBLE
        );
    }
}
