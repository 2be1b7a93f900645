//! `vaxtrack calendar` - show or validate vaccination calendars.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Subcommand;
use vaxtrack_config::{OutputFormat, Settings};
use vaxtrack_schedule::Calendar;

use crate::exit_codes::{EXIT_ERROR, EXIT_INVALID_CALENDAR};
use crate::inputs;
use crate::util::pad_right;
use crate::CliError;

#[derive(Subcommand)]
pub enum CalendarCommands {
    /// Print the active calendar
    #[command(after_help = "\
Examples:
  vaxtrack calendar show
  vaxtrack calendar show --calendar epi.toml --json")]
    Show {
        /// Calendar TOML (default: settings, then built-in)
        #[arg(long)]
        calendar: Option<PathBuf>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a calendar file without running a schedule
    #[command(after_help = "\
Examples:
  vaxtrack calendar validate epi.toml")]
    Validate {
        /// Path to the calendar TOML file
        file: PathBuf,
    },
}

pub fn cmd_calendar(cmd: CalendarCommands, settings: &Settings) -> Result<(), CliError> {
    match cmd {
        CalendarCommands::Show { calendar, json } => {
            let calendar = inputs::load_calendar(calendar.as_deref(), settings)?;
            if json || settings.output_format == OutputFormat::Json {
                let json_str = serde_json::to_string_pretty(&calendar)
                    .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
                println!("{json_str}");
            } else {
                print!("{}", render_calendar(&calendar));
            }
            Ok(())
        }
        CalendarCommands::Validate { file } => {
            let text = std::fs::read_to_string(&file).map_err(|e| {
                CliError::new(EXIT_INVALID_CALENDAR, format!("cannot read {}: {e}", file.display()))
            })?;
            let calendar = Calendar::from_toml(&text)?;
            println!(
                "ok: {} ({} milestones, {} doses)",
                calendar.name,
                calendar.milestones.len(),
                calendar.total_entries()
            );
            Ok(())
        }
    }
}

fn render_calendar(calendar: &Calendar) -> String {
    let mut out = String::new();
    let grace = match calendar.grace_months {
        1 => "1 month".to_string(),
        n => format!("{n} months"),
    };
    let _ = writeln!(
        out,
        "{} ({} doses, grace {grace})",
        calendar.name,
        calendar.total_entries()
    );
    for milestone in &calendar.milestones {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", milestone.age_label);
        for vaccine in &milestone.vaccines {
            let _ = writeln!(
                out,
                "  {} {} {}",
                pad_right(&vaccine.vaccine_code, 8),
                pad_right(&vaccine.dose_number.to_string(), 2),
                vaccine.display_label
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaxtrack_schedule::builtin;

    #[test]
    fn builtin_rendering() {
        let text = render_calendar(builtin());
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Morocco National Immunization Program (25 doses, grace 1 month)"));
        assert_eq!(lines.next(), Some(""));
        assert_eq!(lines.next(), Some("Birth"));
        assert_eq!(lines.next(), Some("  BCG      1  BCG"));
        assert!(text.contains("  VPO      0  Oral polio (dose 0)\n"));
        assert!(text.contains("\n5 years\n"));
    }
}
