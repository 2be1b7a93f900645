//! `vaxtrack child-id` - CHR-XXXX-XXXX identifiers.

use clap::Subcommand;
use vaxtrack_schedule::identifier::{generate_identifier, is_valid_identifier, normalize_identifier, ALPHABET};

use crate::exit_codes::EXIT_VALIDATION;
use crate::CliError;

#[derive(Subcommand)]
pub enum ChildIdCommands {
    /// Generate new random identifiers
    #[command(after_help = "\
Examples:
  vaxtrack child-id new
  vaxtrack child-id new --count 20")]
    New {
        /// How many identifiers to print
        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Check an identifier (case and surrounding spaces are ignored)
    Check {
        /// Identifier to check
        id: String,
    },
}

pub fn cmd_child_id(cmd: ChildIdCommands) -> Result<(), CliError> {
    match cmd {
        ChildIdCommands::New { count } => {
            for _ in 0..count {
                println!("{}", generate_identifier());
            }
            Ok(())
        }
        ChildIdCommands::Check { id } => {
            let normalized = normalize_identifier(&id);
            if !is_valid_identifier(&normalized) {
                return Err(CliError::new(EXIT_VALIDATION, format!("invalid child identifier '{}'", id.trim()))
                    .with_hint(format!(
                        "expected CHR-XXXX-XXXX with characters from {}",
                        String::from_utf8_lossy(ALPHABET)
                    )));
            }
            println!("{normalized}");
            Ok(())
        }
    }
}
