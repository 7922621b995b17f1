//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                      |
//! |------|--------------------------------------------------------------|
//! | 0    | Success (warnings and per-product errors do not change this) |
//! | 1    | General error (unspecified)                                  |
//! | 2    | Usage error (bad arguments, unsupported file type)           |
//! | 3    | Invalid configuration file                                   |
//! | 4    | Input file missing or unreadable                             |
//! | 5    | Input file unusable (missing columns, no valid rows)         |
//! | 6    | Report could not be written                                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `restock_exit_code` or the command's error handling

use restock_engine::RestockError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unsupported file extension.
pub const EXIT_USAGE: u8 = 2;

/// Config file could not be read, parsed, or validated.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Sales or rules file does not exist or could not be decoded.
pub const EXIT_INPUT_UNREADABLE: u8 = 4;

/// Sales file decoded but cannot produce results: no header, missing
/// required columns, or every row rejected.
pub const EXIT_INPUT_INVALID: u8 = 5;

/// Writing the --output report failed.
pub const EXIT_EXPORT_FAILED: u8 = 6;

/// Map an engine error to its exit code.
pub fn restock_exit_code(err: &RestockError) -> u8 {
    match err {
        RestockError::ConfigParse(_) | RestockError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        RestockError::Read { .. } => EXIT_INPUT_UNREADABLE,
        RestockError::EmptyFile { .. }
        | RestockError::MissingColumns { .. }
        | RestockError::NoValidTransactions { .. } => EXIT_INPUT_INVALID,
    }
}
