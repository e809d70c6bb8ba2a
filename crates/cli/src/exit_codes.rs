//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Description                                            |
//! |------|--------------------------------------------------------|
//! | 0    | Success                                                |
//! | 1    | General error (unspecified)                            |
//! | 2    | CLI usage error (bad args, bad date/time literal)      |
//! | 3    | Duplicate (block title or class key already stored)    |
//! | 4    | Not found (class not cached and no roster to fetch)    |
//! | 5    | Parse error (store, config, sheet, or roster document) |
//! | 6    | No fitting block and fallback registration failed      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant below
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `core_exit_code` or the relevant command

use tally_core::Error;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unparseable date or time literal.
pub const EXIT_USAGE: u8 = 2;

/// A block or class with this identity is already stored.
pub const EXIT_DUPLICATE: u8 = 3;

/// The requested entity is not in the store and cannot be fetched.
pub const EXIT_NOT_FOUND: u8 = 4;

/// A document (store, config, sheet, roster) could not be parsed.
pub const EXIT_PARSE: u8 = 5;

/// No registered block fits the imported span and the recovery path
/// (registering a block from the sheet metadata) also failed.
pub const EXIT_NO_FITTING_BLOCK: u8 = 6;

/// Map an engine error to its exit code.
pub fn core_exit_code(err: &Error) -> u8 {
    match err {
        Error::DuplicateBlock(_) | Error::DuplicateClass { .. } => EXIT_DUPLICATE,
        Error::StoreNotFound(_) | Error::ClassNotFound { .. } => EXIT_NOT_FOUND,
        Error::StoreParse(_) | Error::ConfigParse(_) | Error::ConfigValidation(_) => EXIT_PARSE,
        Error::NoFittingBlock { .. } => EXIT_NO_FITTING_BLOCK,
        Error::InvalidBlock { .. } => EXIT_USAGE,
        Error::Io(_) => EXIT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn engine_errors_map_to_registry_codes() {
        assert_eq!(core_exit_code(&Error::DuplicateBlock("Morning".into())), EXIT_DUPLICATE);
        assert_eq!(
            core_exit_code(&Error::StoreNotFound(PathBuf::from("missing.toml"))),
            EXIT_NOT_FOUND
        );
        assert_eq!(core_exit_code(&Error::StoreParse("bad".into())), EXIT_PARSE);
        assert_eq!(core_exit_code(&Error::Io("disk".into())), EXIT_ERROR);
    }
}
