//! Shared command plumbing: config resolution, store opening, literal parsing.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};

use tally_core::{Error, Store, TallyConfig};

use crate::exit_codes::core_exit_code;
use crate::CliError;

/// Map an engine error to a CLI error, attaching hints for the conditions
/// an operator can act on.
pub fn core_err(err: Error) -> CliError {
    let hint = match &err {
        Error::ClassNotFound { .. } => {
            Some("pass --roster FILE to fetch and cache the class".to_string())
        }
        Error::DuplicateBlock(_) => {
            Some("pick a different title; stored blocks are never overwritten".to_string())
        }
        Error::StoreNotFound(path) => {
            Some(format!("run a command that writes first, or create {}", path.display()))
        }
        _ => None,
    };
    CliError { code: core_exit_code(&err), message: err.to_string(), hint }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CliError::args(format!("bad date {raw:?} (expected YYYY-MM-DD)")))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, CliError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| CliError::args(format!("bad time {raw:?} (expected HH:MM)")))
}

/// Resolve configuration: explicit `--config` path, else the user-level
/// config file if one exists, else defaults. An explicit path that cannot
/// be read is fatal; a missing user-level file is not.
pub fn load_config(flag: Option<&Path>) -> Result<TallyConfig, CliError> {
    let path = match flag {
        Some(path) => path.to_path_buf(),
        None => match user_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(TallyConfig::default()),
        },
    };

    let text = std::fs::read_to_string(&path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
    TallyConfig::from_toml(&text).map_err(core_err)
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tally").join("config.toml"))
}

/// Store path: `--store` beats the configured path.
pub fn store_path(flag: Option<&Path>, config: &TallyConfig) -> PathBuf {
    match flag {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(&config.store.path),
    }
}

/// Open the store, creating a fresh one when the document does not exist.
pub fn open_store(flag: Option<&Path>, config: &TallyConfig) -> Result<Store, CliError> {
    Store::load_or_create(store_path(flag, config)).map_err(core_err)
}
