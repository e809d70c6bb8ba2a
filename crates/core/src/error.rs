use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};

#[derive(Debug)]
pub enum Error {
    /// Store document does not exist yet. Callers fall back to a fresh store.
    StoreNotFound(PathBuf),
    /// Store document exists but cannot be deserialized. Fatal.
    StoreParse(String),
    /// A block with this title is already registered.
    DuplicateBlock(String),
    /// A class with this (subject, class, semester) key is already cached.
    DuplicateClass {
        subject_id: String,
        class_id: String,
        semester: String,
    },
    /// No cached class under this key. Callers re-fetch from the roster provider.
    ClassNotFound {
        subject_id: String,
        class_id: String,
        semester: String,
    },
    /// No registered block covers the observed span. Callers register a new block.
    NoFittingBlock {
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
    /// Block span ends before it starts.
    InvalidBlock {
        title: String,
        start: NaiveTime,
        end: NaiveTime,
    },
    /// TOML parse / deserialization error in a config file.
    ConfigParse(String),
    /// Config validation error (threshold out of range, etc.).
    ConfigValidation(String),
    /// IO error (file read, write, rename).
    Io(String),
}

impl Error {
    /// "Not yet known" conditions the caller is expected to degrade from:
    /// create-if-missing, fetch-if-absent, register-if-unmatched.
    /// Everything else aborts the current command.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::StoreNotFound(_) | Self::ClassNotFound { .. } | Self::NoFittingBlock { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreNotFound(path) => {
                write!(f, "no store document at {}", path.display())
            }
            Self::StoreParse(msg) => write!(f, "store parse error: {msg}"),
            Self::DuplicateBlock(title) => {
                write!(f, "block '{title}' already registered")
            }
            Self::DuplicateClass { subject_id, class_id, semester } => {
                write!(f, "class {subject_id}-{class_id} in {semester} already cached")
            }
            Self::ClassNotFound { subject_id, class_id, semester } => {
                write!(f, "no class {subject_id}-{class_id} in {semester}")
            }
            Self::NoFittingBlock { date, start, end } => {
                write!(f, "no block fits {date} between {start} and {end}")
            }
            Self::InvalidBlock { title, start, end } => {
                write!(f, "block '{title}': start {start} is after end {end}")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_conditions() {
        let not_found = Error::StoreNotFound(PathBuf::from("missing.toml"));
        assert!(not_found.is_recoverable());

        let class = Error::ClassNotFound {
            subject_id: "INE5417".into(),
            class_id: "04208A".into(),
            semester: "20192".into(),
        };
        assert!(class.is_recoverable());

        let no_fit = Error::NoFittingBlock {
            date: NaiveDate::from_ymd_opt(2019, 9, 30).unwrap(),
            start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        };
        assert!(no_fit.is_recoverable());
    }

    #[test]
    fn fatal_conditions() {
        assert!(!Error::StoreParse("bad toml".into()).is_recoverable());
        assert!(!Error::DuplicateBlock("Morning".into()).is_recoverable());
        let dup = Error::DuplicateClass {
            subject_id: "INE5417".into(),
            class_id: "04208A".into(),
            semester: "20192".into(),
        };
        assert!(!dup.is_recoverable());
    }
}
