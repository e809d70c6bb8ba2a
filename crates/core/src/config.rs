//! Engine configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::time::Delta;

/// Top-level configuration document. Every section and field has a default,
/// so an empty file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    pub store: StoreConfig,
    pub matcher: MatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the store document.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minutes a session span may overhang a registered block on each side
    /// and still merge into it.
    pub threshold_minutes: i64,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self { store: StoreConfig::default(), matcher: MatchConfig::default() }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: "tally.toml".into() }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { threshold_minutes: 15 }
    }
}

impl TallyConfig {
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(text).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Thresholds are sub-hour by construction; a threshold of an hour or
    /// more would let a session merge into the wrong slot of the same day.
    pub fn validate(&self) -> Result<(), Error> {
        if !(0..60).contains(&self.matcher.threshold_minutes) {
            return Err(Error::ConfigValidation(format!(
                "threshold_minutes must be between 0 and 59, got {}",
                self.matcher.threshold_minutes
            )));
        }
        Ok(())
    }

    pub fn threshold(&self) -> Delta {
        Delta::Duration(Duration::minutes(self.matcher.threshold_minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TallyConfig::default();
        assert_eq!(config.store.path, "tally.toml");
        assert_eq!(config.matcher.threshold_minutes, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let config = TallyConfig::from_toml("").unwrap();
        assert_eq!(config, TallyConfig::default());
    }

    #[test]
    fn partial_document_fills_in_defaults() {
        let config = TallyConfig::from_toml("[matcher]\nthreshold_minutes = 5\n").unwrap();
        assert_eq!(config.matcher.threshold_minutes, 5);
        assert_eq!(config.store.path, "tally.toml");
    }

    #[test]
    fn explicit_paths() {
        let config = TallyConfig::from_toml("[store]\npath = \"/var/lib/tally/store.toml\"\n").unwrap();
        assert_eq!(config.store.path, "/var/lib/tally/store.toml");
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let err = TallyConfig::from_toml("[matcher]\nthreshold_minutes = 60\n").unwrap_err();
        assert!(matches!(err, Error::ConfigValidation(_)));

        let err = TallyConfig::from_toml("[matcher]\nthreshold_minutes = -1\n").unwrap_err();
        assert!(matches!(err, Error::ConfigValidation(_)));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = TallyConfig::from_toml("store = 3").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }
}
