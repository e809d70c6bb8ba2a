//! Class roster ingestion.
//!
//! [`RosterProvider`] is the seam where the academic records service sits;
//! [`FileRoster`] is the file-backed implementation, reading a roster
//! document exported from that service.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use chrono::{NaiveTime, Timelike};
use serde::Deserialize;

use tally_core::model::MINUTES_PER_CREDIT;
use tally_core::{Class, Schedule, Students, Weekday};

#[derive(Debug)]
pub enum RosterError {
    /// Roster document could not be read.
    Io(String),
    /// Document structure or a field value could not be parsed.
    Parse(String),
    /// Document parsed but describes a different class than requested.
    WrongClass {
        subject_id: String,
        class_id: String,
        semester: String,
    },
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "roster IO error: {msg}"),
            Self::Parse(msg) => write!(f, "roster parse error: {msg}"),
            Self::WrongClass { subject_id, class_id, semester } => {
                write!(f, "roster describes {subject_id}-{class_id} in {semester}, not the requested class")
            }
        }
    }
}

impl std::error::Error for RosterError {}

/// Source of class rosters and schedules.
pub trait RosterProvider {
    fn fetch(
        &self,
        subject_id: &str,
        class_id: &str,
        semester: &str,
    ) -> Result<(Class, Students), RosterError>;
}

// ---------------------------------------------------------------------------
// Wire format of the roster document
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RosterDocument {
    subject_id: String,
    class_id: String,
    semester: String,
    #[serde(default)]
    schedule: Vec<RosterSlot>,
    #[serde(default)]
    students: Vec<RosterStudent>,
}

/// One slot as the records service exports it: weekday as its own index
/// (ISO weekday + 1, Monday = 2), time as "HH:MM".
#[derive(Debug, Deserialize)]
struct RosterSlot {
    weekday: u8,
    time: String,
    credits: u32,
}

#[derive(Debug, Deserialize)]
struct RosterStudent {
    id: String,
    name: String,
}

/// File-backed roster provider.
#[derive(Debug, Clone)]
pub struct FileRoster {
    path: PathBuf,
}

impl FileRoster {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RosterProvider for FileRoster {
    fn fetch(
        &self,
        subject_id: &str,
        class_id: &str,
        semester: &str,
    ) -> Result<(Class, Students), RosterError> {
        let text = fs::read_to_string(&self.path).map_err(|e| RosterError::Io(e.to_string()))?;
        let (class, students) = roster_from_toml(&text)?;

        if class.key() != (subject_id, class_id, semester) {
            return Err(RosterError::WrongClass {
                subject_id: class.subject_id,
                class_id: class.class_id,
                semester: class.semester,
            });
        }

        Ok((class, students))
    }
}

/// Parse a roster document, normalizing the provider's weekday numbering
/// and clock format at ingress.
pub fn roster_from_toml(text: &str) -> Result<(Class, Students), RosterError> {
    let doc: RosterDocument =
        toml::from_str(text).map_err(|e| RosterError::Parse(e.to_string()))?;

    let mut schedule = Vec::with_capacity(doc.schedule.len());
    for slot in &doc.schedule {
        let weekday = Weekday::from_provider_index(slot.weekday).ok_or_else(|| {
            RosterError::Parse(format!("weekday index {} out of range 2-6", slot.weekday))
        })?;
        let time = NaiveTime::parse_from_str(&slot.time, "%H:%M")
            .map_err(|_| RosterError::Parse(format!("bad slot time '{}'", slot.time)))?;
        if slot.credits == 0 {
            return Err(RosterError::Parse(format!(
                "slot at {} has zero credits",
                slot.time
            )));
        }
        // The slot window must stay inside its day: time-of-day arithmetic
        // wraps at midnight and a wrapped end would corrupt slot matching.
        let end_minute = u64::from(time.num_seconds_from_midnight()) / 60
            + u64::from(slot.credits) * MINUTES_PER_CREDIT as u64;
        if end_minute >= 24 * 60 {
            return Err(RosterError::Parse(format!(
                "slot at {} with {} credits reaches midnight",
                slot.time, slot.credits
            )));
        }
        schedule.push(Schedule { weekday, time, credits: slot.credits });
    }

    let students: Students =
        doc.students.iter().map(|s| (s.id.clone(), s.name.clone())).collect();

    let class = Class {
        subject_id: doc.subject_id,
        class_id: doc.class_id,
        semester: doc.semester,
        students: students.keys().cloned().collect(),
        schedule,
    };

    Ok((class, students))
}
