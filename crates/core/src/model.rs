use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::time::{advance, Weekday};

pub type StudentId = String;

/// Mapping from student id to display name. Grows monotonically as classes
/// are cached; last write wins on id collision.
pub type Students = BTreeMap<StudentId, String>;

/// Minutes of class time per credit unit.
pub const MINUTES_PER_CREDIT: i64 = 50;

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// A dated, time-bounded event span. Identity is the title, unique within
/// the store. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub title: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeBlock {
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, Error> {
        let title = title.into();
        if start > end {
            return Err(Error::InvalidBlock { title, start, end });
        }
        Ok(Self { title, date, start, end })
    }

    pub fn weekday(&self) -> Option<Weekday> {
        Weekday::from_date(self.date)
    }
}

/// One check-in row as delivered by the spreadsheet reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinRecord {
    pub student_id: Option<StudentId>,
    pub checked_in: bool,
    pub checked_in_at: Option<NaiveDateTime>,
}

/// The observed session span: date plus the extremes of the check-in
/// timestamps. `None` when no record carries a timestamp.
pub fn session_span(records: &[CheckinRecord]) -> Option<(NaiveDate, NaiveTime, NaiveTime)> {
    let stamps: Vec<NaiveDateTime> = records.iter().filter_map(|r| r.checked_in_at).collect();
    let first = stamps.iter().min()?;
    let last = stamps.iter().max()?;
    Some((first.date(), first.time(), last.time()))
}

/// An attendance list observed within one time block. The attender set is a
/// true set: repeated scans of the same student collapse to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceBlock {
    pub block: TimeBlock,
    pub attenders: BTreeSet<StudentId>,
}

impl AttendanceBlock {
    /// Builds the attendance list for a block from raw check-in records,
    /// keeping only checked-in records that carry a student id.
    pub fn from_records(block: TimeBlock, records: &[CheckinRecord]) -> Self {
        let attenders = records
            .iter()
            .filter(|r| r.checked_in)
            .filter_map(|r| r.student_id.clone())
            .collect();
        Self { block, attenders }
    }
}

// ---------------------------------------------------------------------------
// Schedules and classes
// ---------------------------------------------------------------------------

/// One weekly recurring class slot. Full-field equality; used as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Schedule {
    pub weekday: Weekday,
    pub time: NaiveTime,
    pub credits: u32,
}

impl Schedule {
    /// End of the occupied window: start + credits * 50 minutes.
    pub fn end_time(&self) -> NaiveTime {
        advance(self.time, Duration::minutes(self.credits as i64 * MINUTES_PER_CREDIT))
    }

    /// Generated title for per-slot aggregates, e.g. "Monday-10h00".
    pub fn slot_title(&self) -> String {
        use chrono::Timelike;
        format!("{}-{}h{:02}", self.weekday, self.time.hour(), self.time.minute())
    }
}

/// A class as cached from the roster provider. Never updated in place;
/// re-adding under the same key is a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub subject_id: String,
    pub class_id: String,
    pub semester: String,
    pub students: BTreeSet<StudentId>,
    pub schedule: Vec<Schedule>,
}

impl Class {
    /// The unique cache key.
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.subject_id, &self.class_id, &self.semester)
    }
}

// ---------------------------------------------------------------------------
// Aggregation output
// ---------------------------------------------------------------------------

/// Attendance folded onto one schedule slot. `session_count` is the number
/// of stored blocks that fit the slot, so a renderer can tell "no record at
/// all" (0) from "sessions happened but nobody enrolled attended".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAttendance {
    pub block: TimeBlock,
    pub session_count: usize,
    pub attenders: BTreeSet<StudentId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn block_rejects_inverted_span() {
        let err = TimeBlock::new("Morning", d(2019, 9, 30), t(12, 0), t(10, 0)).unwrap_err();
        assert!(matches!(err, Error::InvalidBlock { .. }));

        // Zero-length spans are fine (single-scan sessions).
        assert!(TimeBlock::new("Instant", d(2019, 9, 30), t(10, 0), t(10, 0)).is_ok());
    }

    #[test]
    fn from_records_keeps_checked_in_with_ids() {
        let block = TimeBlock::new("Morning", d(2019, 9, 30), t(10, 0), t(12, 0)).unwrap();
        let records = vec![
            CheckinRecord {
                student_id: Some("14200743".into()),
                checked_in: true,
                checked_in_at: None,
            },
            // Not checked in: dropped.
            CheckinRecord {
                student_id: Some("15100643".into()),
                checked_in: false,
                checked_in_at: None,
            },
            // No id: dropped.
            CheckinRecord { student_id: None, checked_in: true, checked_in_at: None },
            // Duplicate scan: collapses.
            CheckinRecord {
                student_id: Some("14200743".into()),
                checked_in: true,
                checked_in_at: None,
            },
        ];

        let att = AttendanceBlock::from_records(block, &records);
        assert_eq!(att.attenders.len(), 1);
        assert!(att.attenders.contains("14200743"));
    }

    #[test]
    fn session_span_from_timestamp_extremes() {
        let records = vec![
            CheckinRecord {
                student_id: Some("1".into()),
                checked_in: true,
                checked_in_at: Some(d(2019, 9, 30).and_time(t(10, 12))),
            },
            CheckinRecord {
                student_id: Some("2".into()),
                checked_in: true,
                checked_in_at: Some(d(2019, 9, 30).and_time(t(9, 58))),
            },
            CheckinRecord {
                student_id: Some("3".into()),
                checked_in: true,
                checked_in_at: Some(d(2019, 9, 30).and_time(t(11, 47))),
            },
            CheckinRecord { student_id: Some("4".into()), checked_in: false, checked_in_at: None },
        ];

        let (date, start, end) = session_span(&records).unwrap();
        assert_eq!(date, d(2019, 9, 30));
        assert_eq!(start, t(9, 58));
        assert_eq!(end, t(11, 47));
    }

    #[test]
    fn session_span_without_timestamps() {
        let records =
            vec![CheckinRecord { student_id: Some("1".into()), checked_in: true, checked_in_at: None }];
        assert_eq!(session_span(&records), None);
    }

    #[test]
    fn schedule_end_time_from_credits() {
        let sched = Schedule { weekday: Weekday::Monday, time: t(10, 0), credits: 2 };
        assert_eq!(sched.end_time(), t(11, 40));

        let sched = Schedule { weekday: Weekday::Friday, time: t(8, 20), credits: 3 };
        assert_eq!(sched.end_time(), t(10, 50));
    }

    #[test]
    fn slot_title_format() {
        let sched = Schedule { weekday: Weekday::Monday, time: t(10, 0), credits: 2 };
        assert_eq!(sched.slot_title(), "Monday-10h00");

        let sched = Schedule { weekday: Weekday::Wednesday, time: t(14, 5), credits: 1 };
        assert_eq!(sched.slot_title(), "Wednesday-14h05");
    }
}
