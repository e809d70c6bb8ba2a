//! `tally-core` — attendance-to-schedule reconciliation engine.
//!
//! Pure engine crate: receives check-in records and class rosters already
//! loaded by collaborators, matches observed time blocks against weekly
//! schedule slots, and persists the deduplicated result. No CLI or
//! spreadsheet dependencies.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod store;
pub mod time;

pub use aggregate::aggregate_schedule;
pub use config::TallyConfig;
pub use error::Error;
pub use matcher::{block_for_span, fits_slot};
pub use model::{
    session_span, AttendanceBlock, CheckinRecord, Class, Schedule, SlotAttendance, StudentId,
    Students, TimeBlock,
};
pub use store::Store;
pub use time::{advance, rewind, Delta, Weekday};
