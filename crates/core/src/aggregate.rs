//! Folds stored attendance blocks onto a class's weekly schedule slots.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::matcher::fits_slot;
use crate::model::{AttendanceBlock, Class, Schedule, SlotAttendance, TimeBlock};

/// Build the per-slot attendance view of a class.
///
/// Every slot in the class's schedule gets an entry, including slots no
/// stored block fits (so the report shows the gap). For each slot the
/// attender sets of all fitting blocks are unioned, then restricted to the
/// class roster; the restriction is applied last so an attender who fits
/// two blocks through different slots counts in both.
///
/// The synthetic block carries the slot's generated title and window; its
/// date is the earliest constituent block's, or the calendar epoch for
/// slots with no sessions.
pub fn aggregate_schedule(
    attendances: &[AttendanceBlock],
    class: &Class,
) -> BTreeMap<Schedule, SlotAttendance> {
    let mut out = BTreeMap::new();

    for slot in &class.schedule {
        let fitting: Vec<&AttendanceBlock> =
            attendances.iter().filter(|att| fits_slot(slot, &att.block)).collect();

        let date = fitting
            .iter()
            .map(|att| att.block.date)
            .min()
            .unwrap_or_else(NaiveDate::default);

        let mut attenders: BTreeSet<_> =
            fitting.iter().flat_map(|att| att.attenders.iter().cloned()).collect();
        attenders.retain(|id| class.students.contains(id));

        let block = TimeBlock {
            title: slot.slot_title(),
            date,
            start: slot.time,
            end: slot.end_time(),
        };

        out.insert(
            slot.clone(),
            SlotAttendance { block, session_count: fitting.len(), attenders },
        );
    }

    out
}
