//! Slot-fit and block-fit decisions.
//!
//! Slot-fit places an observed block into a weekly schedule slot; block-fit
//! reconciles a newly imported time span with a previously registered block.

use chrono::{NaiveDate, NaiveTime};

use crate::error::Error;
use crate::model::{Schedule, TimeBlock};
use crate::time::{advance, rewind, Delta, Weekday};

/// Decide whether an observed block belongs to a schedule slot.
///
/// Weekdays must match, and the slot's start or its computed end must fall
/// inside the block's span. The overlap test is deliberately one-sided: a
/// slot window that strictly contains the block, touching neither endpoint,
/// does not match. Callers depend on this asymmetry; see the
/// `slot_containing_block_does_not_fit` test before generalizing.
pub fn fits_slot(schedule: &Schedule, block: &TimeBlock) -> bool {
    let Some(block_weekday) = block.weekday() else {
        return false;
    };
    if block_weekday != schedule.weekday {
        return false;
    }

    let in_span = |time: NaiveTime| time >= block.start && time <= block.end;
    in_span(schedule.time) || in_span(schedule.end_time())
}

/// Find the registered block an observed span should merge into: weekday
/// must match and the block's window, widened by `threshold` on both sides,
/// must cover the span. Blocks are scanned in insertion order; first match
/// wins.
pub fn block_for_span<'a>(
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    blocks: &'a [TimeBlock],
    threshold: Delta,
) -> Result<&'a TimeBlock, Error> {
    let observed_weekday = Weekday::from_date(date);

    for block in blocks {
        // Both sides must resolve to a weekday; weekend dates never match,
        // not even each other.
        let matched = matches!(
            (block.weekday(), observed_weekday),
            (Some(registered), Some(observed)) if registered == observed
        );
        if !matched {
            continue;
        }
        if start >= rewind(block.start, threshold) && end <= advance(block.end, threshold) {
            return Ok(block);
        }
    }

    Err(Error::NoFittingBlock { date, start, end })
}
