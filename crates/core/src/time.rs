//! Time-of-day arithmetic and the canonical weekday type.
//!
//! Every collaborator numbers weekdays differently: `chrono` counts Monday
//! as 0, the academic-records service ships ISO weekday + 1 (Monday = 2).
//! All inputs are normalized to [`Weekday`] at the boundary so matching
//! logic never compares mixed representations.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Canonical weekday for schedule matching. Classes meet Monday to Friday;
/// weekend dates normalize to `None` and never fit a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    /// Weekday of a calendar date.
    pub fn from_date(date: NaiveDate) -> Option<Weekday> {
        match date.weekday() {
            chrono::Weekday::Mon => Some(Self::Monday),
            chrono::Weekday::Tue => Some(Self::Tuesday),
            chrono::Weekday::Wed => Some(Self::Wednesday),
            chrono::Weekday::Thu => Some(Self::Thursday),
            chrono::Weekday::Fri => Some(Self::Friday),
            chrono::Weekday::Sat | chrono::Weekday::Sun => None,
        }
    }

    /// The roster provider's numbering: ISO weekday + 1, so Monday = 2
    /// through Friday = 6.
    pub fn from_provider_index(index: u8) -> Option<Weekday> {
        match index {
            2 => Some(Self::Monday),
            3 => Some(Self::Tuesday),
            4 => Some(Self::Wednesday),
            5 => Some(Self::Thursday),
            6 => Some(Self::Friday),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Time-of-day offsets
// ---------------------------------------------------------------------------

/// Offset applied to a time of day.
///
/// The `TimeOfDay` form keeps only the minute component: tolerance
/// thresholds historically ride in a bare time value whose minutes are the
/// threshold. Not a general duration type.
#[derive(Debug, Clone, Copy)]
pub enum Delta {
    Duration(Duration),
    TimeOfDay(NaiveTime),
}

impl Delta {
    pub fn minutes(minutes: i64) -> Delta {
        Delta::Duration(Duration::minutes(minutes))
    }

    fn as_duration(self) -> Duration {
        match self {
            Delta::Duration(d) => d,
            Delta::TimeOfDay(t) => Duration::minutes(t.minute() as i64),
        }
    }
}

impl From<Duration> for Delta {
    fn from(value: Duration) -> Self {
        Delta::Duration(value)
    }
}

impl From<NaiveTime> for Delta {
    fn from(value: NaiveTime) -> Self {
        Delta::TimeOfDay(value)
    }
}

/// Advance a time of day by an offset. Wraps past midnight; offsets in this
/// domain are under an hour and stay inside a working day.
pub fn advance(time: NaiveTime, delta: impl Into<Delta>) -> NaiveTime {
    time + delta.into().as_duration()
}

/// Rewind a time of day by an offset. Same wrap behavior as [`advance`].
pub fn rewind(time: NaiveTime, delta: impl Into<Delta>) -> NaiveTime {
    time - delta.into().as_duration()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn advance_by_duration() {
        assert_eq!(advance(t(10, 0), Duration::minutes(50)), t(10, 50));
        assert_eq!(advance(t(10, 20), Duration::minutes(45)), t(11, 5));
    }

    #[test]
    fn rewind_by_duration() {
        assert_eq!(rewind(t(10, 0), Duration::minutes(15)), t(9, 45));
        assert_eq!(rewind(t(10, 5), Duration::minutes(10)), t(9, 55));
    }

    #[test]
    fn time_of_day_delta_uses_only_minutes() {
        // 3h15m as a time of day means a 15-minute threshold; the hour
        // component is ignored.
        let threshold = t(3, 15);
        assert_eq!(advance(t(12, 0), threshold), t(12, 15));
        assert_eq!(rewind(t(12, 0), threshold), t(11, 45));
    }

    #[test]
    fn weekday_from_date() {
        // 2019-09-30 was a Monday
        let monday = NaiveDate::from_ymd_opt(2019, 9, 30).unwrap();
        assert_eq!(Weekday::from_date(monday), Some(Weekday::Monday));

        let saturday = NaiveDate::from_ymd_opt(2019, 10, 5).unwrap();
        assert_eq!(Weekday::from_date(saturday), None);
    }

    #[test]
    fn weekday_from_provider_index() {
        assert_eq!(Weekday::from_provider_index(2), Some(Weekday::Monday));
        assert_eq!(Weekday::from_provider_index(6), Some(Weekday::Friday));
        assert_eq!(Weekday::from_provider_index(1), None);
        assert_eq!(Weekday::from_provider_index(7), None);
    }

    #[test]
    fn provider_index_agrees_with_calendar() {
        // Provider says Monday = 2; 2026-08-24 is a Monday.
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        assert_eq!(Weekday::from_provider_index(2), Weekday::from_date(date));
    }
}
