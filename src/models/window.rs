use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeDelta};

const LAST_SECOND_OF_DAY: i64 = 24 * 60 * 60 - 1;

/// The calendar day used to bound cumulative withdrawals, in local wall-clock time.
///
/// Both ends are inclusive and the end stops at `23:59:59` with no sub-second part,
/// so an entry stamped at `23:59:59.5` belongs to no window.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DayWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime
}

impl DayWindow {
    pub fn containing(now: DateTime<Local>) -> Self {
        let start = now.date_naive().and_time(NaiveTime::MIN);

        Self {
            start,
            end: start + TimeDelta::seconds(LAST_SECOND_OF_DAY)
        }
    }

    pub fn contains(&self, timestamp: &DateTime<Local>) -> bool {
        let local = timestamp.naive_local();
        self.start <= local && local <= self.end
    }
}
