// Date utility functions
// Local-day bounds and interval helpers shared by the grid and the store

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

pub fn is_same_day(date1: DateTime<Local>, date2: DateTime<Local>) -> bool {
    date1.date_naive() == date2.date_naive()
}

/// Resolve a wall-clock time on the local timezone.
///
/// Ambiguous times (DST fall-back) pick the earlier instant. Times that fall
/// into a DST gap are shifted forward by the gap.
pub fn resolve_local(naive: NaiveDateTime) -> DateTime<Local> {
    match Local.from_local_datetime(&naive).earliest() {
        Some(resolved) => resolved,
        None => {
            let shifted = naive + chrono::Duration::hours(1);
            Local
                .from_local_datetime(&shifted)
                .earliest()
                .unwrap_or_else(|| Local.from_utc_datetime(&naive))
        }
    }
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Local> {
    resolve_local(date.and_time(chrono::NaiveTime::MIN))
}

/// Start of the following day; the exclusive upper bound of `date`.
pub fn end_of_day_exclusive(date: NaiveDate) -> DateTime<Local> {
    let next = date.succ_opt().unwrap_or(date);
    start_of_day(next)
}

/// Half-open `[a_start, a_end)` vs `[b_start, b_end)` intersection.
pub fn intervals_overlap<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}
