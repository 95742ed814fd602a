//! Day- and hour-level availability scans.
//!
//! Candidate start times are laid on a grid anchored at local midnight
//! (`midnight + k * granularity`). A candidate only counts when its whole
//! interval fits before the next local midnight; ending exactly at midnight
//! is allowed.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::trace;

use crate::booking::Slot;
use crate::config::{ScanConfig, ScanStrategy};
use crate::conflict::is_available;
use crate::freebusy;
use crate::index::DayIndex;

/// First and last admissible start of a `duration_minutes` interval on `day`.
///
/// `None` when the duration is not positive or longer than the day.
pub(crate) fn candidate_window(
    day: NaiveDate,
    duration_minutes: i64,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    if duration_minutes <= 0 {
        return None;
    }
    let first = day.and_time(NaiveTime::MIN);
    let day_end = day.succ_opt()?.and_time(NaiveTime::MIN);
    let last = day_end.checked_sub_signed(Duration::try_minutes(duration_minutes)?)?;
    (last >= first).then_some((first, last))
}

/// `true` when an interval of `duration_minutes` starting at `start` ends no
/// later than the next local midnight.
pub(crate) fn fits_in_day(start: NaiveDateTime, duration_minutes: i64) -> bool {
    candidate_window(start.date(), duration_minutes).is_some_and(|(_, last)| start <= last)
}

/// Every candidate start of the day on the configured grid, in order.
pub fn candidate_starts(
    day: NaiveDate,
    duration_minutes: i64,
    config: &ScanConfig,
) -> impl Iterator<Item = NaiveDateTime> {
    let window = candidate_window(day, duration_minutes);
    let step = config.step();

    std::iter::successors(window.map(|(first, _)| first), move |current| {
        let (_, last) = window?;
        current.checked_add_signed(step).filter(|next| *next <= last)
    })
}

/// All free start times of the day, chronologically.
pub fn free_starts(
    day: NaiveDate,
    duration_minutes: i64,
    index: &DayIndex,
    exemption: Option<NaiveDateTime>,
    config: &ScanConfig,
) -> Vec<NaiveDateTime> {
    match config.strategy {
        ScanStrategy::MinuteScan => candidate_starts(day, duration_minutes, config)
            .filter(|start| is_available(*start, duration_minutes, index, exemption))
            .collect(),
        ScanStrategy::GapWalk => freebusy::free_starts(
            day,
            duration_minutes,
            index.intervals_on(day),
            exemption,
            config.step(),
        ),
    }
}

/// `true` if at least one interval of `duration_minutes` is free on `day`.
///
/// The minute scan stops at the first free candidate; a day with no bookings
/// answers on its very first candidate.
pub fn has_any_available_slot(
    day: NaiveDate,
    duration_minutes: i64,
    index: &DayIndex,
    exemption: Option<NaiveDateTime>,
    config: &ScanConfig,
) -> bool {
    let found = match config.strategy {
        ScanStrategy::MinuteScan => candidate_starts(day, duration_minutes, config)
            .any(|start| is_available(start, duration_minutes, index, exemption)),
        ScanStrategy::GapWalk => {
            !free_starts(day, duration_minutes, index, exemption, config).is_empty()
        }
    };
    trace!(%day, duration_minutes, found, "day availability scan");
    found
}

/// Every free interval of `duration_minutes` on `day`, in chronological order.
pub fn list_available_slots(
    day: NaiveDate,
    duration_minutes: i64,
    index: &DayIndex,
    exemption: Option<NaiveDateTime>,
    config: &ScanConfig,
) -> Vec<Slot> {
    free_starts(day, duration_minutes, index, exemption, config)
        .into_iter()
        .map(|start| Slot::starting_at(start, duration_minutes))
        .collect()
}

/// `true` when no sub-slot of the hour starting at `hour_start` is free.
///
/// Sub-slots sit every `hour_substep_minutes` inside the hour. One free
/// sub-slot keeps the whole hour selectable; a sub-slot that would run past
/// midnight never counts as free.
pub fn is_hour_blocked(
    hour_start: NaiveDateTime,
    duration_minutes: i64,
    index: &DayIndex,
    exemption: Option<NaiveDateTime>,
    config: &ScanConfig,
) -> bool {
    let Some(hour_end) = hour_start.checked_add_signed(Duration::hours(1)) else {
        return true;
    };
    let substep = config.hour_substep();

    let mut sub_slots = std::iter::successors(Some(hour_start), |t| {
        t.checked_add_signed(substep).filter(|next| *next < hour_end)
    });
    !sub_slots.any(|start| {
        fits_in_day(start, duration_minutes)
            && is_available(start, duration_minutes, index, exemption)
    })
}

/// Hours (0..24) of `day` in which every sub-slot is taken.
pub fn blocked_hours(
    day: NaiveDate,
    duration_minutes: i64,
    index: &DayIndex,
    exemption: Option<NaiveDateTime>,
    config: &ScanConfig,
) -> Vec<u32> {
    (0..24)
        .filter_map(|hour| day.and_hms_opt(hour, 0, 0))
        .filter(|start| is_hour_blocked(*start, duration_minutes, index, exemption, config))
        .map(|start| start.hour())
        .collect()
}

/// Minute offsets (0..60) from `hour_start` whose start time is not available.
///
/// Drives per-minute disabling in a time picker. Starts whose interval would
/// run past midnight are disabled too.
pub fn disabled_minutes(
    hour_start: NaiveDateTime,
    duration_minutes: i64,
    index: &DayIndex,
    exemption: Option<NaiveDateTime>,
) -> Vec<u32> {
    (0..60u32)
        .filter(|offset| {
            hour_start
                .checked_add_signed(Duration::minutes(i64::from(*offset)))
                .map_or(true, |start| {
                    !fits_in_day(start, duration_minutes)
                        || !is_available(start, duration_minutes, index, exemption)
                })
        })
        .collect()
}
