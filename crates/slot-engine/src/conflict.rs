//! Availability predicate: does a candidate interval collide with a booking?
//!
//! Only the candidate's own day bucket is consulted. Back-to-back intervals
//! (one ends exactly when the other starts) are NOT conflicts.

use chrono::NaiveDateTime;

use crate::booking::{self, OccupiedInterval};
use crate::error::Result;
use crate::index::DayIndex;

/// Boundary rules between a candidate `[cs, ce]` and an existing `{s, e}`.
///
/// A conflict exists when the candidate starts strictly inside the existing
/// interval, ends strictly inside it, starts at the same instant, or starts
/// at or before it and ends strictly after it. A candidate that starts
/// earlier and ends at exactly the same instant as the existing interval
/// matches none of these and is not flagged.
pub fn collides(cs: NaiveDateTime, ce: NaiveDateTime, existing: &OccupiedInterval) -> bool {
    let (s, e) = (existing.start, existing.end);

    (cs > s && cs < e) || (ce > s && ce < e) || cs == s || (cs <= s && ce > e)
}

/// Find the first booking the candidate collides with.
///
/// Returns `Ok(None)` when the candidate is free, including when it starts
/// exactly at `exemption` (the original start of the booking being edited).
///
/// # Errors
/// `SlotError::InvalidDuration` when `duration_minutes` is not positive or the
/// candidate's end is not representable.
pub fn first_conflict<'a>(
    candidate_start: NaiveDateTime,
    duration_minutes: i64,
    index: &'a DayIndex,
    exemption: Option<NaiveDateTime>,
) -> Result<Option<&'a OccupiedInterval>> {
    let candidate_end = booking::end_of(candidate_start, duration_minutes)?;

    if exemption == Some(candidate_start) {
        return Ok(None);
    }

    Ok(index
        .intervals_on(candidate_start.date())
        .iter()
        .find(|existing| collides(candidate_start, candidate_end, existing)))
}

/// `true` when the candidate interval is free.
///
/// Invalid input (non-positive duration) is never available, so callers
/// gating a form fail closed.
pub fn is_available(
    candidate_start: NaiveDateTime,
    duration_minutes: i64,
    index: &DayIndex,
    exemption: Option<NaiveDateTime>,
) -> bool {
    matches!(
        first_conflict(candidate_start, duration_minutes, index, exemption),
        Ok(None)
    )
}
