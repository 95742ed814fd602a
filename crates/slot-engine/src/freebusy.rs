//! Gap-walk search for free start times.
//!
//! For a requested duration `d`, an occupied `{s, e}` blocks every candidate
//! start in the open window `(s - d, e)`, except the single start `e - d`
//! when `d > e - s` (that candidate encloses the booking but ends exactly with
//! it, which the predicate does not flag). Windows are sorted and merged, then
//! the grid is walked gap by gap, jumping over each merged window.
//!
//! Produces the same start times as testing every grid point with
//! [`crate::conflict::is_available`].

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::booking::OccupiedInterval;
use crate::scan::candidate_window;

/// Candidate starts blocked by one occupied interval.
#[derive(Debug, Clone, Copy)]
struct BlockedWindow {
    lo: NaiveDateTime,
    hi: NaiveDateTime,
    hole: Option<NaiveDateTime>,
}

impl BlockedWindow {
    fn new(existing: &OccupiedInterval, d: Duration) -> Self {
        let lo = existing
            .start
            .checked_sub_signed(d)
            .unwrap_or(NaiveDateTime::MIN);
        let hole = if d > existing.end - existing.start {
            existing.end.checked_sub_signed(d)
        } else {
            None
        };
        Self {
            lo,
            hi: existing.end,
            hole,
        }
    }

    fn contains(&self, t: NaiveDateTime) -> bool {
        self.lo < t && t < self.hi
    }
}

/// Merge open windows. Windows that only touch stay apart: the shared
/// endpoint belongs to neither.
fn merge_windows(windows: &[BlockedWindow]) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let mut spans: Vec<(NaiveDateTime, NaiveDateTime)> =
        windows.iter().map(|w| (w.lo, w.hi)).collect();
    spans.sort();

    let mut merged: Vec<(NaiveDateTime, NaiveDateTime)> = Vec::with_capacity(spans.len());
    for (lo, hi) in spans {
        if let Some(last) = merged.last_mut() {
            if lo < last.1 {
                last.1 = last.1.max(hi);
                continue;
            }
        }
        merged.push((lo, hi));
    }
    merged
}

fn on_grid(t: NaiveDateTime, first: NaiveDateTime, step: Duration) -> bool {
    let offset = t - first;
    offset.subsec_nanos() == 0 && offset.num_seconds() % step.num_seconds() == 0
}

/// First grid point at or after `t`.
fn align_up(t: NaiveDateTime, first: NaiveDateTime, step: Duration) -> Option<NaiveDateTime> {
    let step_secs = step.num_seconds();
    let k = (t - first).num_seconds().div_euclid(step_secs);
    let aligned = first.checked_add_signed(Duration::try_seconds(k.checked_mul(step_secs)?)?)?;
    if aligned < t {
        aligned.checked_add_signed(step)
    } else {
        Some(aligned)
    }
}

/// Free start times on `day` for `duration_minutes`, chronologically.
///
/// `intervals` is the day's bucket; `step` is the grid spacing and must be at
/// least one second.
pub fn free_starts(
    day: NaiveDate,
    duration_minutes: i64,
    intervals: &[OccupiedInterval],
    exemption: Option<NaiveDateTime>,
    step: Duration,
) -> Vec<NaiveDateTime> {
    if step.num_seconds() <= 0 {
        return Vec::new();
    }
    let Some((first, last)) = candidate_window(day, duration_minutes) else {
        return Vec::new();
    };
    let d = Duration::minutes(duration_minutes);

    let windows: Vec<BlockedWindow> = intervals.iter().map(|i| BlockedWindow::new(i, d)).collect();
    let merged = merge_windows(&windows);

    let mut free = Vec::new();
    let mut spans = merged.iter().peekable();
    let mut cursor = Some(first);

    while let Some(c) = cursor {
        if c > last {
            break;
        }
        while spans.next_if(|(_, hi)| *hi <= c).is_some() {}

        match spans.peek() {
            Some(&&(lo, hi)) if lo < c => cursor = align_up(hi, first, step),
            _ => {
                free.push(c);
                cursor = c.checked_add_signed(step);
            }
        }
    }

    let admissible = |t: NaiveDateTime| t >= first && t <= last && on_grid(t, first, step);

    for hole in windows.iter().filter_map(|w| w.hole) {
        let survives = windows
            .iter()
            .all(|w| !w.contains(hole) || w.hole == Some(hole));
        if survives && admissible(hole) {
            free.push(hole);
        }
    }
    if let Some(exempt) = exemption.filter(|t| admissible(*t)) {
        free.push(exempt);
    }

    free.sort();
    free.dedup();
    free
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn occupied(start: NaiveDateTime, end: NaiveDateTime) -> OccupiedInterval {
        OccupiedInterval {
            start,
            end,
            interview_id: None,
        }
    }

    #[test]
    fn touching_windows_stay_separate() {
        let d = Duration::minutes(30);
        let windows = [
            BlockedWindow::new(&occupied(at(9, 0), at(9, 30)), d),
            BlockedWindow::new(&occupied(at(10, 0), at(10, 30)), d),
        ];
        // (08:30, 09:30) and (09:30, 10:30) share 09:30, which is free.
        assert_eq!(merge_windows(&windows).len(), 2);
    }

    #[test]
    fn hole_only_for_longer_requests() {
        let existing = occupied(at(10, 0), at(10, 30));
        assert_eq!(
            BlockedWindow::new(&existing, Duration::minutes(60)).hole,
            Some(at(9, 30))
        );
        assert_eq!(BlockedWindow::new(&existing, Duration::minutes(30)).hole, None);
        assert_eq!(BlockedWindow::new(&existing, Duration::minutes(15)).hole, None);
    }

    #[test]
    fn align_up_lands_on_grid() {
        let first = at(0, 0);
        let step = Duration::minutes(15);
        assert_eq!(align_up(at(10, 7), first, step), Some(at(10, 15)));
        assert_eq!(align_up(at(10, 15), first, step), Some(at(10, 15)));
    }

    #[test]
    fn walk_skips_busy_window() {
        let day = at(0, 0).date();
        let intervals = [occupied(at(10, 0), at(11, 0))];
        let free = free_starts(day, 30, &intervals, None, Duration::minutes(30));
        assert!(free.contains(&at(9, 30)));
        assert!(!free.contains(&at(10, 0)));
        assert!(!free.contains(&at(10, 30)));
        assert!(free.contains(&at(11, 0)));
        assert_eq!(free.last(), Some(&at(23, 30)));
    }
}
