//! Per-day index of a coordinator's occupied intervals.
//!
//! The index is rebuilt from scratch whenever the booking set changes. It
//! holds exactly one coordinator's bookings; scoping is the caller's job.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::booking::{self, Booking, BookingRecord, OccupiedInterval};

/// Occupied intervals grouped by the local calendar day their booking starts on.
///
/// Buckets are unordered. A booking that runs past midnight stays in the
/// bucket of the day it starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayIndex {
    days: BTreeMap<NaiveDate, Vec<OccupiedInterval>>,
}

impl DayIndex {
    /// Index already-validated bookings. Each booking is visited once.
    pub fn from_bookings<'a, I>(bookings: I) -> Self
    where
        I: IntoIterator<Item = &'a Booking>,
    {
        let mut days: BTreeMap<NaiveDate, Vec<OccupiedInterval>> = BTreeMap::new();
        for b in bookings {
            days.entry(b.day()).or_default().push(b.interval());
        }
        Self { days }
    }

    /// Occupied intervals for `day`, empty when the day has no bookings.
    pub fn intervals_on(&self, day: NaiveDate) -> &[OccupiedInterval] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Days that have at least one booking, in calendar order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Total number of indexed intervals.
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Build a [`DayIndex`] from raw backend records.
///
/// Records with a missing or unparseable start, or a missing or non-positive
/// duration, are skipped.
pub fn build_index(records: &[BookingRecord]) -> DayIndex {
    let bookings = booking::valid_bookings(records);
    let index = DayIndex::from_bookings(&bookings);
    debug!(
        "indexed {} bookings across {} days",
        index.len(),
        index.days.len()
    );
    index
}
