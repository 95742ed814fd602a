//! Booking records as delivered by the backend, and their validated form.
//!
//! All times are naive local wall-clock times. A record arriving with an
//! explicit UTC offset keeps the wall-clock time it was written with; the
//! offset itself is dropped.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SlotError};

/// Naive layouts accepted after RFC 3339 has been tried.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp into a naive local datetime.
///
/// Accepts RFC 3339 (`2026-03-02T10:00:00+01:00`, offset discarded),
/// `2026-03-02T10:00:00`, `2026-03-02T10:00`, and the same two forms with a
/// space instead of `T`. Fractional seconds are allowed.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SlotError::InvalidTimestamp(raw.to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| SlotError::InvalidTimestamp(raw.to_string()))
}

/// Opaque identifier as it appears in backend payloads: either a string or
/// an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Text(s) => f.write_str(s),
            RecordId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

/// One element of a coordinator's booking-list payload, exactly as received.
///
/// Every field is optional: upstream data may be incomplete, and incomplete
/// records are skipped rather than failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    #[serde(default, alias = "coordinator_id", skip_serializing_if = "Option::is_none")]
    pub coordinator_id: Option<RecordId>,
    #[serde(default, alias = "interview_id", skip_serializing_if = "Option::is_none")]
    pub interview_id: Option<RecordId>,
    #[serde(default, alias = "start_time", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, alias = "duration_minutes", skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
}

impl BookingRecord {
    /// Validate this record into a [`Booking`].
    ///
    /// # Errors
    /// `MissingField` when the start or duration is absent, `InvalidTimestamp`
    /// when the start does not parse, `InvalidDuration` when the duration is
    /// not positive.
    pub fn to_booking(&self) -> Result<Booking> {
        let raw_start = self
            .start_time
            .as_deref()
            .ok_or(SlotError::MissingField("start time"))?;
        let duration = self
            .duration_minutes
            .ok_or(SlotError::MissingField("duration"))?;
        let start = parse_timestamp(raw_start)?;

        let mut booking = Booking::new(start, duration)?;
        booking.coordinator_id = self.coordinator_id.as_ref().map(ToString::to_string);
        booking.interview_id = self.interview_id.as_ref().map(ToString::to_string);
        Ok(booking)
    }
}

impl From<&Booking> for BookingRecord {
    fn from(b: &Booking) -> Self {
        Self {
            coordinator_id: b.coordinator_id.as_deref().map(RecordId::from),
            interview_id: b.interview_id.as_deref().map(RecordId::from),
            start_time: Some(b.start.format("%Y-%m-%dT%H:%M:%S").to_string()),
            duration_minutes: Some(b.duration_minutes),
        }
    }
}

/// A validated booking: a positive duration starting at a known local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    coordinator_id: Option<String>,
    interview_id: Option<String>,
    start: NaiveDateTime,
    duration_minutes: i64,
}

impl Booking {
    /// Create a booking, rejecting non-positive durations and durations whose
    /// end time is not representable.
    pub fn new(start: NaiveDateTime, duration_minutes: i64) -> Result<Self> {
        end_of(start, duration_minutes)?;
        Ok(Self {
            coordinator_id: None,
            interview_id: None,
            start,
            duration_minutes,
        })
    }

    pub fn with_coordinator(mut self, coordinator_id: impl Into<String>) -> Self {
        self.coordinator_id = Some(coordinator_id.into());
        self
    }

    pub fn with_interview_id(mut self, interview_id: impl Into<String>) -> Self {
        self.interview_id = Some(interview_id.into());
        self
    }

    pub fn coordinator_id(&self) -> Option<&str> {
        self.coordinator_id.as_deref()
    }

    pub fn interview_id(&self) -> Option<&str> {
        self.interview_id.as_deref()
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }

    /// `start + duration_minutes`. Always representable (checked in [`Booking::new`]).
    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(self.duration_minutes)
    }

    /// Local calendar day the booking is indexed under.
    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn interval(&self) -> OccupiedInterval {
        OccupiedInterval {
            start: self.start,
            end: self.end(),
            interview_id: self.interview_id.clone(),
        }
    }
}

/// An occupied `{start, end}` range in a coordinator's day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupiedInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Carried for debugging only; never consulted by conflict logic.
    pub interview_id: Option<String>,
}

/// A candidate interval that passed the availability predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
}

impl Slot {
    pub(crate) fn starting_at(start: NaiveDateTime, duration_minutes: i64) -> Self {
        Self {
            start,
            end: start + Duration::minutes(duration_minutes),
            duration_minutes,
        }
    }
}

/// End of an interval of `duration_minutes` starting at `start`.
///
/// # Errors
/// `InvalidDuration` for zero, negative, or overflowing durations.
pub fn end_of(start: NaiveDateTime, duration_minutes: i64) -> Result<NaiveDateTime> {
    if duration_minutes <= 0 {
        return Err(SlotError::InvalidDuration(duration_minutes));
    }
    Duration::try_minutes(duration_minutes)
        .and_then(|d| start.checked_add_signed(d))
        .ok_or(SlotError::InvalidDuration(duration_minutes))
}

/// Validate every record, skipping the ones that carry no usable information.
pub fn valid_bookings(records: &[BookingRecord]) -> Vec<Booking> {
    let bookings: Vec<Booking> = records
        .iter()
        .filter_map(|record| match record.to_booking() {
            Ok(booking) => Some(booking),
            Err(e) => {
                debug!(interview_id = ?record.interview_id, "skipping booking record: {}", e);
                None
            }
        })
        .collect();

    if bookings.len() < records.len() {
        debug!(
            "kept {} of {} booking records",
            bookings.len(),
            records.len()
        );
    }
    bookings
}

/// Drop records explicitly tagged with a different coordinator.
///
/// Untagged records are kept: the list was fetched for `coordinator_id`.
pub fn scope_to_coordinator(
    records: Vec<BookingRecord>,
    coordinator_id: &str,
) -> Vec<BookingRecord> {
    records
        .into_iter()
        .filter(|record| match &record.coordinator_id {
            Some(id) => id.to_string() == coordinator_id,
            None => true,
        })
        .collect()
}

/// Parse a booking-list payload.
///
/// The top level must be a JSON array. Elements that are not booking-shaped
/// (wrong field types, non-objects) are skipped.
///
/// # Errors
/// `Payload` when the input is not valid JSON or is not an array.
pub fn parse_booking_payload(json: &str) -> Result<Vec<BookingRecord>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let total = values.len();

    let records: Vec<BookingRecord> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    if records.len() < total {
        debug!("{} payload elements were not booking records", total - records.len());
    }
    Ok(records)
}
