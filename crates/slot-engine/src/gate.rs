//! Field-level validation for a form's date-time selection.
//!
//! Used twice per booking: when a value is picked, and again right before
//! submission, because the bookings may have changed in between.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::booking::parse_timestamp;
use crate::conflict::first_conflict;
use crate::error::SlotError;
use crate::index::DayIndex;

/// Form field holding the interview start.
pub const SCHEDULED_AT_FIELD: &str = "scheduledAt";
/// Form field holding the interview duration.
pub const DURATION_FIELD: &str = "durationMinutes";

/// A validation failure attached to one form field.
#[derive(Error, Debug)]
#[error("{field}: {source}")]
pub struct FieldError {
    pub field: &'static str,
    #[source]
    pub source: SlotError,
}

impl FieldError {
    pub(crate) fn new(field: &'static str, source: SlotError) -> Self {
        Self { field, source }
    }

    /// The human-readable message without the field prefix.
    pub fn message(&self) -> String {
        self.source.to_string()
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self.source, SlotError::Conflict { .. })
    }
}

/// Check a start time and duration against the index.
///
/// # Errors
/// A `durationMinutes` error for a non-positive duration, or a `scheduledAt`
/// error naming the requested time and the booking it collides with.
pub fn check_slot(
    start: NaiveDateTime,
    duration_minutes: i64,
    index: &DayIndex,
    exemption: Option<NaiveDateTime>,
) -> Result<(), FieldError> {
    match first_conflict(start, duration_minutes, index, exemption) {
        Ok(None) => Ok(()),
        Ok(Some(existing)) => Err(FieldError::new(
            SCHEDULED_AT_FIELD,
            SlotError::Conflict {
                requested: start,
                start: existing.start,
                end: existing.end,
            },
        )),
        Err(e) => Err(FieldError::new(DURATION_FIELD, e)),
    }
}

/// Parse a raw form value and check it. Unparseable input fails closed.
pub fn check_raw_slot(
    raw_start: &str,
    duration_minutes: i64,
    index: &DayIndex,
    exemption: Option<NaiveDateTime>,
) -> Result<NaiveDateTime, FieldError> {
    let start =
        parse_timestamp(raw_start).map_err(|e| FieldError::new(SCHEDULED_AT_FIELD, e))?;
    check_slot(start, duration_minutes, index, exemption)?;
    Ok(start)
}
