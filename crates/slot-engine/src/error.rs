//! Error types for slot-engine operations.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    #[error("Invalid duration: {0} minutes (must be a positive number of minutes)")]
    InvalidDuration(i64),

    #[error("Booking is missing its {0}")]
    MissingField(&'static str),

    /// The requested start collides with an existing booking.
    #[error(
        "{} is not available: it conflicts with the interview booked from {} to {}",
        requested.format("%Y-%m-%d %H:%M"),
        start.format("%Y-%m-%d %H:%M"),
        end.format("%H:%M")
    )]
    Conflict {
        requested: NaiveDateTime,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("No coordinator selected")]
    NoCoordinator,

    /// The coordinator's bookings are loading or failed to load, so nothing
    /// can be confirmed free.
    #[error("Availability is unknown until the coordinator's bookings have loaded")]
    BookingsNotLoaded,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid booking payload: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SlotError>;
