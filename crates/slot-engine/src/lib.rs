//! # slot-engine
//!
//! Interview-slot availability for a coordinator's calendar.
//!
//! Given the bookings a coordinator already has, the engine answers whether a
//! candidate interview start is free for a requested duration, which start
//! times of a day are free, and which hours of a day a picker should disable.
//! It is pure and synchronous; only its input (the booking list) arrives
//! asynchronously, through [`service::BookingService`].
//!
//! All times are naive local wall-clock times.
//!
//! ## Modules
//!
//! - [`booking`] — backend records, validated bookings, timestamp parsing
//! - [`index`] — per-day index of occupied intervals
//! - [`conflict`] — the availability predicate
//! - [`scan`] — day and hour scans over the predicate
//! - [`freebusy`] — gap-walk alternative to the minute scan
//! - [`gate`] — field-level validation for forms
//! - [`session`] — one form's state, with stale-fetch protection
//! - [`service`] — the booking backend seam
//! - [`config`] — scan granularity and strategy
//! - [`error`] — error types

pub mod booking;
pub mod config;
pub mod conflict;
pub mod error;
pub mod freebusy;
pub mod gate;
pub mod index;
pub mod scan;
pub mod service;
pub mod session;

pub use booking::{
    parse_booking_payload, parse_timestamp, Booking, BookingRecord, OccupiedInterval, Slot,
};
pub use config::{ScanConfig, ScanStrategy};
pub use conflict::{first_conflict, is_available};
pub use error::SlotError;
pub use gate::FieldError;
pub use index::{build_index, DayIndex};
pub use scan::{has_any_available_slot, is_hour_blocked, list_available_slots};
pub use session::{FetchOutcome, FetchTicket, LoadState, SchedulingSession};
