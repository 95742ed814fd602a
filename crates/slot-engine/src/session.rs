//! One scheduling form's availability state.
//!
//! A session owns a single coordinator's bookings and the index derived from
//! them. Bookings arrive asynchronously; every fetch is issued a
//! [`FetchTicket`] carrying a monotonically increasing sequence number, and a
//! response is applied only if its ticket is still the latest one issued.
//! Switching coordinators or closing the form therefore makes every
//! outstanding response stale.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, error, info, warn};

use crate::booking::{self, Booking, BookingRecord, Slot};
use crate::config::ScanConfig;
use crate::conflict;
use crate::error::SlotError;
use crate::gate::{self, FieldError};
use crate::index::DayIndex;
use crate::scan;

/// Identifies one bookings fetch for one coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    coordinator_id: String,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn coordinator_id(&self) -> &str {
        &self.coordinator_id
    }
}

/// A completed fetch, ready to hand back to the session that issued it.
#[derive(Debug)]
pub struct FetchResponse<E> {
    pub ticket: FetchTicket,
    pub result: Result<Vec<BookingRecord>, E>,
}

/// Where the session's booking data stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No coordinator selected yet.
    #[default]
    Idle,
    Loading,
    Ready,
    /// The latest fetch failed; the index is empty.
    Failed,
}

/// What [`SchedulingSession::apply_fetch`] did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { bookings: usize, skipped: usize },
    /// A newer fetch was issued after this one; nothing changed.
    Stale,
    /// The session was closed; nothing changed.
    Closed,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SchedulingSession {
    config: ScanConfig,
    coordinator_id: Option<String>,
    latest_seq: u64,
    bookings: Vec<Booking>,
    /// Bookings confirmed for the current coordinator, re-merged into every
    /// fetch applied afterwards.
    confirmed: Vec<Booking>,
    index: DayIndex,
    exemption: Option<NaiveDateTime>,
    state: LoadState,
    closed: bool,
}

impl SchedulingSession {
    /// A session for scheduling a new interview.
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            coordinator_id: None,
            latest_seq: 0,
            bookings: Vec::new(),
            confirmed: Vec::new(),
            index: DayIndex::default(),
            exemption: None,
            state: LoadState::Idle,
            closed: false,
        }
    }

    /// A session for rescheduling the booking that currently starts at
    /// `original_start`. That exact start always stays available.
    pub fn editing(config: ScanConfig, original_start: NaiveDateTime) -> Self {
        Self {
            exemption: Some(original_start),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn coordinator_id(&self) -> Option<&str> {
        self.coordinator_id.as_deref()
    }

    pub fn exemption(&self) -> Option<NaiveDateTime> {
        self.exemption
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// `true` once the latest fetch has been applied successfully.
    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn index(&self) -> &DayIndex {
        &self.index
    }

    /// Switch to `coordinator_id` and issue the ticket for its fetch.
    ///
    /// The previous coordinator's bookings and index are discarded at once,
    /// and any fetch still in flight becomes stale.
    pub fn select_coordinator(&mut self, coordinator_id: impl Into<String>) -> FetchTicket {
        let coordinator_id = coordinator_id.into();
        self.latest_seq += 1;
        if self.coordinator_id.as_deref() != Some(coordinator_id.as_str()) {
            self.confirmed.clear();
        }
        self.bookings.clear();
        self.index = DayIndex::default();
        self.state = LoadState::Loading;
        info!(
            coordinator = %coordinator_id,
            seq = self.latest_seq,
            "coordinator selected, loading bookings"
        );
        self.coordinator_id = Some(coordinator_id.clone());

        FetchTicket {
            seq: self.latest_seq,
            coordinator_id,
        }
    }

    /// Apply a fetch result if, and only if, it answers the latest request.
    pub fn apply_fetch<E: fmt::Display>(&mut self, response: FetchResponse<E>) -> FetchOutcome {
        let FetchResponse { ticket, result } = response;

        if self.closed {
            debug!(seq = ticket.seq, "session closed, discarding fetch result");
            return FetchOutcome::Closed;
        }
        if ticket.seq != self.latest_seq {
            warn!(
                seq = ticket.seq,
                latest = self.latest_seq,
                coordinator = %ticket.coordinator_id,
                "discarding stale fetch result"
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(records) => {
                let received = records.len();
                let scoped = booking::scope_to_coordinator(records, &ticket.coordinator_id);
                if scoped.len() < received {
                    warn!(
                        coordinator = %ticket.coordinator_id,
                        dropped = received - scoped.len(),
                        "fetch returned bookings belonging to another coordinator"
                    );
                }
                let mut bookings = booking::valid_bookings(&scoped);
                let skipped = received - bookings.len();
                for confirmed in &self.confirmed {
                    bookings.retain(|b| !same_booking(b, confirmed));
                    bookings.push(confirmed.clone());
                }

                self.bookings = bookings;
                self.rebuild_index();
                self.state = LoadState::Ready;
                FetchOutcome::Applied {
                    bookings: self.bookings.len(),
                    skipped,
                }
            }
            Err(e) => {
                error!(coordinator = %ticket.coordinator_id, "failed to load bookings: {}", e);
                self.bookings.clear();
                self.index = DayIndex::default();
                self.state = LoadState::Failed;
                FetchOutcome::Failed(e.to_string())
            }
        }
    }

    /// Close the form. Results of fetches still in flight will be discarded.
    pub fn close(&mut self) {
        self.closed = true;
        self.latest_seq += 1;
        debug!("scheduling session closed");
    }

    pub fn is_available(&self, start: NaiveDateTime, duration_minutes: i64) -> bool {
        conflict::is_available(start, duration_minutes, &self.index, self.exemption)
    }

    pub fn has_any_available_slot(&self, day: NaiveDate, duration_minutes: i64) -> bool {
        scan::has_any_available_slot(
            day,
            duration_minutes,
            &self.index,
            self.exemption,
            &self.config,
        )
    }

    pub fn list_available_slots(&self, day: NaiveDate, duration_minutes: i64) -> Vec<Slot> {
        scan::list_available_slots(day, duration_minutes, &self.index, self.exemption, &self.config)
    }

    pub fn is_hour_blocked(&self, hour_start: NaiveDateTime, duration_minutes: i64) -> bool {
        scan::is_hour_blocked(
            hour_start,
            duration_minutes,
            &self.index,
            self.exemption,
            &self.config,
        )
    }

    pub fn blocked_hours(&self, day: NaiveDate, duration_minutes: i64) -> Vec<u32> {
        scan::blocked_hours(day, duration_minutes, &self.index, self.exemption, &self.config)
    }

    pub fn disabled_minutes(&self, hour_start: NaiveDateTime, duration_minutes: i64) -> Vec<u32> {
        scan::disabled_minutes(hour_start, duration_minutes, &self.index, self.exemption)
    }

    /// Validate a value picked in the form.
    ///
    /// # Errors
    /// Fails on the `scheduledAt` field until the latest fetch is applied.
    pub fn check_selection(
        &self,
        raw_start: &str,
        duration_minutes: i64,
    ) -> Result<NaiveDateTime, FieldError> {
        self.require_loaded()?;
        gate::check_raw_slot(raw_start, duration_minutes, &self.index, self.exemption)
    }

    /// Re-validate against the current index right before submitting.
    ///
    /// While bookings are loading, or after a failed fetch, the index is
    /// empty and proves nothing, so every submission is refused.
    pub fn check_submission(
        &self,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> Result<(), FieldError> {
        self.require_loaded()?;
        gate::check_slot(start, duration_minutes, &self.index, self.exemption)
    }

    /// Merge a booking the backend confirmed, then rebuild the index.
    ///
    /// When rescheduling, the booking at the original start is replaced and
    /// the exemption follows it to its new start.
    pub fn confirm_booking(&mut self, mut booking: Booking) {
        if booking.coordinator_id().is_none() {
            if let Some(current) = &self.coordinator_id {
                booking = booking.with_coordinator(current.clone());
            }
        }

        if let Some(original) = self.exemption {
            let replaced = self
                .bookings
                .iter()
                .position(|b| b.start() == original && b.interview_id() == booking.interview_id())
                .or_else(|| self.bookings.iter().position(|b| b.start() == original));
            if let Some(pos) = replaced {
                self.bookings.remove(pos);
            }
            self.exemption = Some(booking.start());
        }

        info!(
            start = %booking.start(),
            duration_minutes = booking.duration_minutes(),
            interview_id = ?booking.interview_id(),
            "booking confirmed"
        );
        self.confirmed.retain(|b| !same_booking(b, &booking));
        self.confirmed.push(booking.clone());
        self.bookings.push(booking);
        self.rebuild_index();
    }

    fn require_loaded(&self) -> Result<(), FieldError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(FieldError::new(
                gate::SCHEDULED_AT_FIELD,
                SlotError::BookingsNotLoaded,
            ))
        }
    }

    fn rebuild_index(&mut self) {
        self.index = DayIndex::from_bookings(&self.bookings);
        debug!(intervals = self.index.len(), "availability index rebuilt");
    }
}

/// Two bookings describe the same interview: equal interview ids, or, when
/// either id is missing, the same start and duration.
fn same_booking(a: &Booking, b: &Booking) -> bool {
    match (a.interview_id(), b.interview_id()) {
        (Some(x), Some(y)) => x == y,
        _ => a.start() == b.start() && a.duration_minutes() == b.duration_minutes(),
    }
}
