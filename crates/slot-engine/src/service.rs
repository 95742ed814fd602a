//! The booking backend seam.
//!
//! The REST layer lives outside this crate; it plugs in by implementing
//! [`BookingService`]. The helpers here drive a [`SchedulingSession`] through
//! fetches and submissions without ever letting a stale or unvalidated
//! result through.

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::booking::{Booking, BookingRecord};
use crate::error::SlotError;
use crate::gate::FieldError;
use crate::session::{FetchOutcome, FetchResponse, FetchTicket, SchedulingSession};

/// Boxed future returned by [`BookingService`] methods.
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Request body for creating an interview booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInterview {
    pub coordinator_id: String,
    pub start_time: NaiveDateTime,
    pub duration_minutes: i64,
}

/// Backend operations the scheduling form depends on.
pub trait BookingService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// All bookings of one coordinator.
    fn fetch_bookings(
        &self,
        coordinator_id: &str,
    ) -> BoxFuture<'_, Vec<BookingRecord>, Self::Error>;

    /// Create a booking; resolves to the record the backend stored.
    fn create_booking(&self, request: NewInterview) -> BoxFuture<'_, BookingRecord, Self::Error>;
}

#[derive(Error, Debug)]
pub enum SubmitError<E: std::error::Error + 'static> {
    /// The selection failed re-validation; the backend was not called.
    #[error(transparent)]
    Validation(#[from] FieldError),

    #[error("No coordinator selected")]
    NoCoordinator,

    #[error("Booking service error: {0}")]
    Service(#[source] E),
}

/// Run the fetch a ticket was issued for. Touches no session state, so any
/// number of these may be in flight; the session sorts out which one counts.
pub async fn fetch_bookings<S: BookingService>(
    service: &S,
    ticket: FetchTicket,
) -> FetchResponse<S::Error> {
    let result = service.fetch_bookings(ticket.coordinator_id()).await;
    FetchResponse { ticket, result }
}

/// Select `coordinator_id` and load its bookings into the session.
pub async fn load_coordinator<S: BookingService>(
    session: &mut SchedulingSession,
    service: &S,
    coordinator_id: &str,
) -> FetchOutcome {
    let ticket = session.select_coordinator(coordinator_id);
    let response = fetch_bookings(service, ticket).await;
    session.apply_fetch(response)
}

/// Re-validate the selection against the live index, create the booking, and
/// merge it into the session so later checks see it as occupied.
///
/// # Errors
/// `Validation` when the slot is no longer free or the coordinator's bookings
/// are not loaded (the service is not called in either case), `NoCoordinator`
/// when none is selected, `Service` when the backend fails.
pub async fn submit_interview<S: BookingService>(
    session: &mut SchedulingSession,
    service: &S,
    start: NaiveDateTime,
    duration_minutes: i64,
) -> Result<Booking, SubmitError<S::Error>> {
    let coordinator_id = session
        .coordinator_id()
        .ok_or(SubmitError::NoCoordinator)?
        .to_string();

    if let Err(e) = session.check_submission(start, duration_minutes) {
        warn!(coordinator = %coordinator_id, "submission blocked: {}", e);
        return Err(e.into());
    }

    let request = NewInterview {
        coordinator_id,
        start_time: start,
        duration_minutes,
    };
    let stored = service
        .create_booking(request)
        .await
        .map_err(SubmitError::Service)?;

    let booking = match stored.to_booking() {
        Ok(booking) => booking,
        Err(e) => {
            // The backend accepted the request; fall back to what was asked for.
            warn!("backend returned an incomplete booking record: {}", e);
            fallback_booking(&stored, start, duration_minutes)?
        }
    };

    info!(start = %booking.start(), "interview scheduled");
    session.confirm_booking(booking.clone());
    Ok(booking)
}

fn fallback_booking<E: std::error::Error + 'static>(
    stored: &BookingRecord,
    start: NaiveDateTime,
    duration_minutes: i64,
) -> Result<Booking, SubmitError<E>> {
    let booking = Booking::new(start, duration_minutes).map_err(|e: SlotError| {
        SubmitError::Validation(FieldError {
            field: crate::gate::DURATION_FIELD,
            source: e,
        })
    })?;
    Ok(match &stored.interview_id {
        Some(id) => booking.with_interview_id(id.to_string()),
        None => booking,
    })
}
