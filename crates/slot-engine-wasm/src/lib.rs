//! WASM bindings for slot-engine.
//!
//! Exposes availability checks, day and hour scans, and the scheduling form
//! session to JavaScript via `wasm-bindgen`. Bookings and results cross the
//! boundary as JSON strings; timestamps are naive local strings such as
//! `"2026-03-02T10:15"` or `"2026-03-02T10:15:00"`.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```
//!
//! ## Form flow
//!
//! ```js
//! const form = new SchedulingForm();
//! const handle = form.selectCoordinator("alice");
//! const bookings = await api.fetchBookings(handle.coordinatorId);
//! form.applyBookings(handle, JSON.stringify(bookings)); // ignored if stale
//! form.checkSubmission("2026-03-02T10:15", 30);          // {"valid":true}
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use slot_engine::booking::BookingRecord;
use slot_engine::gate::{self, FieldError};
use slot_engine::scan;
use slot_engine::session::FetchResponse;
use slot_engine::{
    build_index, parse_booking_payload, parse_timestamp, DayIndex, FetchOutcome, FetchTicket,
    LoadState, ScanConfig, SchedulingSession, Slot,
};
use wasm_bindgen::prelude::*;

const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SlotDto {
    start: String,
    end: String,
    duration_minutes: i64,
}

impl From<&Slot> for SlotDto {
    fn from(slot: &Slot) -> Self {
        Self {
            start: slot.start.format(OUTPUT_FORMAT).to_string(),
            end: slot.end.format(OUTPUT_FORMAT).to_string(),
            duration_minutes: slot.duration_minutes,
        }
    }
}

/// Result of a field check, shaped for form libraries.
#[derive(Serialize)]
struct CheckDto {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl From<Result<(), FieldError>> for CheckDto {
    fn from(result: Result<(), FieldError>) -> Self {
        match result {
            Ok(()) => Self {
                valid: true,
                field: None,
                message: None,
            },
            Err(e) => Self {
                valid: false,
                field: Some(e.field),
                message: Some(e.message()),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
enum OutcomeDto {
    Applied { bookings: usize, skipped: usize },
    Stale,
    Closed,
    Failed { message: String },
}

impl From<FetchOutcome> for OutcomeDto {
    fn from(outcome: FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Applied { bookings, skipped } => Self::Applied { bookings, skipped },
            FetchOutcome::Stale => Self::Stale,
            FetchOutcome::Closed => Self::Closed,
            FetchOutcome::Failed(message) => Self::Failed { message },
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_js(message: String) -> JsValue {
    JsValue::from_str(&message)
}

fn parse_time(s: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(s).map_err(|e| e.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", s, e))
}

/// Parse an optional `ScanConfig` JSON object; missing fields take defaults.
fn parse_config(json: Option<&str>) -> Result<ScanConfig, String> {
    let config = match json {
        Some(json) => serde_json::from_str::<ScanConfig>(json)
            .map_err(|e| format!("Invalid config JSON: {}", e))?,
        None => ScanConfig::default(),
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn slots_json(slots: &[Slot]) -> Result<String, String> {
    let dtos: Vec<SlotDto> = slots.iter().map(SlotDto::from).collect();
    to_json(&dtos)
}

fn check_json(result: Result<(), FieldError>) -> Result<String, String> {
    to_json(&CheckDto::from(result))
}

fn state_name(state: LoadState) -> &'static str {
    match state {
        LoadState::Idle => "idle",
        LoadState::Loading => "loading",
        LoadState::Ready => "ready",
        LoadState::Failed => "failed",
    }
}

// ---------------------------------------------------------------------------
// SlotIndex: stateless queries over one bookings payload
// ---------------------------------------------------------------------------

/// An availability index built once from a bookings JSON array.
#[wasm_bindgen]
pub struct SlotIndex {
    index: DayIndex,
    exemption: Option<NaiveDateTime>,
    config: ScanConfig,
}

impl SlotIndex {
    fn build(
        bookings_json: &str,
        editing: Option<&str>,
        config_json: Option<&str>,
    ) -> Result<Self, String> {
        let records = parse_booking_payload(bookings_json).map_err(|e| e.to_string())?;
        let exemption = editing.map(parse_time).transpose()?;
        Ok(Self {
            index: build_index(&records),
            exemption,
            config: parse_config(config_json)?,
        })
    }
}

#[wasm_bindgen]
impl SlotIndex {
    /// Build an index from a JSON array of `{coordinatorId, startTime,
    /// durationMinutes, interviewId}` records. Malformed records are skipped.
    ///
    /// # Arguments
    /// - `bookings_json` -- the coordinator's bookings
    /// - `editing` -- original start of the booking being rescheduled, if any
    /// - `config_json` -- optional `{granularity_minutes, hour_substep_minutes, strategy}`
    #[wasm_bindgen(constructor)]
    pub fn new(
        bookings_json: &str,
        editing: Option<String>,
        config_json: Option<String>,
    ) -> Result<SlotIndex, JsValue> {
        Self::build(bookings_json, editing.as_deref(), config_json.as_deref()).map_err(to_js)
    }

    /// Number of indexed bookings.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.index.len()
    }

    #[wasm_bindgen(js_name = "isAvailable")]
    pub fn is_available(&self, start: &str, duration_minutes: i32) -> Result<bool, JsValue> {
        let start = parse_time(start).map_err(to_js)?;
        Ok(slot_engine::is_available(
            start,
            i64::from(duration_minutes),
            &self.index,
            self.exemption,
        ))
    }

    #[wasm_bindgen(js_name = "hasAnyAvailableSlot")]
    pub fn has_any_available_slot(
        &self,
        date: &str,
        duration_minutes: i32,
    ) -> Result<bool, JsValue> {
        let day = parse_date(date).map_err(to_js)?;
        Ok(scan::has_any_available_slot(
            day,
            i64::from(duration_minutes),
            &self.index,
            self.exemption,
            &self.config,
        ))
    }

    /// Returns a JSON array of `{start, end, duration_minutes}` objects in
    /// chronological order.
    #[wasm_bindgen(js_name = "listAvailableSlots")]
    pub fn list_available_slots(
        &self,
        date: &str,
        duration_minutes: i32,
    ) -> Result<String, JsValue> {
        let day = parse_date(date).map_err(to_js)?;
        let slots = scan::list_available_slots(
            day,
            i64::from(duration_minutes),
            &self.index,
            self.exemption,
            &self.config,
        );
        slots_json(&slots).map_err(to_js)
    }

    #[wasm_bindgen(js_name = "isHourBlocked")]
    pub fn is_hour_blocked(
        &self,
        hour_start: &str,
        duration_minutes: i32,
    ) -> Result<bool, JsValue> {
        let hour_start = parse_time(hour_start).map_err(to_js)?;
        Ok(scan::is_hour_blocked(
            hour_start,
            i64::from(duration_minutes),
            &self.index,
            self.exemption,
            &self.config,
        ))
    }

    /// Minute offsets within the hour that a picker should disable.
    #[wasm_bindgen(js_name = "disabledMinutes")]
    pub fn disabled_minutes(
        &self,
        hour_start: &str,
        duration_minutes: i32,
    ) -> Result<Vec<u32>, JsValue> {
        let hour_start = parse_time(hour_start).map_err(to_js)?;
        Ok(scan::disabled_minutes(
            hour_start,
            i64::from(duration_minutes),
            &self.index,
            self.exemption,
        ))
    }

    /// Returns `{"valid": true}` or `{"valid": false, "field", "message"}`.
    /// An unparseable start is reported as invalid, never as valid.
    #[wasm_bindgen(js_name = "checkSubmission")]
    pub fn check_submission(&self, start: &str, duration_minutes: i32) -> Result<String, JsValue> {
        let result = gate::check_raw_slot(
            start,
            i64::from(duration_minutes),
            &self.index,
            self.exemption,
        )
        .map(|_| ());
        check_json(result).map_err(to_js)
    }
}

// ---------------------------------------------------------------------------
// SchedulingForm: one form's session across coordinator switches
// ---------------------------------------------------------------------------

/// Identifies the fetch issued by `selectCoordinator`. Pass it back with the
/// response so late answers for an earlier selection are ignored.
#[wasm_bindgen]
pub struct FetchHandle {
    ticket: FetchTicket,
}

#[wasm_bindgen]
impl FetchHandle {
    #[wasm_bindgen(getter, js_name = "coordinatorId")]
    pub fn coordinator_id(&self) -> String {
        self.ticket.coordinator_id().to_string()
    }
}

#[wasm_bindgen]
pub struct SchedulingForm {
    session: SchedulingSession,
}

impl SchedulingForm {
    fn apply(
        &mut self,
        handle: &FetchHandle,
        result: Result<Vec<BookingRecord>, String>,
    ) -> Result<String, String> {
        let outcome = self.session.apply_fetch(FetchResponse {
            ticket: handle.ticket.clone(),
            result,
        });
        to_json(&OutcomeDto::from(outcome))
    }

    fn confirm(&mut self, booking_json: &str) -> Result<(), String> {
        let record: BookingRecord = serde_json::from_str(booking_json)
            .map_err(|e| format!("Invalid booking JSON: {}", e))?;
        let booking = record.to_booking().map_err(|e| e.to_string())?;
        self.session.confirm_booking(booking);
        Ok(())
    }
}

#[wasm_bindgen]
impl SchedulingForm {
    /// A form for scheduling a new interview.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<SchedulingForm, JsValue> {
        let config = parse_config(config_json.as_deref()).map_err(to_js)?;
        Ok(Self {
            session: SchedulingSession::new(config),
        })
    }

    /// A form for rescheduling the interview that starts at `original_start`.
    #[wasm_bindgen(js_name = "forEditing")]
    pub fn for_editing(
        original_start: &str,
        config_json: Option<String>,
    ) -> Result<SchedulingForm, JsValue> {
        let config = parse_config(config_json.as_deref()).map_err(to_js)?;
        let original_start = parse_time(original_start).map_err(to_js)?;
        Ok(Self {
            session: SchedulingSession::editing(config, original_start),
        })
    }

    /// `"idle"`, `"loading"`, `"ready"` or `"failed"`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_name(self.session.state()).to_string()
    }

    #[wasm_bindgen(getter, js_name = "isClosed")]
    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    /// Switch coordinators. The previous coordinator's bookings are dropped
    /// immediately; fetch the new ones and hand them to `applyBookings`.
    #[wasm_bindgen(js_name = "selectCoordinator")]
    pub fn select_coordinator(&mut self, coordinator_id: &str) -> FetchHandle {
        FetchHandle {
            ticket: self.session.select_coordinator(coordinator_id),
        }
    }

    /// Apply a fetched bookings array. Returns `{"outcome": "applied" |
    /// "stale" | "closed" | "failed", ...}` as JSON.
    #[wasm_bindgen(js_name = "applyBookings")]
    pub fn apply_bookings(
        &mut self,
        handle: &FetchHandle,
        bookings_json: &str,
    ) -> Result<String, JsValue> {
        let result = parse_booking_payload(bookings_json).map_err(|e| e.to_string());
        self.apply(handle, result).map_err(to_js)
    }

    #[wasm_bindgen(js_name = "applyFetchError")]
    pub fn apply_fetch_error(
        &mut self,
        handle: &FetchHandle,
        message: &str,
    ) -> Result<String, JsValue> {
        self.apply(handle, Err(message.to_string())).map_err(to_js)
    }

    /// Discard any fetch still in flight. Call when the form is dismissed.
    pub fn close(&mut self) {
        self.session.close();
    }

    #[wasm_bindgen(js_name = "isAvailable")]
    pub fn is_available(&self, start: &str, duration_minutes: i32) -> Result<bool, JsValue> {
        let start = parse_time(start).map_err(to_js)?;
        Ok(self.session.is_available(start, i64::from(duration_minutes)))
    }

    #[wasm_bindgen(js_name = "hasAnyAvailableSlot")]
    pub fn has_any_available_slot(
        &self,
        date: &str,
        duration_minutes: i32,
    ) -> Result<bool, JsValue> {
        let day = parse_date(date).map_err(to_js)?;
        Ok(self.session.has_any_available_slot(day, i64::from(duration_minutes)))
    }

    #[wasm_bindgen(js_name = "listAvailableSlots")]
    pub fn list_available_slots(
        &self,
        date: &str,
        duration_minutes: i32,
    ) -> Result<String, JsValue> {
        let day = parse_date(date).map_err(to_js)?;
        let slots = self
            .session
            .list_available_slots(day, i64::from(duration_minutes));
        slots_json(&slots).map_err(to_js)
    }

    #[wasm_bindgen(js_name = "isHourBlocked")]
    pub fn is_hour_blocked(
        &self,
        hour_start: &str,
        duration_minutes: i32,
    ) -> Result<bool, JsValue> {
        let hour_start = parse_time(hour_start).map_err(to_js)?;
        Ok(self.session.is_hour_blocked(hour_start, i64::from(duration_minutes)))
    }

    #[wasm_bindgen(js_name = "disabledMinutes")]
    pub fn disabled_minutes(
        &self,
        hour_start: &str,
        duration_minutes: i32,
    ) -> Result<Vec<u32>, JsValue> {
        let hour_start = parse_time(hour_start).map_err(to_js)?;
        Ok(self.session.disabled_minutes(hour_start, i64::from(duration_minutes)))
    }

    /// Re-check the selection against the current bookings right before
    /// submitting. Same JSON shape as `SlotIndex.checkSubmission`.
    #[wasm_bindgen(js_name = "checkSubmission")]
    pub fn check_submission(&self, start: &str, duration_minutes: i32) -> Result<String, JsValue> {
        let result = self
            .session
            .check_selection(start, i64::from(duration_minutes))
            .map(|_| ());
        check_json(result).map_err(to_js)
    }

    /// Merge the booking the backend returned after a successful create.
    #[wasm_bindgen(js_name = "confirmBooking")]
    pub fn confirm_booking(&mut self, booking_json: &str) -> Result<(), JsValue> {
        self.confirm(booking_json).map_err(to_js)
    }
}
