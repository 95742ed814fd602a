//! Tests for the availability predicate.

use chrono::{NaiveDate, NaiveDateTime};
use slot_engine::booking::Booking;
use slot_engine::{first_conflict, is_available, DayIndex, SlotError};

fn at(hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

/// Index holding a single booking.
fn index_with(start: NaiveDateTime, duration_minutes: i64) -> DayIndex {
    let booking = Booking::new(start, duration_minutes).unwrap();
    DayIndex::from_bookings(&[booking])
}

#[test]
fn back_to_back_after_existing_is_available() {
    // Existing 10:00-10:30, candidate 10:30-11:00
    let index = index_with(at(10, 0), 30);
    assert!(is_available(at(10, 30), 30, &index, None));
}

#[test]
fn back_to_back_before_existing_is_available() {
    // Existing 10:00-10:30, candidate 09:30-10:00
    let index = index_with(at(10, 0), 30);
    assert!(is_available(at(9, 30), 30, &index, None));
}

#[test]
fn exact_overlap_is_a_conflict() {
    let index = index_with(at(10, 0), 30);
    assert!(!is_available(at(10, 0), 30, &index, None));
}

#[test]
fn same_start_different_length_is_a_conflict() {
    let index = index_with(at(10, 0), 30);
    assert!(!is_available(at(10, 0), 5, &index, None));
    assert!(!is_available(at(10, 0), 120, &index, None));
}

#[test]
fn candidate_starting_inside_is_a_conflict() {
    // Existing 10:00-10:30, candidate 10:15-10:45
    let index = index_with(at(10, 0), 30);
    assert!(!is_available(at(10, 15), 30, &index, None));
}

#[test]
fn candidate_ending_inside_is_a_conflict() {
    // Existing 10:00-10:30, candidate 09:45-10:15
    let index = index_with(at(10, 0), 30);
    assert!(!is_available(at(9, 45), 30, &index, None));
}

#[test]
fn enclosing_candidate_is_a_conflict() {
    // Existing 10:00-10:15, candidate 09:45-10:30
    let index = index_with(at(10, 0), 15);
    assert!(!is_available(at(9, 45), 45, &index, None));
}

#[test]
fn enclosing_candidate_ending_with_existing_is_not_flagged() {
    // Existing 10:00-10:30, candidate 09:30-10:30: starts earlier and ends at
    // the same instant. None of the boundary rules fire.
    let index = index_with(at(10, 0), 30);
    assert!(is_available(at(9, 30), 60, &index, None));
}

#[test]
fn exemption_keeps_original_slot_available() {
    // Editing the 10:00 booking: the index still holds it.
    let index = index_with(at(10, 0), 30);
    let exemption = Some(at(10, 0));

    assert!(is_available(at(10, 0), 30, &index, exemption));
    // Any other start is checked against the still-occupied original slot.
    assert!(!is_available(at(10, 15), 30, &index, exemption));
    assert!(!is_available(at(9, 45), 30, &index, exemption));
    assert!(is_available(at(10, 30), 30, &index, exemption));
}

#[test]
fn exemption_does_not_apply_to_other_starts_on_empty_days() {
    let index = DayIndex::default();
    assert!(is_available(at(14, 0), 30, &index, Some(at(10, 0))));
}

#[test]
fn bookings_on_other_days_are_ignored() {
    let index = index_with(at(10, 0), 30);
    let next_day = NaiveDate::from_ymd_opt(2026, 3, 3)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    assert!(is_available(next_day, 30, &index, None));
}

#[test]
fn non_positive_duration_is_never_available() {
    let index = DayIndex::default();
    assert!(!is_available(at(10, 0), 0, &index, None));
    assert!(!is_available(at(10, 0), -15, &index, None));
    assert!(matches!(
        first_conflict(at(10, 0), 0, &index, None),
        Err(SlotError::InvalidDuration(0))
    ));
}

#[test]
fn first_conflict_reports_the_colliding_booking() {
    let booking = Booking::new(at(10, 0), 30)
        .unwrap()
        .with_interview_id("int-17");
    let index = DayIndex::from_bookings(&[booking]);

    let hit = first_conflict(at(10, 10), 30, &index, None)
        .unwrap()
        .expect("10:10 collides with the 10:00 booking");
    assert_eq!(hit.start, at(10, 0));
    assert_eq!(hit.end, at(10, 30));
    assert_eq!(hit.interview_id.as_deref(), Some("int-17"));
}

#[test]
fn unordered_bucket_is_fully_checked() {
    let bookings = vec![
        Booking::new(at(15, 0), 60).unwrap(),
        Booking::new(at(9, 0), 30).unwrap(),
        Booking::new(at(12, 0), 45).unwrap(),
    ];
    let index = DayIndex::from_bookings(&bookings);

    assert!(!is_available(at(9, 10), 15, &index, None));
    assert!(!is_available(at(12, 30), 30, &index, None));
    assert!(!is_available(at(15, 0), 30, &index, None));
    assert!(is_available(at(10, 0), 120, &index, None));
}
