//! Property-based tests for the predicate and the day scans.
//!
//! These check invariants that must hold for *any* booking set, not just the
//! fixed scenarios in `scan_tests.rs`.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use slot_engine::booking::Booking;
use slot_engine::{
    build_index, is_available, list_available_slots, BookingRecord, DayIndex, ScanConfig,
    ScanStrategy,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn minute_of_day(minute: i64) -> NaiveDateTime {
    day().and_hms_opt(0, 0, 0).unwrap() + Duration::minutes(minute)
}

/// Bookings on the test day (plus a few spilling in from the day before),
/// possibly overlapping each other.
fn arb_bookings() -> impl Strategy<Value = Vec<Booking>> {
    prop::collection::vec((-120i64..1440, 1i64..=180), 0..12).prop_map(|specs| {
        specs
            .into_iter()
            .map(|(start, dur)| Booking::new(minute_of_day(start), dur).unwrap())
            .collect()
    })
}

fn arb_duration() -> impl Strategy<Value = i64> {
    1i64..=240
}

fn arb_granularity() -> impl Strategy<Value = i64> {
    prop_oneof![Just(1i64), Just(5), Just(15), Just(30), Just(45)]
}

fn arb_exemption() -> impl Strategy<Value = Option<NaiveDateTime>> {
    prop::option::of((0i64..1440).prop_map(minute_of_day))
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: gap walk and minute scan agree exactly
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn gap_walk_matches_minute_scan(
        bookings in arb_bookings(),
        duration in arb_duration(),
        granularity in arb_granularity(),
        exemption in arb_exemption(),
    ) {
        let index = DayIndex::from_bookings(&bookings);
        let scan = ScanConfig::default().with_granularity(granularity);
        let walk = scan.clone().with_strategy(ScanStrategy::GapWalk);

        let by_scan = list_available_slots(day(), duration, &index, exemption, &scan);
        let by_walk = list_available_slots(day(), duration, &index, exemption, &walk);

        prop_assert_eq!(by_scan, by_walk);
    }
}

// ---------------------------------------------------------------------------
// Property 2: every listed slot passes the predicate and fits in the day
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn listed_slots_are_available_and_within_day(
        bookings in arb_bookings(),
        duration in arb_duration(),
        granularity in arb_granularity(),
    ) {
        let index = DayIndex::from_bookings(&bookings);
        let cfg = ScanConfig::default().with_granularity(granularity);
        let next_midnight = minute_of_day(1440);

        for slot in list_available_slots(day(), duration, &index, None, &cfg) {
            prop_assert!(is_available(slot.start, duration, &index, None));
            prop_assert_eq!(slot.start.date(), day());
            prop_assert!(slot.end <= next_midnight);
            prop_assert_eq!(slot.end - slot.start, Duration::minutes(duration));
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: touching a booking's boundary from outside is never a conflict
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn adjacent_candidates_are_available(
        start in 240i64..1200,
        existing in 1i64..=180,
        requested in 1i64..=180,
    ) {
        let booking = Booking::new(minute_of_day(start), existing).unwrap();
        let index = DayIndex::from_bookings(&[booking.clone()]);

        // Ends exactly when the booking starts.
        let before = booking.start() - Duration::minutes(requested);
        prop_assert!(is_available(before, requested, &index, None));
        // Starts exactly when the booking ends.
        prop_assert!(is_available(booking.end(), requested, &index, None));
    }
}

// ---------------------------------------------------------------------------
// Property 4: rebuilding from the same records is observationally identical
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn rebuild_is_idempotent(
        bookings in arb_bookings(),
        probe in 0i64..1440,
        duration in arb_duration(),
    ) {
        let records: Vec<BookingRecord> = bookings.iter().map(BookingRecord::from).collect();
        let first = build_index(&records);
        let second = build_index(&records);

        prop_assert_eq!(&first, &second);
        let t = minute_of_day(probe);
        prop_assert_eq!(
            is_available(t, duration, &first, None),
            is_available(t, duration, &second, None)
        );
    }
}

// ---------------------------------------------------------------------------
// Property 5: overlapping a booking in its interior is always a conflict
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn starting_inside_a_booking_conflicts(
        start in 0i64..1200,
        existing in 2i64..=180,
        offset_seed in any::<u32>(),
        requested in 1i64..=180,
    ) {
        let offset = 1 + i64::from(offset_seed) % (existing - 1);
        let booking = Booking::new(minute_of_day(start), existing).unwrap();
        let index = DayIndex::from_bookings(&[booking]);
        prop_assert!(!is_available(minute_of_day(start + offset), requested, &index, None));
    }
}
