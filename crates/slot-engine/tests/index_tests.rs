//! Tests for building the per-day booking index.

use chrono::{NaiveDate, NaiveDateTime};
use slot_engine::booking::{BookingRecord, RecordId};
use slot_engine::{build_index, is_available, DayIndex};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn at(d: u32, hour: u32, min: u32) -> NaiveDateTime {
    day(d).and_hms_opt(hour, min, 0).unwrap()
}

fn record(start: &str, duration: i64) -> BookingRecord {
    BookingRecord {
        start_time: Some(start.to_string()),
        duration_minutes: Some(duration),
        ..Default::default()
    }
}

#[test]
fn bookings_grouped_by_start_day() {
    let records = vec![
        record("2026-03-02T09:00:00", 30),
        record("2026-03-02T14:00:00", 60),
        record("2026-03-03T10:00:00", 45),
    ];

    let index = build_index(&records);

    assert_eq!(index.len(), 3);
    assert_eq!(index.intervals_on(day(2)).len(), 2);
    assert_eq!(index.intervals_on(day(3)).len(), 1);
    assert!(index.intervals_on(day(4)).is_empty());
    assert_eq!(index.days().collect::<Vec<_>>(), vec![day(2), day(3)]);
}

#[test]
fn interval_end_is_start_plus_duration() {
    let index = build_index(&[record("2026-03-02T09:40:00", 50)]);
    let interval = &index.intervals_on(day(2))[0];
    assert_eq!(interval.start, at(2, 9, 40));
    assert_eq!(interval.end, at(2, 10, 30));
}

#[test]
fn malformed_records_are_skipped() {
    let records = vec![
        record("2026-03-02T09:00:00", 30),
        record("not a timestamp", 30),
        record("2026-03-02T11:00:00", 0),
        record("2026-03-02T12:00:00", -10),
        BookingRecord {
            start_time: None,
            duration_minutes: Some(30),
            ..Default::default()
        },
        BookingRecord {
            start_time: Some("2026-03-02T13:00:00".into()),
            duration_minutes: None,
            ..Default::default()
        },
    ];

    let index = build_index(&records);

    assert_eq!(index.len(), 1, "only the well-formed booking is indexed");
    assert_eq!(index.intervals_on(day(2))[0].start, at(2, 9, 0));
}

#[test]
fn empty_input_builds_empty_index() {
    let index = build_index(&[]);
    assert!(index.is_empty());
    assert_eq!(index, DayIndex::default());
}

#[test]
fn booking_past_midnight_stays_on_start_day() {
    let index = build_index(&[record("2026-03-02T23:30:00", 60)]);
    assert_eq!(index.intervals_on(day(2)).len(), 1);
    assert!(index.intervals_on(day(3)).is_empty());
    assert_eq!(index.intervals_on(day(2))[0].end, at(3, 0, 30));
}

#[test]
fn building_twice_is_idempotent() {
    let records = vec![
        record("2026-03-02T09:00:00", 30),
        record("2026-03-02T09:15:00", 30),
        record("2026-03-03T16:00:00", 90),
        record("garbage", 30),
    ];

    let first = build_index(&records);
    let second = build_index(&records);
    assert_eq!(first, second);

    for hour in 0..24 {
        for min in [0, 10, 15, 30, 45] {
            let t = at(2, hour, min);
            assert_eq!(
                is_available(t, 30, &first, None),
                is_available(t, 30, &second, None)
            );
        }
    }
}

#[test]
fn rebuilding_for_another_coordinator_leaks_nothing() {
    let coordinator_a = vec![
        BookingRecord {
            coordinator_id: Some(RecordId::from("a")),
            ..record("2026-03-02T09:00:00", 60)
        },
        BookingRecord {
            coordinator_id: Some(RecordId::from("a")),
            ..record("2026-03-02T13:00:00", 60)
        },
    ];
    let a_index = build_index(&coordinator_a);
    assert!(!is_available(at(2, 9, 0), 30, &a_index, None));

    // Coordinator B has no bookings at all.
    let b_index = build_index(&[]);
    for hour in 0..24 {
        for min in (0..60).step_by(5) {
            assert!(is_available(at(2, hour, min), 30, &b_index, None));
        }
    }
}
