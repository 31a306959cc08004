//! Property-based tests for slot resolution and booking commits.
//!
//! These check invariants that must hold for *any* template, duration and set
//! of existing bookings, not just the fixed scenarios in the other test files.

mod common;

use booking_engine::interval::TimeRange;
use booking_engine::resolver::AvailabilityResolver;
use booking_engine::{
    AvailabilityTemplate, Booking, BookingEngine, DayRule, EngineConfig, EventType, FixedClock,
    InMemoryStore, SlotGenerator,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use common::*;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A day rule on the quarter-hour grid; about one day in four is closed.
fn arb_day_rule() -> impl Strategy<Value = DayRule> {
    (any::<bool>(), any::<bool>(), 0u32..80, 1u32..16).prop_map(|(a, b, start_q, len_q)| {
        let start = start_q * 15;
        let end = (start + len_q * 60).min(24 * 60 - 15);
        let rule = DayRule::open(minutes(start), minutes(end.max(start + 15)));
        if a && b {
            DayRule::closed()
        } else {
            rule
        }
    })
}

fn arb_template() -> impl Strategy<Value = AvailabilityTemplate> {
    (proptest::collection::vec(arb_day_rule(), 7), 0u32..240).prop_map(|(rules, lead)| {
        let mut template = AvailabilityTemplate::closed(HOST).with_lead_minutes(lead);
        for (day, rule) in WEEKDAYS.iter().zip(rules) {
            template.days.set(*day, rule);
        }
        template
    })
}

fn arb_duration() -> impl Strategy<Value = u32> {
    prop_oneof![Just(15u32), Just(30), Just(45), Just(60), Just(90), 1u32..=240]
}

/// A date in the two weeks following Friday 2026-03-13.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1i64..=14).prop_map(|offset| date(2026, 3, 13) + Duration::days(offset))
}

/// Non-overlapping existing bookings on `date`: start offsets on a 5-minute grid.
fn arb_bookings() -> impl Strategy<Value = Vec<(u32, u32)>> {
    proptest::collection::vec((0u32..288, 1u32..12), 0..8)
}

fn minutes(m: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(m * 60, 0).unwrap()
}

fn prop_config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

/// Lay out `raw` bookings on `date` back to back from their offsets, dropping
/// any that would overlap an earlier one.
fn place_bookings(event: &EventType, on: NaiveDate, raw: &[(u32, u32)]) -> Vec<Booking> {
    let mut placed: Vec<Booking> = Vec::new();
    let midnight = on.and_time(NaiveTime::MIN).and_utc();
    for (offset, len) in raw {
        let start = midnight + Duration::minutes(*offset as i64 * 5);
        let end = start + Duration::minutes(*len as i64 * 5);
        let range = TimeRange::new(start, end);
        if placed.iter().any(|b| b.range().overlaps(&range)) {
            continue;
        }
        let mut booking = confirmed(event, start);
        booking.end_time = end;
        placed.push(booking);
    }
    placed
}

// ---------------------------------------------------------------------------
// Property 1: unavailable weekdays never yield slots
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(prop_config())]

    #[test]
    fn unavailable_weekday_has_no_slots(
        template in arb_template(),
        on in arb_date(),
        dur in arb_duration(),
    ) {
        let event = EventType::new(HOST, "Call", dur);
        let store = store_with(template.clone(), &[event.clone()]);
        let resolver = AvailabilityResolver::new(&store, SlotGenerator::default());

        let map = resolver
            .resolve_available_slots(&template, &event, on, on, friday_noon())
            .unwrap();

        if !template.rule_for(on.weekday()).is_available {
            prop_assert!(map.is_empty());
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: free = candidates - candidates overlapping a booking
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(prop_config())]

    #[test]
    fn free_count_is_candidates_minus_overlaps(
        template in arb_template(),
        on in arb_date(),
        dur in arb_duration(),
        raw in arb_bookings(),
    ) {
        let event = EventType::new(HOST, "Call", dur);
        let store = store_with(template.clone(), &[event.clone()]);
        let bookings = place_bookings(&event, on, &raw);
        for b in &bookings {
            store.put_booking(b.clone()).unwrap();
        }

        let generator = SlotGenerator::default();
        let candidates = generator.generate_slots(&template, on, dur, friday_noon());
        let blocked = candidates
            .iter()
            .filter(|slot| bookings.iter().any(|b| b.range().overlaps(&slot.range())))
            .count();

        let map = AvailabilityResolver::new(&store, generator)
            .resolve_available_slots(&template, &event, on, on, friday_noon())
            .unwrap();
        let free = map.get(&on).map_or(0, Vec::len);

        prop_assert_eq!(free, candidates.len() - blocked);
        prop_assert!(map.get(&on).is_none_or(|times| !times.is_empty()));
    }
}

// ---------------------------------------------------------------------------
// Property 3: resolution is idempotent and sorted
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(prop_config())]

    #[test]
    fn resolution_is_idempotent_and_ascending(
        template in arb_template(),
        dur in arb_duration(),
    ) {
        let event = EventType::new(HOST, "Call", dur);
        let engine = BookingEngine::with_clock(
            store_with(template, &[event.clone()]),
            clock(),
            EngineConfig::default(),
        )
        .unwrap();

        let from = date(2026, 3, 14);
        let to = date(2026, 3, 27);
        let first = engine.resolve_available_slots(HOST, event.id, from, to).unwrap();
        let second = engine.resolve_available_slots(HOST, event.id, from, to).unwrap();
        prop_assert_eq!(&first, &second);

        for times in first.values() {
            for pair in times.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: any offered slot commits, with the event's exact duration
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(prop_config())]

    #[test]
    fn offered_slot_round_trips_through_commit(
        template in arb_template(),
        on in arb_date(),
        dur in arb_duration(),
        pick in any::<prop::sample::Index>(),
    ) {
        let event = EventType::new(HOST, "Call", dur);
        let engine = BookingEngine::with_clock(
            store_with(template, &[event.clone()]),
            FixedClock(friday_noon()),
            EngineConfig::default(),
        )
        .unwrap();

        let map = engine.resolve_available_slots(HOST, event.id, on, on).unwrap();
        if let Some(times) = map.get(&on) {
            let chosen = times[pick.index(times.len())];
            let start = on.and_time(chosen).and_utc();
            let booking = engine.commit_booking(request(&event, start)).unwrap();
            prop_assert_eq!(booking.end_time - booking.start_time, event.duration());

            let after = engine.resolve_available_slots(HOST, event.id, on, on).unwrap();
            prop_assert!(after.get(&on).is_none_or(|t| !t.contains(&chosen)));
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: committed bookings never overlap
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(prop_config())]

    #[test]
    fn committed_bookings_never_overlap(
        starts in proptest::collection::vec(0u32..32, 1..20),
        dur in prop_oneof![Just(30u32), Just(45), Just(60), Just(90)],
    ) {
        let event = EventType::new(HOST, "Call", dur);
        let store = InMemoryStore::new();
        store.put_template(monday_template().with_lead_minutes(0)).unwrap();
        store.put_event_type(event.clone()).unwrap();
        let engine = BookingEngine::with_clock(store, clock(), EngineConfig::default()).unwrap();

        for s in starts {
            let start = utc(2026, 3, 16, 9, 0) + Duration::minutes(s as i64 * 15);
            let _ = engine.commit_booking(request(&event, start));
        }

        let all = engine.store().all_bookings(HOST).unwrap();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                prop_assert!(!a.range().overlaps(&b.range()), "{:?} overlaps {:?}", a, b);
            }
        }
    }
}
