// libs/scheduling-cell/tests/slot_generation_test.rs
//
// Slot computation properties: rounding against "now", partial-window
// truncation, duplicate suppression, and ordered deterministic output.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use uuid::Uuid;

use scheduling_cell::models::AvailabilityWindow;
use scheduling_cell::services::slots::SlotGenerator;
use scheduling_cell::store::{InMemoryStore, ScheduleStore};

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

fn utc(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

fn date(raw: &str) -> NaiveDate {
    raw.parse().unwrap()
}

fn window(doctor_id: Uuid, start: &str, end: &str, is_available: bool) -> AvailabilityWindow {
    let now = Utc::now();
    AvailabilityWindow {
        id: Uuid::new_v4(),
        doctor_id,
        start_time: utc(start),
        end_time: utc(end),
        is_available,
        created_at: now,
        updated_at: now,
    }
}

struct TestSetup {
    store: Arc<InMemoryStore>,
    generator: SlotGenerator,
    doctor_id: Uuid,
}

impl TestSetup {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let generator = SlotGenerator::new(store.clone(), store.clone());
        Self {
            store,
            generator,
            doctor_id: Uuid::new_v4(),
        }
    }

    async fn seed_window(&self, start: &str, end: &str) {
        self.store
            .set_window(window(self.doctor_id, start, end, true))
            .await
            .unwrap();
    }

    async fn slots(
        &self,
        day: &str,
        offset_minutes: i32,
        duration: u32,
        now: &str,
    ) -> Vec<DateTime<Utc>> {
        let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
        self.generator
            .available_slots(self.doctor_id, date(day), offset, duration, utc(now))
            .await
            .unwrap()
            .into_iter()
            .map(|slot| slot.start_time)
            .collect()
    }
}

// ==============================================================================
// ROUNDING AND TRUNCATION
// ==============================================================================

#[tokio::test]
async fn first_slot_today_rounds_now_up_to_step() {
    let setup = TestSetup::new();
    setup
        .seed_window("2025-05-10T09:00:00Z", "2025-05-10T18:00:00Z")
        .await;

    let slots = setup
        .slots("2025-05-10", 0, 30, "2025-05-10T14:07:00Z")
        .await;

    // 14:07 -> 14:30, never 14:00 or 14:07
    assert_eq!(slots.first(), Some(&utc("2025-05-10T14:30:00Z")));
    assert!(!slots.contains(&utc("2025-05-10T14:00:00Z")));
    assert_eq!(slots.last(), Some(&utc("2025-05-10T17:30:00Z")));
}

#[tokio::test]
async fn window_shorter_than_slot_yields_nothing() {
    let setup = TestSetup::new();
    setup
        .seed_window("2025-05-10T09:50:00Z", "2025-05-10T10:10:00Z")
        .await;

    let slots = setup
        .slots("2025-05-10", 0, 30, "2025-05-09T08:00:00Z")
        .await;
    assert!(slots.is_empty());
}

#[tokio::test]
async fn no_partial_slot_at_window_end() {
    let setup = TestSetup::new();
    setup
        .seed_window("2025-05-10T09:00:00Z", "2025-05-10T10:45:00Z")
        .await;

    let slots = setup
        .slots("2025-05-10", 0, 30, "2025-05-09T08:00:00Z")
        .await;
    // 10:15-10:45 fits; 10:45-11:15 would spill past the window end
    assert_eq!(slots.last(), Some(&utc("2025-05-10T10:15:00Z")));
    assert_eq!(slots.len(), 3);
}

#[tokio::test]
async fn window_entirely_in_the_past_yields_nothing() {
    let setup = TestSetup::new();
    setup
        .seed_window("2025-05-10T09:00:00Z", "2025-05-10T11:00:00Z")
        .await;

    let slots = setup
        .slots("2025-05-10", 0, 30, "2025-05-10T12:00:00Z")
        .await;
    assert!(slots.is_empty());
}

#[tokio::test]
async fn slot_start_is_strictly_after_now() {
    let setup = TestSetup::new();
    setup
        .seed_window("2025-05-10T09:00:00Z", "2025-05-10T11:00:00Z")
        .await;

    // now sits exactly on a slot boundary: that slot is already gone
    let slots = setup
        .slots("2025-05-10", 0, 30, "2025-05-10T09:00:00Z")
        .await;
    assert_eq!(slots.first(), Some(&utc("2025-05-10T09:30:00Z")));
}

// ==============================================================================
// WINDOW COMBINATION AND DAY BOUNDARIES
// ==============================================================================

#[tokio::test]
async fn overlapping_windows_are_deduplicated_and_sorted() {
    let setup = TestSetup::new();
    setup
        .seed_window("2025-05-10T09:00:00Z", "2025-05-10T11:00:00Z")
        .await;
    setup
        .seed_window("2025-05-10T09:00:00Z", "2025-05-10T10:00:00Z")
        .await;

    let slots = setup
        .slots("2025-05-10", 0, 30, "2025-05-09T08:00:00Z")
        .await;

    let expected: Vec<DateTime<Utc>> = [
        "2025-05-10T09:00:00Z",
        "2025-05-10T09:30:00Z",
        "2025-05-10T10:00:00Z",
        "2025-05-10T10:30:00Z",
    ]
    .iter()
    .map(|s| utc(s))
    .collect();
    assert_eq!(slots, expected);
}

#[tokio::test]
async fn window_is_clamped_to_the_requested_day() {
    let setup = TestSetup::new();
    setup
        .seed_window("2025-05-09T22:00:00Z", "2025-05-10T02:00:00Z")
        .await;

    let slots = setup
        .slots("2025-05-10", 0, 30, "2025-05-08T08:00:00Z")
        .await;
    assert_eq!(slots.first(), Some(&utc("2025-05-10T00:00:00Z")));
    assert_eq!(slots.last(), Some(&utc("2025-05-10T01:30:00Z")));
    assert_eq!(slots.len(), 4);
}

#[tokio::test]
async fn unavailable_windows_are_excluded() {
    let setup = TestSetup::new();
    setup
        .store
        .set_window(window(
            setup.doctor_id,
            "2025-05-10T09:00:00Z",
            "2025-05-10T12:00:00Z",
            false,
        ))
        .await
        .unwrap();

    let slots = setup
        .slots("2025-05-10", 0, 30, "2025-05-09T08:00:00Z")
        .await;
    assert!(slots.is_empty());
}

#[tokio::test]
async fn doctor_without_windows_gets_empty_result() {
    let setup = TestSetup::new();
    let slots = setup
        .slots("2025-05-10", 0, 30, "2025-05-09T08:00:00Z")
        .await;
    assert!(slots.is_empty());
}

#[tokio::test]
async fn identical_inputs_yield_identical_output() {
    let setup = TestSetup::new();
    setup
        .seed_window("2025-05-10T09:00:00Z", "2025-05-10T13:00:00Z")
        .await;
    setup
        .seed_window("2025-05-10T11:00:00Z", "2025-05-10T15:00:00Z")
        .await;

    let first = setup
        .slots("2025-05-10", 0, 30, "2025-05-10T10:04:00Z")
        .await;
    let second = setup
        .slots("2025-05-10", 0, 30, "2025-05-10T10:04:00Z")
        .await;

    assert_eq!(first, second);
    assert!(first.windows(2).all(|pair| pair[0] < pair[1]));
}

// ==============================================================================
// END-TO-END SCENARIO (BANGKOK OFFSET)
// ==============================================================================

#[tokio::test]
async fn bangkok_morning_window_yields_six_slots() {
    let setup = TestSetup::new();
    setup
        .seed_window("2025-05-10T09:00:00+07:00", "2025-05-10T12:00:00+07:00")
        .await;

    let slots = setup
        .slots("2025-05-10", 7 * 60, 30, "2025-05-10T08:00:00+07:00")
        .await;

    let expected: Vec<DateTime<Utc>> = [
        "2025-05-10T09:00:00+07:00",
        "2025-05-10T09:30:00+07:00",
        "2025-05-10T10:00:00+07:00",
        "2025-05-10T10:30:00+07:00",
        "2025-05-10T11:00:00+07:00",
        "2025-05-10T11:30:00+07:00",
    ]
    .iter()
    .map(|s| utc(s))
    .collect();
    assert_eq!(slots, expected);
}
