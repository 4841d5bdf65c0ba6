// libs/scheduling-cell/src/services/slots.rs

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{SchedulingError, Slot};
use crate::store::{AppointmentStore, ScheduleStore};
use crate::time;

/// Computes the bookable slots for a doctor on a calendar day by combining
/// availability windows with already-booked times. Pure read path: holds
/// no state between calls and takes `now` as an argument, so identical
/// inputs always produce identical output.
pub struct SlotGenerator {
    schedules: Arc<dyn ScheduleStore>,
    appointments: Arc<dyn AppointmentStore>,
}

impl SlotGenerator {
    pub fn new(schedules: Arc<dyn ScheduleStore>, appointments: Arc<dyn AppointmentStore>) -> Self {
        Self {
            schedules,
            appointments,
        }
    }

    /// Free slots of `slot_minutes` length for `doctor_id` on `date`,
    /// where `date` is a calendar day in the `offset` reference time zone.
    ///
    /// For today, generation starts no earlier than `now` rounded up to
    /// the next slot boundary; a slot is never emitted if it would spill
    /// past its window's end, start at an already-booked time, or start at
    /// or before `now`. Overlapping windows may propose the same start;
    /// duplicates are suppressed and the result is sorted ascending.
    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        offset: FixedOffset,
        slot_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<Slot>, SchedulingError> {
        if slot_minutes == 0 {
            return Ok(Vec::new());
        }

        let (day_start, day_end) = time::day_bounds(date, offset);
        debug!(
            "Computing {}-minute slots for doctor {} in [{}, {})",
            slot_minutes, doctor_id, day_start, day_end
        );

        let windows = self
            .schedules
            .list_windows_overlapping(doctor_id, day_start, day_end)
            .await?;
        if windows.is_empty() {
            // An unknown doctor and a doctor with no schedule look alike
            // here: both produce an empty day, not an error.
            return Ok(Vec::new());
        }

        let booked: HashSet<DateTime<Utc>> = self
            .appointments
            .list_booked(doctor_id, day_start, day_end)
            .await?
            .into_iter()
            .collect();

        let step = Duration::minutes(i64::from(slot_minutes));
        let is_today = time::contains(day_start, day_end, now);
        let mut starts: BTreeSet<DateTime<Utc>> = BTreeSet::new();

        for window in windows {
            let Some((window_start, window_end)) =
                time::clamp(window.start_time, window.end_time, day_start, day_end)
            else {
                continue;
            };

            let floor = if is_today {
                time::round_up_to_step(now, slot_minutes)
            } else {
                window_start
            };

            let mut cursor = window_start.max(floor);
            // No partial slots: stop before any slot that would spill past
            // the clamped window end.
            while cursor + step <= window_end {
                if cursor > now && !booked.contains(&cursor) {
                    starts.insert(cursor);
                }
                cursor += step;
            }
        }

        debug!("Found {} available slots for doctor {}", starts.len(), doctor_id);
        Ok(starts
            .into_iter()
            .map(|start_time| Slot {
                start_time,
                end_time: start_time + step,
            })
            .collect())
    }
}
