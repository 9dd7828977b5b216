#[cfg(test)]
mod tests {
    use crate::logic::{compute_slots, SchedulingParams};
    use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc, Weekday};
    use chrono_tz::Tz;
    use meetbot_common::BusyInterval;
    use proptest::prelude::*;

    // Helper function to create a list of busy periods
    fn create_busy_periods(
        base_time: DateTime<Utc>,
        count: usize,
        duration_minutes: i64,
        gap_minutes: i64,
    ) -> Vec<BusyInterval> {
        let mut busy_periods = Vec::new();
        let mut current_time = base_time;

        for _ in 0..count {
            let start = current_time + Duration::minutes(gap_minutes);
            let end = start + Duration::minutes(duration_minutes.max(1));
            busy_periods.push(BusyInterval::new(start, end));
            current_time = end;
        }

        busy_periods
    }

    fn params(
        work_start_hour: u32,
        work_end_hour: u32,
        duration_minutes: i64,
        step_minutes: i64,
        look_ahead_days: u32,
        max_slots: usize,
    ) -> SchedulingParams {
        SchedulingParams {
            work_start_hour,
            work_end_hour,
            slot_duration: Duration::minutes(duration_minutes),
            slot_step: Duration::minutes(step_minutes),
            look_ahead_days,
            max_slots,
            time_zone: Tz::Europe__Zurich,
        }
    }

    proptest! {
        #[test]
        fn test_slots_respect_every_invariant(
            now_offset_minutes in 0..(60 * 24 * 365i64),
            work_start_hour in 0..12u32,
            work_end_hour in 13..23u32,
            duration_minutes in 15..120i64,
            step_minutes in 15..90i64,
            look_ahead_days in 1..10u32,
            max_slots in 1..12usize,
            busy_count in 0..20usize,
            busy_duration in 10..300i64,
            busy_gap in 0..600i64,
        ) {
            let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(now_offset_minutes);
            let params = params(
                work_start_hour,
                work_end_hour,
                duration_minutes,
                step_minutes,
                look_ahead_days,
                max_slots,
            );
            let busy = create_busy_periods(now, busy_count, busy_duration, busy_gap);

            let slots = compute_slots(now, &busy, &params);

            prop_assert!(slots.len() <= max_slots);
            for slot in &slots {
                prop_assert!(slot.start > now, "slot {} not after now {}", slot.start, now);
                prop_assert_eq!(slot.end - slot.start, params.slot_duration);

                let local = slot.start.with_timezone(&params.time_zone);
                prop_assert!(!matches!(local.weekday(), Weekday::Sat | Weekday::Sun));
                prop_assert!(local.hour() >= work_start_hour);
                prop_assert!(local.hour() < work_end_hour);

                for interval in &busy {
                    prop_assert!(
                        !interval.overlaps(slot.start, slot.end),
                        "slot {}-{} overlaps busy {}-{}",
                        slot.start, slot.end, interval.start, interval.end
                    );
                }
            }
            for pair in slots.windows(2) {
                prop_assert!(pair[0].start < pair[1].start);
            }
        }

        #[test]
        fn test_empty_calendar_fills_the_cap(
            now_offset_minutes in 0..(60 * 24 * 365i64),
            max_slots in 1..10usize,
        ) {
            let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(now_offset_minutes);
            // Nine hours of 30 minute steps give 18 starts per working day.
            let params = params(9, 18, 30, 30, 7, max_slots);

            let slots = compute_slots(now, &[], &params);

            prop_assert_eq!(slots.len(), max_slots);
        }
    }
}
