#[cfg(test)]
mod tests {
    use crate::logic::{compute_slots, search_window, SchedulingParams};
    use chrono::{Duration, TimeZone, Utc};
    use chrono_tz::Tz;

    fn params(time_zone: Tz, start: u32, end: u32) -> SchedulingParams {
        SchedulingParams {
            work_start_hour: start,
            work_end_hour: end,
            slot_duration: Duration::minutes(30),
            slot_step: Duration::minutes(30),
            look_ahead_days: 0,
            max_slots: 10,
            time_zone,
        }
    }

    #[test]
    fn test_spring_forward_skips_missing_hour() {
        // Israel moves 02:00 -> 03:00 on Friday 2025-03-28.
        let now = Utc.with_ymd_and_hms(2025, 3, 27, 12, 0, 0).unwrap();

        let slots = compute_slots(now, &[], &params(Tz::Asia__Jerusalem, 1, 4));

        let labels: Vec<&str> = slots.iter().map(|s| s.display_label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["28.03 at 01:00", "28.03 at 01:30", "28.03 at 03:00", "28.03 at 03:30"]
        );
        // 01:30 standard time and 03:00 daylight time are 30 minutes apart.
        assert_eq!(slots[2].start - slots[1].start, Duration::minutes(30));
    }

    #[test]
    fn test_missing_day_start_skips_the_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 27, 12, 0, 0).unwrap();
        let mut params = params(Tz::Asia__Jerusalem, 2, 4);
        params.look_ahead_days = 3;

        let slots = compute_slots(now, &[], &params);

        // Friday's 02:00 does not exist and the weekend follows.
        assert_eq!(slots[0].display_label, "31.03 at 02:00");
        assert_eq!(
            slots[0].start,
            Utc.with_ymd_and_hms(2025, 3, 30, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_ambiguous_anchor_takes_earliest_instant() {
        // Zurich repeats 02:00-03:00 on 2025-10-26; the first 02:00 is CEST.
        let now = Utc.with_ymd_and_hms(2025, 10, 25, 12, 0, 0).unwrap();

        let window = search_window(now, &params(Tz::Europe__Zurich, 2, 4)).unwrap();

        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 10, 26, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_slots_are_strictly_after_now_across_midnight_utc() {
        // 23:30 UTC is already the next local day in Moscow.
        let now = Utc.with_ymd_and_hms(2025, 5, 5, 23, 30, 0).unwrap();

        let slots = compute_slots(now, &[], &params(Tz::Europe__Moscow, 9, 18));

        assert_eq!(slots[0].display_label, "06.05 at 09:00");
        assert!(slots.iter().all(|s| s.start > now));
    }
}
