use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meetbot_common::BusyInterval;
use meetbot_gcal::logic::{compute_slots, SchedulingParams};

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
        let end = start + Duration::minutes(duration_minutes);
        busy_periods.push(BusyInterval::new(start, end));
        current_time = end;
    }

    busy_periods
}

fn params(max_slots: usize, look_ahead_days: u32) -> SchedulingParams {
    SchedulingParams {
        work_start_hour: 9,
        work_end_hour: 18,
        slot_duration: Duration::minutes(30),
        slot_step: Duration::minutes(30),
        look_ahead_days,
        max_slots,
        time_zone: Tz::Europe__Moscow,
    }
}

fn benchmark_compute_slots(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_slots");
    // Monday 2025-05-05 10:00 Moscow.
    let now = Utc.with_ymd_and_hms(2025, 5, 5, 7, 0, 0).unwrap();

    group.bench_function("empty_calendar", |b| {
        let params = params(5, 7);
        let busy: Vec<BusyInterval> = Vec::new();
        b.iter(|| compute_slots(black_box(now), black_box(&busy), black_box(&params)))
    });

    group.bench_function("busy_calendar_first_five", |b| {
        let params = params(5, 7);
        // Back-to-back meetings with short gaps for two weeks.
        let busy = create_busy_periods(now, 400, 45, 15);
        b.iter(|| compute_slots(black_box(now), black_box(&busy), black_box(&params)))
    });

    group.bench_function("busy_calendar_full_month", |b| {
        let params = params(usize::MAX, 30);
        let busy = create_busy_periods(now, 1000, 50, 40);
        b.iter(|| compute_slots(black_box(now), black_box(&busy), black_box(&params)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_compute_slots);
criterion_main!(benches);
