// --- File: crates/meetbot_gcal/src/logic.rs ---
use chrono::{
    DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use meetbot_common::{
    config_error, BusyInterval, CalendarService, CandidateSlot, Clock, MeetbotError, SystemClock,
};
use meetbot_config::SchedulingConfig;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// `strftime` pattern of [`CandidateSlot::display_label`], e.g. `06.05 at 09:00`.
pub const LABEL_FORMAT: &str = "%d.%m at %H:%M";

/// How many days past today we try when today's anchor does not exist locally.
const ANCHOR_SEARCH_DAYS: u32 = 3;

// --- Parameters ---

/// Validated scheduling parameters with the time zone already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingParams {
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    pub slot_duration: Duration,
    pub slot_step: Duration,
    pub look_ahead_days: u32,
    pub max_slots: usize,
    pub time_zone: Tz,
}

impl SchedulingParams {
    pub fn from_config(config: &SchedulingConfig) -> Result<Self, MeetbotError> {
        let time_zone = Tz::from_str(&config.time_zone)
            .map_err(|_| config_error(format!("unknown time zone: {}", config.time_zone)))?;
        if config.work_start_hour >= config.work_end_hour || config.work_end_hour > 23 {
            return Err(config_error(format!(
                "invalid working hours {}..{}",
                config.work_start_hour, config.work_end_hour
            )));
        }
        if config.meeting_duration_minutes == 0 || config.slot_step_minutes == 0 {
            return Err(config_error("meeting duration and slot step must be positive"));
        }

        Ok(Self {
            work_start_hour: config.work_start_hour,
            work_end_hour: config.work_end_hour,
            slot_duration: Duration::minutes(i64::from(config.meeting_duration_minutes)),
            slot_step: Duration::minutes(i64::from(config.slot_step_minutes)),
            look_ahead_days: config.look_ahead_days,
            max_slots: config.max_slots,
            time_zone,
        })
    }
}

// --- Search Window ---

/// The part of the calendar one slot search looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    /// The first working-day start strictly after `now`.
    pub start: DateTime<Utc>,
    /// Covers every slot that can start on `last_day`.
    pub end: DateTime<Utc>,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

/// Resolves a local wall-clock time. Ambiguous times take the earlier instant,
/// nonexistent ones yield `None`.
fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest()
}

fn local_at_hour(tz: &Tz, date: NaiveDate, hour: u32) -> Option<DateTime<Tz>> {
    resolve_local(tz, date.and_hms_opt(hour, 0, 0)?)
}

/// Computes the window a search at `now` covers.
///
/// The anchor is today's `work_start_hour` in the configured zone, pushed to
/// the next day when it is not strictly after `now`. Dates from the anchor's
/// date through `look_ahead_days` later are scanned. Returns `None` only when
/// no anchor can be resolved in the zone.
pub fn search_window(now: DateTime<Utc>, params: &SchedulingParams) -> Option<SearchWindow> {
    let tz = &params.time_zone;
    let local_now = now.with_timezone(tz);
    let mut date = local_now.date_naive();

    let mut anchor = None;
    for _ in 0..ANCHOR_SEARCH_DAYS {
        if let Some(candidate) = local_at_hour(tz, date, params.work_start_hour) {
            if candidate > local_now {
                anchor = Some(candidate);
                break;
            }
        }
        date = date.succ_opt()?;
    }
    let anchor = anchor?;

    let first_day = anchor.date_naive();
    let last_day = first_day.checked_add_days(Days::new(u64::from(params.look_ahead_days)))?;

    // Midnight after the last day, falling back one hour later in zones
    // where midnight itself is skipped.
    let day_after = last_day.succ_opt()?;
    let closing = local_at_hour(tz, day_after, 0)
        .or_else(|| local_at_hour(tz, day_after, 1))?
        .with_timezone(&Utc);

    Some(SearchWindow {
        start: anchor.with_timezone(&Utc),
        end: closing + params.slot_duration,
        first_day,
        last_day,
    })
}

// --- Slot Computation ---

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

fn is_slot_free(start: DateTime<Utc>, end: DateTime<Utc>, busy: &[BusyInterval]) -> bool {
    !busy.iter().any(|interval| interval.overlaps(start, end))
}

/// Appends the free slots of one local date to `slots`, stopping at `limit`.
fn collect_day(
    date: NaiveDate,
    now: DateTime<Utc>,
    busy: &[BusyInterval],
    params: &SchedulingParams,
    limit: usize,
    slots: &mut Vec<CandidateSlot>,
) {
    let tz = &params.time_zone;
    let Some(mut current) = local_at_hour(tz, date, params.work_start_hour) else {
        debug!("Working day start does not exist on {}, skipping", date);
        return;
    };

    while slots.len() < limit
        && current.date_naive() == date
        && current.hour() < params.work_end_hour
    {
        let start = current.with_timezone(&Utc);
        let end = start + params.slot_duration;
        if start > now && is_slot_free(start, end, busy) {
            slots.push(CandidateSlot {
                start,
                end,
                display_label: current.format(LABEL_FORMAT).to_string(),
            });
        }
        current += params.slot_step;
    }
}

/// Computes up to `max_slots` free candidate slots after `now`.
///
/// Slots start every `slot_step` from `work_start_hour` on each weekday in
/// the search window. A slot is kept while its local start hour is before
/// `work_end_hour`, so a meeting may run past the end of the working day.
/// Any overlap with a busy interval discards the slot. The result is in
/// strictly increasing start order.
pub fn compute_slots(
    now: DateTime<Utc>,
    busy: &[BusyInterval],
    params: &SchedulingParams,
) -> Vec<CandidateSlot> {
    let Some(window) = search_window(now, params) else {
        debug!("No search window for {} in {}", now, params.time_zone);
        return Vec::new();
    };

    let mut slots = Vec::new();
    let mut date = window.first_day;
    while date <= window.last_day && slots.len() < params.max_slots {
        if !is_weekend(date.weekday()) {
            collect_day(date, now, busy, params, params.max_slots, &mut slots);
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    debug!(
        "Computed {} slots between {} and {} with {} busy intervals",
        slots.len(),
        window.first_day,
        window.last_day,
        busy.len()
    );
    slots
}

// --- Slot Finder ---

/// Fetches busy intervals for the current window and turns them into slots.
pub struct SlotFinder {
    params: SchedulingParams,
    clock: Arc<dyn Clock>,
}

impl SlotFinder {
    pub fn new(params: SchedulingParams) -> Self {
        Self {
            params,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn params(&self) -> &SchedulingParams {
        &self.params
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Queries `calendar` and computes slots against a single reading of the clock.
    pub async fn find_slots(
        &self,
        calendar: &dyn CalendarService,
    ) -> Result<Vec<CandidateSlot>, MeetbotError> {
        let now = self.clock.now();
        let Some(window) = search_window(now, &self.params) else {
            return Ok(Vec::new());
        };

        let busy = calendar.list_busy_intervals(window.start, window.end).await?;
        debug!(
            "Calendar reported {} busy intervals in [{}, {})",
            busy.len(),
            window.start,
            window.end
        );
        Ok(compute_slots(now, &busy, &self.params))
    }
}
