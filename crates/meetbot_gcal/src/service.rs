// --- File: crates/meetbot_gcal/src/service.rs ---
//! Google Calendar service implementation.
//!
//! This module provides an implementation of the CalendarService trait for Google Calendar.

use chrono::{DateTime, Utc};
use google_calendar3::api::{
    ConferenceData, ConferenceSolutionKey, CreateConferenceRequest, Event, EventAttendee,
    EventDateTime, FreeBusyRequest, FreeBusyRequestItem,
};
use meetbot_common::validation::is_valid_email;
use meetbot_common::{
    api_error, auth_error, transient_error, BookedMeeting, BoxFuture, BusyInterval,
    CalendarService, EventRequest, MeetbotError,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::HubType;

const SERVICE_NAME: &str = "gcal";

/// Conference solution Google attaches as a Meet link.
pub const MEET_SOLUTION: &str = "hangoutsMeet";

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
    calendar_id: String,
    timeout: Duration,
}

impl GoogleCalendarService {
    /// Create a new Google Calendar service.
    pub fn new(
        calendar_hub: Arc<HubType>,
        calendar_id: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            calendar_hub,
            calendar_id: calendar_id.into(),
            timeout,
        }
    }
}

/// Maps a Google API failure onto the shared error taxonomy.
pub fn classify_api_error(err: google_calendar3::Error) -> MeetbotError {
    use google_calendar3::Error as ApiError;

    match err {
        ApiError::MissingToken(e) => auth_error(format!("no access token: {}", e)),
        ApiError::MissingAPIKey => auth_error("no API key or token configured"),
        ApiError::HttpError(e) => transient_error(e),
        ApiError::Io(e) => transient_error(e),
        ApiError::BadRequest(body) => {
            let status = body
                .pointer("/error/code")
                .and_then(|code| code.as_u64())
                .and_then(|code| u16::try_from(code).ok())
                .unwrap_or(400);
            classify_status(status, body.to_string())
        }
        ApiError::Failure(response) => {
            let status = response.status();
            classify_status(status.as_u16(), format!("HTTP {}", status))
        }
        other => api_error(SERVICE_NAME, other),
    }
}

fn classify_status(status: u16, message: String) -> MeetbotError {
    match status {
        401 | 403 => auth_error(message),
        500..=599 => transient_error(message),
        _ => api_error(SERVICE_NAME, message),
    }
}

/// Runs a Google API call under `limit`. An elapsed timer counts as a network failure.
async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, MeetbotError>
where
    F: Future<Output = Result<T, google_calendar3::Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(classify_api_error),
        Err(_) => Err(transient_error(format!(
            "Google Calendar did not answer within {}s",
            limit.as_secs()
        ))),
    }
}

/// Attendee list for `request`. Invalid addresses are dropped with a warning.
pub fn attendees_for(request: &EventRequest) -> Option<Vec<EventAttendee>> {
    let email = request.attendee_email.as_deref()?;
    if !is_valid_email(email) {
        warn!("Dropping invalid attendee email: {}", email);
        return None;
    }
    Some(vec![EventAttendee {
        email: Some(email.to_string()),
        ..Default::default()
    }])
}

/// Builds the event body for `request`, asking Google for a Meet conference.
pub fn build_event(request: &EventRequest, conference_request_id: String) -> Event {
    Event {
        summary: Some(request.title.clone()),
        start: Some(EventDateTime {
            date_time: Some(request.start),
            time_zone: Some(request.time_zone.clone()),
            ..Default::default()
        }),
        end: Some(EventDateTime {
            date_time: Some(request.end),
            time_zone: Some(request.time_zone.clone()),
            ..Default::default()
        }),
        attendees: attendees_for(request),
        conference_data: Some(ConferenceData {
            create_request: Some(CreateConferenceRequest {
                request_id: Some(conference_request_id),
                conference_solution_key: Some(ConferenceSolutionKey {
                    type_: Some(MEET_SOLUTION.to_string()),
                }),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// The video entry point of a created event, or its calendar page.
pub fn meeting_link(event: &Event) -> Option<String> {
    event
        .conference_data
        .as_ref()
        .and_then(|data| data.entry_points.as_ref())
        .and_then(|points| {
            points
                .iter()
                .find(|point| point.entry_point_type.as_deref() == Some("video"))
        })
        .and_then(|point| point.uri.clone())
        .or_else(|| event.html_link.clone())
}

impl CalendarService for GoogleCalendarService {
    /// Queries the free/busy endpoint for the configured calendar.
    ///
    /// Periods missing a start or end are skipped. The result is sorted by start.
    fn list_busy_intervals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusyInterval>> {
        let calendar_id = self.calendar_id.clone();
        let calendar_hub = self.calendar_hub.clone();
        let timeout = self.timeout;

        Box::pin(async move {
            let req = FreeBusyRequest {
                time_min: Some(start),
                time_max: Some(end),
                time_zone: Some("UTC".to_string()),
                items: Some(vec![FreeBusyRequestItem {
                    id: Some(calendar_id.clone()),
                    ..Default::default()
                }]),
                ..Default::default()
            };

            let (_response, freebusy_response) =
                with_timeout(timeout, calendar_hub.freebusy().query(req).doit()).await?;

            let mut busy_periods = Vec::new();

            // Extract busy periods for the specified calendar
            if let Some(calendars) = freebusy_response.calendars {
                if let Some(cal_info) = calendars.get(&calendar_id) {
                    if let Some(errors) = cal_info.errors.as_ref().filter(|e| !e.is_empty()) {
                        let reasons: Vec<String> = errors
                            .iter()
                            .map(|e| e.reason.clone().unwrap_or_else(|| "unknown".to_string()))
                            .collect();
                        return Err(api_error(
                            SERVICE_NAME,
                            format!("calendar {} unavailable: {}", calendar_id, reasons.join(", ")),
                        ));
                    }
                    if let Some(busy_times) = &cal_info.busy {
                        for period in busy_times {
                            if let (Some(start_dt), Some(end_dt)) = (period.start, period.end) {
                                busy_periods.push(BusyInterval::new(start_dt, end_dt));
                            } else {
                                debug!("Skipping busy period with missing start/end: {:?}", period);
                            }
                        }
                    }
                }
            }
            busy_periods.sort_by_key(|interval| interval.start);
            Ok(busy_periods)
        })
    }

    /// Inserts the event with a Meet conference request and returns its link.
    ///
    /// The attendee is attached only when the address validates.
    fn create_event(&self, request: EventRequest) -> BoxFuture<'_, BookedMeeting> {
        let calendar_id = self.calendar_id.clone();
        let calendar_hub = self.calendar_hub.clone();
        let timeout = self.timeout;

        Box::pin(async move {
            let new_event = build_event(&request, format!("meetbot-{}", Uuid::new_v4()));

            let (_response, created_event) = with_timeout(
                timeout,
                calendar_hub
                    .events()
                    .insert(new_event, &calendar_id)
                    .conference_data_version(1)
                    .doit(),
            )
            .await?;

            let link = meeting_link(&created_event);
            info!(
                "Created event {:?} at {} (link: {})",
                created_event.id,
                request.start,
                link.as_deref().unwrap_or("none")
            );
            Ok(BookedMeeting {
                event_id: created_event.id,
                meeting_link: link,
            })
        })
    }
}
