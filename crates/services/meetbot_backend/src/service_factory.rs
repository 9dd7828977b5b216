// --- File: crates/services/meetbot_backend/src/service_factory.rs ---
//! Builds the collaborators from configuration and hands them to the
//! message loop.

use meetbot_booking::{BookingSession, HandlerSettings, MessageHandler};
use meetbot_common::{config_error, CalendarService, MeetbotError};
use meetbot_config::AppConfig;
use meetbot_gcal::auth::{create_calendar_hub, parse_credential, FileTokenStore, TokenStore};
use meetbot_gcal::{GoogleCalendarService, SchedulingParams, SlotFinder};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub fn token_store(config: &AppConfig) -> FileTokenStore {
    FileTokenStore::new(&config.gcal.credentials_path)
}

/// Validates the credential JSON at `source` and stores it in `store`.
pub fn import_credentials(store: &dyn TokenStore, source: &Path) -> Result<(), MeetbotError> {
    let blob = fs::read(source)
        .map_err(|e| config_error(format!("cannot read {}: {}", source.display(), e)))?;
    parse_credential(&blob)?;
    store.save(&blob)?;
    info!("Imported Google credentials from {}", source.display());
    Ok(())
}

pub async fn build_calendar(config: &AppConfig) -> Result<Arc<dyn CalendarService>, MeetbotError> {
    let hub = create_calendar_hub(&token_store(config)).await?;
    let service = GoogleCalendarService::new(
        Arc::new(hub),
        config.gcal.calendar_id.clone(),
        Duration::from_secs(config.gcal.request_timeout_secs),
    );
    info!("Google Calendar service initialized for calendar {}", config.gcal.calendar_id);
    Ok(Arc::new(service))
}

pub fn build_handler(
    config: &AppConfig,
    calendar: Arc<dyn CalendarService>,
    session: Arc<BookingSession>,
) -> Result<Arc<MessageHandler>, MeetbotError> {
    let params = SchedulingParams::from_config(&config.scheduling)?;
    let finder = SlotFinder::new(params);
    let settings = HandlerSettings::from_config(config);
    Ok(Arc::new(MessageHandler::new(settings, finder, calendar, session)))
}

/// Periodically drops expired offers. `None` when pruning is disabled.
pub fn spawn_prune_task(
    session: Arc<BookingSession>,
    interval_secs: u64,
) -> Option<JoinHandle<()>> {
    if interval_secs == 0 || session.ttl().is_none() {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            let removed = session.prune_expired();
            debug!("Prune pass removed {} offers", removed);
        }
    }))
}
