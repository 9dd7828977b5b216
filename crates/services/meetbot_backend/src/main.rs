// File: services/meetbot_backend/src/main.rs
use meetbot_backend::cli::Command;
use meetbot_backend::service_factory::{
    build_calendar, build_handler, import_credentials, spawn_prune_task, token_store,
};
use meetbot_booking::{run_message_loop, BookingSession};
use meetbot_common::logging::{self, log_error};
use meetbot_common::{config_error, internal_error, MeetbotError};
use meetbot_config::{load_config, AppConfig, TransportMode};
use meetbot_telegram::routes::routes;
use meetbot_telegram::{BotApi, TelegramChannel};
use std::future::IntoFuture;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = match logging::init(&config.log) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match Command::parse(std::env::args().skip(1)) {
        Ok(Command::ImportCredentials(path)) => import_credentials(&token_store(&config), &path),
        Ok(Command::Run) => run(config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error(&e, "meetbot stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Arc<AppConfig>) -> Result<(), MeetbotError> {
    let calendar = build_calendar(&config).await?;
    let session = Arc::new(BookingSession::from_config(&config.bot)?);
    let handler = build_handler(&config, calendar, session.clone())?;
    let _prune_task = spawn_prune_task(session, config.bot.prune_interval_secs);

    let api = BotApi::new(&config.telegram)?;
    let me = api.get_me().await?;
    info!(
        "Connected to Telegram as @{}",
        me.username.as_deref().unwrap_or(&me.first_name)
    );

    match config.telegram.mode {
        TransportMode::Polling => {
            let channel = Arc::new(TelegramChannel::polling(
                api,
                config.telegram.poll_timeout_secs,
            ));
            info!("Polling Telegram for updates");
            tokio::select! {
                result = run_message_loop(channel, handler) => result,
                _ = shutdown_signal() => Ok(()),
            }
        }
        TransportMode::Webhook => {
            let webhook = config
                .telegram
                .webhook
                .as_ref()
                .ok_or_else(|| config_error("webhook mode without [telegram.webhook]"))?;
            let (channel, state) =
                TelegramChannel::webhook(api.clone(), webhook.secret_token.clone());
            if let Some(url) = &webhook.public_url {
                api.set_webhook(url, webhook.secret_token.as_deref()).await?;
            }

            let app = routes(state).layer(TraceLayer::new_for_http());
            let addr = format!("{}:{}", webhook.host, webhook.port);
            let listener = TcpListener::bind(&addr)
                .await
                .map_err(|e| config_error(format!("cannot bind {}: {}", addr, e)))?;
            info!("Webhook server listening on http://{}", addr);

            tokio::select! {
                result = run_message_loop(Arc::new(channel), handler) => result,
                result = axum::serve(listener, app).into_future() => {
                    result.map_err(|e| internal_error(format!("webhook server: {}", e)))
                }
                _ = shutdown_signal() => Ok(()),
            }
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            log_error(&e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
