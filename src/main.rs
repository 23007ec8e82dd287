use std::borrow::Cow;
use std::error::Error;
use std::sync::Arc;

use dotenvy::dotenv;
use rustwordbot::config::Config;
use rustwordbot::database::connection::Connection;
use rustwordbot::schema::schema;
use rustwordbot::state::TrainingState;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

type MainResult = Result<(), Box<dyn Error + Send + Sync + 'static>>;

#[tokio::main]
async fn main() -> MainResult {
    dotenv().ok();
    let config = Config::from_env()?;
    init_tracing(&config.log_level)?;

    let connection = Arc::new(Connection::connect(Cow::Borrowed(config.database_url.as_str())).await?);
    connection.perform_migrations().await?;

    let bot = Bot::new(&config.bot_token);
    tracing::info!("Starting bot...");

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![InMemStorage::<TrainingState>::new(), connection])
        .enable_ctrlc_handler()
        .build();

    match config.webhook {
        Some(webhook) => {
            tracing::info!(url = %webhook.url, address = %webhook.address, "Receiving updates via webhook");
            let listener = webhooks::axum(bot, Options::new(webhook.address, webhook.url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        }
        None => dispatcher.dispatch().await,
    }

    Ok(())
}

/// JSON logs filtered by `LOG_LEVEL`; records from the `log` facade are routed here too.
fn init_tracing(log_level: &str) -> MainResult {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}
