use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        MessageFilterExt, UpdateFilterExt, UpdateHandler,
    },
    dptree,
    prelude::Requester,
    types::{ChatId, Message, Update},
    Bot,
};
use tracing::instrument;

use crate::{
    commands::{cancel, help, start, stats, Command},
    database::connection::Connection,
    state::TrainingState,
    trainer, HandlerResult,
};

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Start].endpoint(start))
        .branch(case![Command::Stats].endpoint(stats::<Connection>))
        .branch(case![Command::Cancel].endpoint(cancel));

    let handler = Update::filter_message()
        .branch(dptree::filter(|msg: Message| !is_private(msg.chat.id)).endpoint(private_only))
        .branch(command_handler)
        .branch(Message::filter_text().endpoint(trainer::receive_text::<Connection>))
        .endpoint(invalid_input);

    dialogue::enter::<Update, InMemStorage<TrainingState>, TrainingState, _>().branch(handler)
}

/// Dialogue state lives per chat, and only a one-to-one chat maps to a single account.
fn is_private(chat_id: ChatId) -> bool {
    chat_id.is_user()
}

#[instrument(level = "info", skip_all, fields(chat_id = %msg.chat.id))]
async fn private_only(bot: Bot, msg: Message) -> HandlerResult {
    tracing::info!("Message from a shared chat ignored");
    bot.send_message(
        msg.chat.id,
        "Тренироваться можно только в личном чате с ботом.",
    )
    .await?;
    Ok(())
}

#[instrument(level = "info", skip_all, fields(chat_id = %msg.chat.id))]
async fn invalid_input(bot: Bot, msg: Message) -> HandlerResult {
    tracing::info!("Non-text message ignored");
    bot.send_message(
        msg.chat.id,
        "Я понимаю только текстовые сообщения. Введите /help, чтобы увидеть команды.",
    )
    .await?;
    Ok(())
}
