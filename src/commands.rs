use std::sync::Arc;

use teloxide::{
    payloads::SendMessageSetters, prelude::Requester, types::Message, utils::command::BotCommands,
    Bot,
};
use tracing::instrument;

use crate::{
    conversation,
    database::connection::RetrieveLeaderboard,
    keyboard::start_keyboard,
    services::{self, format_leaderboard},
    state::TrainingState,
    trainer::{deliver, profile_of},
    HandlerResult, UserDialogue,
};

#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "показать список команд.")]
    Help,
    #[command(description = "начать работу с ботом.")]
    Start,
    #[command(description = "таблица лидеров.")]
    Stats,
    #[command(description = "прервать текущее действие.")]
    Cancel,
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Greets without touching the dialogue, so an unfinished card survives `/start`.
#[instrument(level = "info", skip_all, fields(chat_id = %msg.chat.id))]
pub(crate) async fn start(bot: Bot, msg: Message) -> HandlerResult {
    let reply = conversation::welcome(&profile_of(&msg));
    deliver(&bot, msg.chat.id, vec![reply]).await?;
    Ok(())
}

#[instrument(level = "info", skip_all, fields(chat_id = %msg.chat.id))]
pub(crate) async fn stats<S: RetrieveLeaderboard>(
    bot: Bot,
    msg: Message,
    connection: Arc<S>,
) -> HandlerResult {
    let text = match services::leaderboard(connection.as_ref()).await {
        Some(rows) => format_leaderboard(&rows),
        None => "Не удалось загрузить статистику. Попробуйте позже.".to_owned(),
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

pub(crate) async fn cancel(bot: Bot, dialogue: UserDialogue, msg: Message) -> HandlerResult {
    dialogue.update(TrainingState::Idle).await?;
    bot.send_message(msg.chat.id, "Действие отменено.")
        .reply_markup(start_keyboard())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_in_lowercase() {
        assert!(matches!(Command::parse("/stats", "bot"), Ok(Command::Stats)));
        assert!(matches!(Command::parse("/cancel", "bot"), Ok(Command::Cancel)));
        assert!(Command::parse("/train", "bot").is_err());
    }

    #[test]
    fn help_lists_every_command() {
        let help = Command::descriptions().to_string();
        for command in ["/help", "/start", "/stats", "/cancel"] {
            assert!(help.contains(command), "{command} missing from help");
        }
    }
}
