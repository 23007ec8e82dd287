use std::sync::Arc;

use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatId, Message, User},
    Bot, RequestError,
};
use tracing::instrument;

use crate::{
    conversation::{self, Reply},
    database::connection::Store,
    keyboard,
    services::Profile,
    HandlerResult, UserDialogue,
};

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            account_id: user.id.0 as i64,
            username: user.username.clone(),
            first_name: Some(user.first_name.clone()).filter(|name| !name.is_empty()),
        }
    }
}

/// Private chats share their id with the account, so the chat stands in
/// when the message carries no sender.
pub(crate) fn profile_of(msg: &Message) -> Profile {
    match msg.from.as_ref() {
        Some(user) => Profile::from(user),
        None => Profile {
            account_id: msg.chat.id.0,
            username: msg.chat.username().map(str::to_owned),
            first_name: msg.chat.first_name().map(str::to_owned),
        },
    }
}

pub(crate) async fn deliver(
    bot: &Bot,
    chat_id: ChatId,
    replies: Vec<Reply>,
) -> Result<(), RequestError> {
    for reply in replies {
        let request = bot.send_message(chat_id, reply.text);
        match keyboard::reply_markup(&reply.markup) {
            Some(markup) => request.reply_markup(markup).await?,
            None => request.await?,
        };
    }
    Ok(())
}

#[instrument(level = "info", skip_all, fields(chat_id = %msg.chat.id))]
pub(crate) async fn receive_text<S: Store>(
    bot: Bot,
    dialogue: UserDialogue,
    msg: Message,
    text: String,
    connection: Arc<S>,
) -> HandlerResult {
    let profile = profile_of(&msg);
    let state = dialogue.get_or_default().await?;

    let step = conversation::route(connection.as_ref(), &profile, state, &text).await;
    tracing::debug!(next = ?step.next, "Dialogue moves on");

    dialogue.update(step.next).await?;
    deliver(&bot, msg.chat.id, step.replies).await?;
    Ok(())
}
