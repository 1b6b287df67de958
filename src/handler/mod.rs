mod callback;
mod command;
mod keyboard;
mod message;

pub use keyboard::*;

use callback::get_callback_handler;
use command::get_command_handler;
use message::{get_message_handler, handle_message_unknown};
use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    dptree,
    prelude::*,
    types::{ChatId, Update},
};

use crate::{
    error::HandlerResult,
    service::{FlowError, Reply},
    utils::{split_message, MAX_MESSAGE_LEN},
};

pub fn get_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(get_command_handler())
        .branch(get_message_handler())
        .branch(get_callback_handler())
        .branch(Update::filter_message().endpoint(handle_message_unknown))
}

pub(crate) async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> HandlerResult<()> {
    let request = bot.send_message(chat_id, reply.text);
    match reply.menu {
        Some(menu) => request.reply_markup(menu_keyboard(&menu)).await?,
        None => request.await?,
    };
    Ok(())
}

pub(crate) async fn send_long_text(bot: &Bot, chat_id: ChatId, text: &str) -> HandlerResult<()> {
    for chunk in split_message(text, MAX_MESSAGE_LEN) {
        bot.send_message(chat_id, chunk).await?;
    }
    Ok(())
}

/// Tells the user what went wrong. Only storage failures are treated as internal errors.
pub(crate) async fn report_flow_error(bot: &Bot, chat_id: ChatId, error: &FlowError) -> HandlerResult<()> {
    match error {
        FlowError::Storage(e) => error!("Storage failure while serving chat {}: {}", chat_id, e),
        other => debug!("Flow error in chat {}: {}", chat_id, other),
    }

    bot.send_message(chat_id, error.user_message()).await?;
    Ok(())
}
