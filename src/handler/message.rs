use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    prelude::*,
    types::{Message, Update},
};

use crate::{error::HandlerResult, state::AppState};

use super::{report_flow_error, send_reply};

/// Any text that is not a known command is treated as a link submission.
async fn handle_text(bot: Bot, msg: Message, state: AppState) -> HandlerResult<()> {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };

    if text.starts_with('/') {
        bot.send_message(msg.chat.id, t!("commands.unknown_command")).await?;
        return Ok(());
    }

    match state.orchestrator.submit_link(user.id, text).await {
        Ok(reply) => send_reply(&bot, msg.chat.id, reply).await?,
        Err(e) => report_flow_error(&bot, msg.chat.id, &e).await?,
    }

    Ok(())
}

pub fn get_message_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(handle_text)
}

pub async fn handle_message_unknown(bot: Bot, msg: Message) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("messages.unknown_message")).await?;
    Ok(())
}
