use teloxide::dispatching::{HandlerExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use crate::command::Command;
use crate::error::HandlerResult;
use crate::service::{Menu, Reply};
use crate::state::AppState;
use crate::utils::profile_from_user;

use super::{report_flow_error, send_reply};

async fn handle_start(bot: Bot, msg: Message, state: AppState) -> HandlerResult<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    if let Err(e) = state.orchestrator.register_user(&profile_from_user(user)).await {
        // Greeting still goes out; the profile is written again on the next /start.
        error!("Failed to register user {}: {}", user.id, e);
    }

    info!("User {} started the bot", user.id);

    bot.send_message(msg.chat.id, t!("commands.start", first_name = user.first_name.as_str()))
        .await?;

    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("commands.help")).await?;
    Ok(())
}

async fn handle_subscription(bot: Bot, msg: Message) -> HandlerResult<()> {
    send_reply(&bot, msg.chat.id, Reply::with_menu(t!("commands.subscription"), Menu::tiers())).await
}

async fn handle_usage(bot: Bot, msg: Message, state: AppState) -> HandlerResult<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    match state.orchestrator.usage(user.id).await {
        Ok(usage) => {
            let text = t!(
                "commands.usage",
                tier = usage.tier.display_name(),
                used = usage.used_today,
                limit = usage.daily_limit,
                remaining = usage.remaining
            );
            bot.send_message(msg.chat.id, text).await?;
        }
        Err(e) => report_flow_error(&bot, msg.chat.id, &e).await?,
    }

    Ok(())
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command, state: AppState) -> HandlerResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await?,
        Command::Help => handle_help(bot, msg).await?,
        Command::Subscription => handle_subscription(bot, msg).await?,
        Command::Usage => handle_usage(bot, msg, state).await?,
    }

    Ok(())
}

pub fn get_command_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command)
}
