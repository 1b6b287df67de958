mod action;
mod language;
mod tier;

use std::str::FromStr;

use teloxide::{
    dispatching::UpdateHandler,
    prelude::*,
    types::{CallbackQuery, ChatId, MessageId},
};

use crate::{
    error::HandlerResult,
    service::{
        orchestrator::{ACTION_TOKEN_PREFIX, LANGUAGE_TOKEN_PREFIX, TIER_TOKEN_PREFIX},
        Action,
    },
    state::AppState,
};

/// Decoded callback token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CallbackData {
    Action(Action),
    Language(String),
    Tier(String),
}

impl CallbackData {
    /// Language and tier values are passed through so the core can reject them with the right message.
    pub(crate) fn parse(data: &str) -> Option<Self> {
        if let Some(action) = data.strip_prefix(ACTION_TOKEN_PREFIX) {
            return Action::from_str(action).ok().map(CallbackData::Action);
        }
        if let Some(code) = data.strip_prefix(LANGUAGE_TOKEN_PREFIX) {
            return Some(CallbackData::Language(code.to_string()));
        }
        if let Some(tier) = data.strip_prefix(TIER_TOKEN_PREFIX) {
            return Some(CallbackData::Tier(tier.to_string()));
        }
        None
    }
}

/// Where the callback came from: the chat to answer in and the menu message, if still reachable.
pub(crate) struct Origin {
    pub chat_id: ChatId,
    pub menu_message: Option<MessageId>,
}

impl Origin {
    fn from_query(q: &CallbackQuery) -> Self {
        match &q.message {
            Some(message) => Self {
                chat_id: message.chat().id,
                menu_message: Some(message.id()),
            },
            None => Self {
                chat_id: ChatId::from(q.from.id),
                menu_message: None,
            },
        }
    }
}

async fn handle_callback(bot: Bot, q: CallbackQuery, state: AppState) -> HandlerResult<()> {
    bot.answer_callback_query(&q.id).cache_time(1).await?;

    let origin = Origin::from_query(&q);
    let user_id = q.from.id;
    let data = q.data.as_deref().unwrap_or_default();

    match CallbackData::parse(data) {
        Some(CallbackData::Action(action)) => {
            action::handle_callback_action(&bot, &state, user_id, &origin, action).await?
        }
        Some(CallbackData::Language(code)) => {
            language::handle_callback_language(&bot, &state, user_id, &origin, &code).await?
        }
        Some(CallbackData::Tier(tier)) => {
            tier::handle_callback_tier(&bot, &state, user_id, &origin, &tier).await?
        }
        None => {
            warn!("Unknown callback data from {}: {:?}", user_id, data);
            bot.send_message(origin.chat_id, t!("callbacks.unknown_option")).await?;
        }
    }

    Ok(())
}

pub fn get_callback_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_callback_query().endpoint(handle_callback)
}
