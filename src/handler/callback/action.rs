use teloxide::{prelude::*, types::UserId};

use crate::{
    error::HandlerResult,
    handler::{report_flow_error, send_reply},
    service::Action,
    state::AppState,
};

use super::Origin;

pub(super) async fn handle_callback_action(
    bot: &Bot,
    state: &AppState,
    user_id: UserId,
    origin: &Origin,
    action: Action,
) -> HandlerResult<()> {
    info!("User {} chose {:?}", user_id, action);

    match state.orchestrator.choose_action(user_id, action).await {
        Ok(reply) => send_reply(bot, origin.chat_id, reply).await,
        Err(e) => report_flow_error(bot, origin.chat_id, &e).await,
    }
}
