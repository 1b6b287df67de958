use teloxide::{prelude::*, types::UserId};

use crate::{error::HandlerResult, handler::report_flow_error, state::AppState};

use super::Origin;

pub(super) async fn handle_callback_tier(
    bot: &Bot,
    state: &AppState,
    user_id: UserId,
    origin: &Origin,
    tier: &str,
) -> HandlerResult<()> {
    match state.orchestrator.change_tier(user_id, tier).await {
        Ok(tier) => {
            bot.send_message(
                origin.chat_id,
                t!(
                    "callbacks.tier_changed",
                    tier = tier.display_name(),
                    limit = tier.daily_limit()
                ),
            )
            .await?;
            Ok(())
        }
        Err(e) => report_flow_error(bot, origin.chat_id, &e).await,
    }
}
