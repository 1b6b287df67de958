use teloxide::{prelude::*, types::UserId};

use crate::{
    error::HandlerResult,
    handler::{report_flow_error, send_long_text},
    service::Task,
    state::AppState,
};

use super::Origin;

/// Runs the pipeline for the pending action. The menu message becomes a status line while it runs.
pub(super) async fn handle_callback_language(
    bot: &Bot,
    state: &AppState,
    user_id: UserId,
    origin: &Origin,
    language_code: &str,
) -> HandlerResult<()> {
    let job = match state.orchestrator.prepare_generation(user_id, language_code) {
        Ok(job) => job,
        Err(e) => return report_flow_error(bot, origin.chat_id, &e).await,
    };

    let status_key = match job.task {
        Task::Summary => "callbacks.generating.summary",
        Task::Takeaways => "callbacks.generating.takeaways",
    };
    match origin.menu_message {
        Some(message_id) => {
            if let Err(e) = bot.edit_message_text(origin.chat_id, message_id, t!(status_key)).await {
                warn!("Failed to edit menu message: {}", e);
            }
        }
        None => {
            bot.send_message(origin.chat_id, t!(status_key)).await?;
        }
    }

    match state.orchestrator.run_generation(user_id, job).await {
        Ok(generated) => {
            let header = match generated.task {
                Task::Summary => t!("callbacks.result.summary"),
                Task::Takeaways => t!("callbacks.result.takeaways"),
            };
            send_long_text(bot, origin.chat_id, &format!("{}\n\n{}", header, generated.text)).await
        }
        Err(e) => report_flow_error(bot, origin.chat_id, &e).await,
    }
}
