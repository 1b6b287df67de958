use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::Bot;

use crate::config::AppConfig;
use crate::error::{BotError, BotResult, HandlerResult};
use crate::handler::get_handler;
use crate::state::AppState;
use crate::utils::http;

pub struct BotService {
    pub bot: Bot,
    pub state: AppState,
}

impl BotService {
    pub async fn new(config: &AppConfig) -> BotResult<Self> {
        info!("Initializing AppState...");
        let state = AppState::new(config).await?;

        let client = http::create_telegram_client()?;
        let bot = Bot::with_client(config.telegram.0.clone(), client);

        Ok(Self { bot, state })
    }

    pub async fn start(&self) -> HandlerResult<()> {
        info!("Testing connection to Telegram API...");
        match self.bot.get_me().await {
            Ok(me) => info!("Connected to Telegram API as @{}", me.username()),
            Err(e) => {
                error!("Failed to connect to Telegram API: {:?}", e);
                return Err(BotError::Other(anyhow::anyhow!("Failed to connect to Telegram API: {}", e)).into());
            }
        }

        crate::command::setup_user_commands(&self.bot).await?;

        Dispatcher::builder(self.bot.clone(), get_handler())
            .dependencies(dptree::deps![self.state.clone()])
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Dispatcher stopped, shutting down");
        Ok(())
    }
}
