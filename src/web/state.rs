use crate::bot::context::BotContext;
use crate::config::AppConfig;

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub bot: BotContext,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, bot: BotContext) -> Self {
        Self {
            config,
            bot,
            startup_time: chrono::Utc::now(),
        }
    }
}
