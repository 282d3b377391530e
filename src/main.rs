use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

mod bot;
mod config;
mod index;
mod llm;
mod sql;
mod util;
mod web;

use crate::bot::answer_question;
use crate::bot::context::BotContext;
use crate::config::{AppConfig, CliArgs, Command};
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if config.auth.service_token.is_none() {
        warn!("Service token not set, API authentication is disabled");
    }

    info!(
        "Initializing bot with {} backend ({})",
        config.llm.backend, config.llm.model
    );
    let bot = match BotContext::from_config(&config) {
        Ok(bot) => bot,
        Err(e) => {
            error!("Failed to initialize: {}", e);
            return Err(e.into());
        }
    };

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting SQL bot server on {}:{}", config.web.host, config.web.port);
            let web_config = config.web.clone();
            let app_state = Arc::new(AppState::new(config, bot));
            match web::run_server(web_config, app_state).await {
                Ok(()) => info!("Server stopped gracefully"),
                Err(e) => {
                    error!("Server error: {}", e);
                    return Err(e.into());
                }
            }
        }
        Command::Ask { question } => {
            let outcome = answer_question(&bot, &question).await?;
            println!("{}", serde_json::to_string_pretty(&outcome.response)?);
            if let bot::QueryStatus::Failed { stage, reason } = outcome.status {
                return Err(format!("{} failed: {}", stage, reason).into());
            }
        }
    }

    Ok(())
}
