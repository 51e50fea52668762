use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};

use herald::commands::RegistrationMode;
use herald::core::Config;
use herald::session::BotSession;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Herald Discord Bot...");
    if let Some(guild_id) = config.dev_guild_id {
        info!("🔧 Development mode: all commands go to guild {guild_id}");
    } else {
        info!("🌍 Production mode: global and per-guild registration");
    }

    let session = BotSession::connect(config).await?;

    let report = session.registration();
    if report.mode == RegistrationMode::Production {
        for failure in report.failures() {
            error!(
                "❌ /{} unavailable in guild {} - continuing without it",
                failure.command, failure.guild_id
            );
        }
    }
    info!(
        "✅ {} commands and {} event listeners ready",
        session.commands().len(),
        session.events().len()
    );

    session.run().await
}
