//! Cultbot binary.
//!
//! Start the bot with:
//! ```bash
//! BOT_TOKEN=xxx cargo run -p cultbot-discord
//! ```

use clap::Parser;
use cultbot_core::{config, BotConfig};
use cultbot_discord::{CultBot, PresenceConfig};
use tracing_subscriber::EnvFilter;

/// Cultbot - Discord bot with AI summaries, chat and images
#[derive(Parser, Debug)]
#[command(name = "cultbot")]
#[command(about = "Discord bot that summarizes channels and talks to AI models")]
struct Args {
    /// Discord bot token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    token: String,

    /// Don't upload slash command schemas on connect
    #[arg(long)]
    skip_register: bool,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from config directory first
    let env_path = config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    // Then local .env.local or .env
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    let args = Args::parse();

    let filter = match args.verbose {
        0 => "cultbot=info,cultbot_discord=info,cultbot_core=info,cultbot_commands=info,serenity=warn",
        1 => "cultbot=debug,cultbot_discord=debug,cultbot_core=debug,cultbot_commands=debug,serenity=info",
        2 => "cultbot=trace,cultbot_discord=trace,cultbot_core=trace,cultbot_commands=trace,serenity=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bot_config = BotConfig::from_env()?;
    let presence = PresenceConfig::from_env();

    let bot = CultBot::new(args.token, bot_config)?
        .with_presence(presence)
        .with_command_registration(!args.skip_register);

    tracing::info!("Cultbot starting");
    bot.run().await?;

    Ok(())
}
