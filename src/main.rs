// Furat Bot - Rust Edition
// Arabic community bot: configurable commands and rendered welcome images

mod api;
mod commands;
mod features;
mod models;
mod utils;

use std::env;
use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::server_store::ServerStore;
use crate::features::welcome_image::WelcomeRenderer;
use crate::utils::config::{colors, BotSettings, COMMAND_FAILED};
use crate::utils::fonts::FontRegistry;

/// User data shared across all commands
pub struct Data {
    pub store: Arc<ServerStore>,
    pub renderer: WelcomeRenderer,
}

// Manual Debug impl, the renderer holds font data
impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("store", &self.store.root())
            .field("renderer", &"WelcomeRenderer")
            .finish()
    }
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Register all slash commands
fn get_commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        commands::help::help(),
        commands::info::serverinfo(),
        commands::info::userinfo(),
        commands::info::user(),
        commands::info::avatar(),
        commands::ping::ping(),
        commands::info::roles(),
        commands::fun::roll(),
        commands::fun::poll(),
        commands::welcome::welcome(),
    ]
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("Logged in as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            features::welcome::handle_member_join(ctx, new_member, data).await;
        }
        serenity::FullEvent::Message { new_message } => {
            features::text_commands::handle_message(ctx, new_message, framework, data).await?;
        }
        _ => {}
    }
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error executing command {}: {:?}", ctx.command().qualified_name, error);
            let embed = serenity::CreateEmbed::new()
                .description(COMMAND_FAILED)
                .color(colors::ERROR);
            let _ = ctx
                .send(poise::CreateReply::default().embed(embed).ephemeral(true))
                .await;
        }
        // The gate already replied with the reason
        poise::FrameworkError::CommandCheckFailed { error: None, .. } => {}
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!("Event handler error on {}: {:?}", event.snake_case_name(), error);
        }
        err => {
            if let Err(e) = poise::builtins::on_error(err).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "furat_rs=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let settings = BotSettings::from_env()?;

    info!("Starting Furat Bot (Rust Edition)...");

    // Build HTTP client for avatar and background downloads
    let http_client = reqwest::Client::builder()
        .user_agent("Furat-Bot/1.0")
        .build()?;

    let fonts = match FontRegistry::load_dir(&settings.font_dir, &settings.default_font) {
        Ok(fonts) => fonts,
        Err(e) => {
            warn!(
                "Failed to load fonts from {}: {}. Using the bundled font.",
                settings.font_dir.display(),
                e
            );
            FontRegistry::new(&settings.default_font)
        }
    };
    if fonts.is_empty() {
        warn!("No fonts found in {}, using the bundled font", settings.font_dir.display());
    } else {
        info!("Font registry ready: {:?}", fonts);
    }

    let store = Arc::new(ServerStore::new(settings.data_path.clone()));
    match store.list_servers().await {
        Ok(servers) => info!("Server store at {} holds {} servers", settings.data_path.display(), servers.len()),
        Err(e) => warn!("Could not list servers in {}: {}", settings.data_path.display(), e),
    }

    let renderer = WelcomeRenderer::new(http_client, Arc::new(fonts), settings.fetch_timeout);

    // Setup framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: get_commands(),
            command_check: Some(|ctx| Box::pin(features::command_gate::slash_check(ctx))),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready! Registering commands...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully!");

                Ok(Data {
                    store,
                    renderer,
                })
            })
        })
        .build();

    // GUILD_MEMBERS and MESSAGE_CONTENT are privileged, enable them in the Developer Portal
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&settings.token, intents)
        .framework(framework)
        .await?;

    // Run with graceful shutdown
    let shard_manager = client.shard_manager.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutting down...");
                shard_manager.shutdown_all().await;
            }
            Err(e) => error!("Failed to register Ctrl+C handler: {}", e),
        }
    });

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    info!("Goodbye!");
    Ok(())
}
