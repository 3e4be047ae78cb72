// Text commands - messages whose first word names a configured command

use poise::serenity_prelude as serenity;
use std::time::Duration;
use tracing::{debug, error};

use crate::commands::{fun, help, info, ping};
use crate::features::command_gate::{authorize, resolve, role_ids};
use crate::models::command::{AccessDenied, CommandKind};
use crate::utils::config::COMMAND_FAILED;
use crate::{Data, Error};

/// Split a message into the invoked word and the remaining arguments
pub fn split_invocation(content: &str) -> Option<(&str, &str)> {
    let content = content.trim_start();
    if content.is_empty() {
        return None;
    }
    match content.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((content, "")),
    }
}

/// Handle one guild message. Messages that name no command are ignored.
pub async fn handle_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if msg.author.bot {
        return Ok(());
    }
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    let Some((invoked, args)) = split_invocation(&msg.content) else {
        return Ok(());
    };

    let commands = data.store.commands(&guild_id.to_string()).await?;
    let Some(kind) = resolve(&commands, invoked).map(|c| c.id) else {
        return Ok(());
    };

    let roles = msg
        .member
        .as_ref()
        .map(|m| role_ids(&m.roles))
        .unwrap_or_default();

    match authorize(&commands, kind, &msg.channel_id.to_string(), &roles) {
        Ok(_) => {}
        // Disabled commands behave as if they did not exist
        Err(AccessDenied::Disabled) => return Ok(()),
        Err(denied) => {
            debug!("Refused {} for {} in {}: {:?}", kind.name(), msg.author.name, guild_id, denied);
            msg.reply(&ctx.http, denied.to_string()).await?;
            return Ok(());
        }
    }

    let result = match kind {
        CommandKind::Help => help::help_message(ctx, msg, &commands).await,
        CommandKind::ServerInfo => info::server_info_message(ctx, msg).await,
        CommandKind::UserInfo | CommandKind::User => info::user_info_message(ctx, msg).await,
        CommandKind::Avatar => info::avatar_message(ctx, msg).await,
        CommandKind::Ping => {
            let gateway = gateway_latency(ctx, framework).await;
            ping::ping_message(ctx, msg, gateway).await
        }
        CommandKind::Roles => info::roles_message(ctx, msg).await,
        CommandKind::Roll => fun::roll_message(ctx, msg).await,
        CommandKind::Poll => fun::poll_message(ctx, msg, args).await,
    };

    if let Err(e) = result {
        error!("Error executing command {}: {:?}", kind.name(), e);
        msg.reply(&ctx.http, COMMAND_FAILED).await?;
    }
    Ok(())
}

async fn gateway_latency(
    ctx: &serenity::Context,
    framework: poise::FrameworkContext<'_, Data, Error>,
) -> Option<Duration> {
    let shard_manager = framework.shard_manager();
    let runners = shard_manager.runners.lock().await;
    runners.get(&ctx.shard_id).and_then(|runner| runner.latency)
}
