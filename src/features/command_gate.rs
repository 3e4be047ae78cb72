// Command gate - applies each server's command configuration to invocations

use poise::serenity_prelude as serenity;
use tracing::debug;

use crate::models::command::{AccessDenied, CommandConfig, CommandKind};
use crate::{Context, Error};

/// Find the command invoked by name or alternative name
pub fn resolve<'a>(commands: &'a [CommandConfig], invoked: &str) -> Option<&'a CommandConfig> {
    commands.iter().find(|c| c.matches(invoked))
}

/// Check a known command against the server's rules.
/// A command missing from the server's list counts as disabled.
pub fn authorize<'a>(
    commands: &'a [CommandConfig],
    kind: CommandKind,
    channel_id: &str,
    member_roles: &[String],
) -> Result<&'a CommandConfig, AccessDenied> {
    let command = commands
        .iter()
        .find(|c| c.id == kind)
        .ok_or(AccessDenied::Disabled)?;
    command.check_access(channel_id, member_roles)?;
    Ok(command)
}

pub fn role_ids(roles: &[serenity::RoleId]) -> Vec<String> {
    roles.iter().map(|r| r.to_string()).collect()
}

/// Framework-wide check for slash commands.
/// Commands that are not server-configurable (e.g. /welcome) always pass.
pub async fn slash_check(ctx: Context<'_>) -> Result<bool, Error> {
    let Some(kind) = CommandKind::from_name(&ctx.command().qualified_name) else {
        return Ok(true);
    };

    let Some(guild_id) = ctx.guild_id() else {
        ctx.send(
            poise::CreateReply::default()
                .content("This command can only be used in a server.")
                .ephemeral(true),
        )
        .await?;
        return Ok(false);
    };

    let commands = ctx.data().store.commands(&guild_id.to_string()).await?;
    let roles = match ctx.author_member().await {
        Some(member) => role_ids(&member.roles),
        None => Vec::new(),
    };

    match authorize(&commands, kind, &ctx.channel_id().to_string(), &roles) {
        Ok(_) => Ok(true),
        Err(denied) => {
            debug!("Refused /{} for {} in {}: {:?}", kind.name(), ctx.author().name, guild_id, denied);
            ctx.send(poise::CreateReply::default().content(denied.to_string()).ephemeral(true))
                .await?;
            Ok(false)
        }
    }
}
