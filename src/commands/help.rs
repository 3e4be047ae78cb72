// Help command - lists the commands enabled on this server

use poise::serenity_prelude as serenity;

use crate::models::command::CommandConfig;
use crate::utils::config::colors;
use crate::{Context, Error};

pub fn help_text(commands: &[CommandConfig]) -> String {
    let lines: Vec<String> = commands
        .iter()
        .filter(|c| c.enabled)
        .map(|c| {
            let mut line = format!("**{}**: {}", c.name, c.description);
            if !c.alternative_names.is_empty() {
                line.push_str(&format!(" ({})", c.alternative_names.join("، ")));
            }
            line
        })
        .collect();

    if lines.is_empty() {
        "لا توجد أوامر مفعلة في هذا السيرفر.".to_string()
    } else {
        lines.join("\n")
    }
}

pub fn help_embed(commands: &[CommandConfig]) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("قائمة الأوامر المتاحة")
        .description(help_text(commands))
        .color(colors::PRIMARY)
        .footer(serenity::CreateEmbedFooter::new(
            "اكتب اسم الأمر مباشرة أو استخدم /",
        ))
}

/// Show the available commands
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let commands = match ctx.guild_id() {
        Some(guild_id) => ctx.data().store.commands(&guild_id.to_string()).await?,
        None => crate::models::command::DEFAULT_COMMANDS.clone(),
    };

    ctx.send(poise::CreateReply::default().embed(help_embed(&commands)))
        .await?;
    Ok(())
}

pub async fn help_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    commands: &[CommandConfig],
) -> Result<(), Error> {
    msg.channel_id
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(help_embed(commands)))
        .await?;
    Ok(())
}
