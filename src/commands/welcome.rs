// Welcome administration - delivery channel, on/off switch and image preview

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::api::discord_cdn::avatar_png_url;
use crate::models::welcome::{ImageSource, WelcomeLayout};
use crate::utils::config::{colors, WELCOME_IMAGE_NAME};
use crate::{Context, Error};

const GUILD_ONLY: &str = "هذا الأمر يمكن استخدامه فقط في السيرفر.";
const SAVE_FAILED: &str = "تعذر حفظ الإعدادات. الرجاء المحاولة لاحقًا.";

/// Manage welcome messages
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    subcommands("channel", "toggle", "preview")
)]
pub async fn welcome(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Set the channel that receives welcome messages
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn channel(
    ctx: Context<'_>,
    #[description = "قناة الترحيب"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    let channel_id = channel.id.to_string();
    let saved = ctx
        .data()
        .store
        .modify(&guild_id.to_string(), |config| {
            config.welcome_settings.welcome_channel = channel_id.clone();
            config.welcome_settings.is_welcome_enabled = true;
            Ok(())
        })
        .await;

    match saved {
        Ok(()) => {
            info!("Welcome channel for {} set to {}", guild_id, channel.id);
            let embed = serenity::CreateEmbed::new()
                .title("✅ تم تحديث إعدادات الترحيب")
                .description(format!("سيتم إرسال رسائل الترحيب في <#{}>", channel.id))
                .color(colors::SUCCESS);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            error!("Failed to save welcome channel for {}: {}", guild_id, e);
            ctx.send(poise::CreateReply::default().content(SAVE_FAILED).ephemeral(true))
                .await?;
        }
    }
    Ok(())
}

/// Turn welcome messages on or off
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn toggle(
    ctx: Context<'_>,
    #[description = "تفعيل رسائل الترحيب"] enabled: bool,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    let channel = ctx
        .data()
        .store
        .modify(&guild_id.to_string(), |config| {
            config.welcome_settings.is_welcome_enabled = enabled;
            Ok(config.welcome_settings.welcome_channel.clone())
        })
        .await;

    let channel = match channel {
        Ok(channel) => channel,
        Err(e) => {
            error!("Failed to toggle welcome messages for {}: {}", guild_id, e);
            ctx.send(poise::CreateReply::default().content(SAVE_FAILED).ephemeral(true))
                .await?;
            return Ok(());
        }
    };

    let mut description = if enabled {
        "تم تفعيل رسائل الترحيب.".to_string()
    } else {
        "تم إيقاف رسائل الترحيب.".to_string()
    };
    if enabled && channel.is_empty() {
        description.push_str("\nلم يتم تحديد قناة بعد، استخدم `/welcome channel`.");
    }

    let embed = serenity::CreateEmbed::new()
        .title("⚙️ إعدادات الترحيب")
        .description(description)
        .color(if enabled { colors::SUCCESS } else { colors::WARNING });
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Render the welcome image for yourself
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn preview(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(GUILD_ONLY).await?;
        return Ok(());
    };

    ctx.defer().await?;

    let settings = ctx.data().store.welcome_settings(&guild_id.to_string()).await?;
    let layout = WelcomeLayout::from(&settings);
    if layout.base_image.is_none() {
        ctx.say("لم يتم رفع صورة ترحيب لهذا السيرفر بعد.").await?;
        return Ok(());
    }

    let display_name = match ctx.author_member().await {
        Some(member) => member.display_name().to_string(),
        None => ctx.author().display_name().to_string(),
    };
    let avatar = ImageSource::Url(avatar_png_url(ctx.author()));

    match ctx.data().renderer.render(layout, &display_name, avatar).await {
        Ok(bytes) => {
            ctx.send(
                poise::CreateReply::default()
                    .content("معاينة صورة الترحيب:")
                    .attachment(serenity::CreateAttachment::bytes(bytes, WELCOME_IMAGE_NAME)),
            )
            .await?;
        }
        Err(e) => {
            error!("Welcome preview failed for {}: {}", guild_id, e);
            ctx.say(format!("تعذر إنشاء صورة الترحيب: {}", e)).await?;
        }
    }
    Ok(())
}
