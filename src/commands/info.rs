// Info commands - serverinfo, userinfo/user, avatar, roles

use poise::serenity_prelude as serenity;
use serenity::Mentionable;

use crate::api::discord_cdn::avatar_full_url;
use crate::utils::config::colors;
use crate::utils::formatters::{format_utc, truncate};
use crate::{Context, Error};

const GUILD_ONLY: &str = "هذا الأمر يمكن استخدامه فقط في السيرفر.";
const NOT_AVAILABLE: &str = "غير متوفر";

pub fn server_info_embed(guild: &serenity::Guild) -> serenity::CreateEmbed {
    let count = |kind: serenity::ChannelType| guild.channels.values().filter(|c| c.kind == kind).count();
    let text_channels = count(serenity::ChannelType::Text);
    let voice_channels = count(serenity::ChannelType::Voice);
    let categories = count(serenity::ChannelType::Category);

    let mut embed = serenity::CreateEmbed::new()
        .color(colors::PRIMARY)
        .title(format!("معلومات السيرفر - {}", guild.name))
        .field("معرف السيرفر", guild.id.to_string(), true)
        .field("المالك", guild.owner_id.mention().to_string(), true)
        .field("تاريخ الإنشاء", format_utc(guild.id.created_at().unix_timestamp()), true)
        .field("عدد الأعضاء", guild.member_count.to_string(), true)
        .field("إجمالي القنوات", (text_channels + voice_channels + categories).to_string(), true)
        .field("القنوات النصية", text_channels.to_string(), true)
        .field("القنوات الصوتية", voice_channels.to_string(), true)
        .field("التصنيفات", categories.to_string(), true)
        .field("الرتب", guild.roles.len().to_string(), true);

    if let Some(icon) = guild.icon_url() {
        embed = embed.thumbnail(icon);
    }
    embed
}

pub fn user_info_embed(user: &serenity::User, member: Option<&serenity::Member>) -> serenity::CreateEmbed {
    let joined = member
        .and_then(|m| m.joined_at)
        .map(|ts| format_utc(ts.unix_timestamp()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let roles = member
        .map(|m| m.roles.iter().map(|r| r.mention().to_string()).collect::<Vec<_>>().join(", "))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "لا يوجد".to_string());

    serenity::CreateEmbed::new()
        .color(colors::PRIMARY)
        .title(format!("معلومات المستخدم - {}", user.tag()))
        .thumbnail(user.face())
        .field("معرف المستخدم", user.id.to_string(), true)
        .field("تاريخ إنشاء الحساب", format_utc(user.id.created_at().unix_timestamp()), true)
        .field("تاريخ الانضمام للسيرفر", joined, true)
        .field("الرتب", truncate(&roles, 1024), false)
}

pub fn avatar_embed(user: &serenity::User) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .color(colors::PRIMARY)
        .title(format!("الصورة الشخصية لـ {}", user.tag()))
        .image(avatar_full_url(user))
}

/// Roles from highest to lowest position, @everyone excluded
pub fn roles_embed(guild: &serenity::Guild) -> serenity::CreateEmbed {
    let mut roles: Vec<&serenity::Role> = guild
        .roles
        .values()
        .filter(|r| r.id.get() != guild.id.get())
        .collect();
    roles.sort_by(|a, b| b.position.cmp(&a.position).then(a.id.cmp(&b.id)));

    let listing = roles
        .iter()
        .map(|r| r.mention().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    serenity::CreateEmbed::new()
        .color(colors::PRIMARY)
        .title(format!("الرتب في {}", guild.name))
        .description(if listing.is_empty() {
            "لا توجد رتب.".to_string()
        } else {
            truncate(&listing, 4096)
        })
}

async fn say_guild_only(ctx: Context<'_>) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().content(GUILD_ONLY).ephemeral(true))
        .await?;
    Ok(())
}

/// Show server information
#[poise::command(slash_command)]
pub async fn serverinfo(ctx: Context<'_>) -> Result<(), Error> {
    // The cache guard must be dropped before awaiting
    let embed = ctx.guild().map(|guild| server_info_embed(&guild));
    match embed {
        Some(embed) => {
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            Ok(())
        }
        None => say_guild_only(ctx).await,
    }
}

async fn send_user_info(ctx: Context<'_>, user: Option<serenity::User>) -> Result<(), Error> {
    let user = user.unwrap_or_else(|| ctx.author().clone());
    let member = match ctx.guild_id() {
        Some(guild_id) => guild_id.member(ctx.serenity_context(), user.id).await.ok(),
        None => None,
    };

    ctx.send(poise::CreateReply::default().embed(user_info_embed(&user, member.as_ref())))
        .await?;
    Ok(())
}

/// Show information about a user
#[poise::command(slash_command)]
pub async fn userinfo(
    ctx: Context<'_>,
    #[description = "المستخدم المراد عرض معلوماته"] user: Option<serenity::User>,
) -> Result<(), Error> {
    send_user_info(ctx, user).await
}

/// Show information about a user
#[poise::command(slash_command)]
pub async fn user(
    ctx: Context<'_>,
    #[description = "المستخدم المراد عرض معلوماته"] user: Option<serenity::User>,
) -> Result<(), Error> {
    send_user_info(ctx, user).await
}

/// Show a user's avatar
#[poise::command(slash_command)]
pub async fn avatar(
    ctx: Context<'_>,
    #[description = "المستخدم المراد عرض صورته"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let user = user.unwrap_or_else(|| ctx.author().clone());
    ctx.send(poise::CreateReply::default().embed(avatar_embed(&user))).await?;
    Ok(())
}

/// List the server's roles
#[poise::command(slash_command)]
pub async fn roles(ctx: Context<'_>) -> Result<(), Error> {
    let embed = ctx.guild().map(|guild| roles_embed(&guild));
    match embed {
        Some(embed) => {
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            Ok(())
        }
        None => say_guild_only(ctx).await,
    }
}

// --- Text forms ---

/// Target of a text command: first mention, else the author
fn text_target(msg: &serenity::Message) -> &serenity::User {
    msg.mentions.first().unwrap_or(&msg.author)
}

pub async fn server_info_message(ctx: &serenity::Context, msg: &serenity::Message) -> Result<(), Error> {
    let embed = msg.guild(&ctx.cache).map(|guild| server_info_embed(&guild));
    match embed {
        Some(embed) => msg.channel_id.send_message(&ctx.http, serenity::CreateMessage::new().embed(embed)).await?,
        None => msg.channel_id.say(&ctx.http, GUILD_ONLY).await?,
    };
    Ok(())
}

pub async fn user_info_message(ctx: &serenity::Context, msg: &serenity::Message) -> Result<(), Error> {
    let user = text_target(msg);
    let member = match msg.guild_id {
        Some(guild_id) => guild_id.member(ctx, user.id).await.ok(),
        None => None,
    };

    msg.channel_id
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(user_info_embed(user, member.as_ref())))
        .await?;
    Ok(())
}

pub async fn avatar_message(ctx: &serenity::Context, msg: &serenity::Message) -> Result<(), Error> {
    let embed = avatar_embed(text_target(msg));
    msg.channel_id
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

pub async fn roles_message(ctx: &serenity::Context, msg: &serenity::Message) -> Result<(), Error> {
    let embed = msg.guild(&ctx.cache).map(|guild| roles_embed(&guild));
    match embed {
        Some(embed) => msg.channel_id.send_message(&ctx.http, serenity::CreateMessage::new().embed(embed)).await?,
        None => msg.channel_id.say(&ctx.http, GUILD_ONLY).await?,
    };
    Ok(())
}
