// Fun commands - dice roll and reaction polls

use poise::serenity_prelude as serenity;
use rand::Rng;

use crate::utils::config::colors;
use crate::utils::formatters::truncate;
use crate::{Context, Error};

/// Keycap emojis used as poll options, one per option
pub const POLL_EMOJIS: [&str; 10] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟"];

const POLL_USAGE: &str = "الرجاء كتابة سؤال الاستطلاع. مثال: `poll هل تحب القهوة؟ | نعم | لا`";

pub fn roll_die() -> u32 {
    rand::rng().random_range(1..=6)
}

pub fn roll_text(value: u32) -> String {
    format!("🎲 النتيجة هي: **{}**", value)
}

/// Split raw poll options; no options means a yes/no poll.
/// Extra options beyond the emoji count are dropped.
pub fn split_options(raw: Option<&str>, separator: char) -> Vec<String> {
    let options: Vec<String> = raw
        .unwrap_or_default()
        .split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(POLL_EMOJIS.len())
        .map(String::from)
        .collect();

    if options.is_empty() {
        vec!["نعم".to_string(), "لا".to_string()]
    } else {
        options
    }
}

/// Parse `question | option | option ...` from a text command
pub fn parse_text_poll(args: &str) -> Option<(String, Vec<String>)> {
    let (question, rest) = match args.split_once('|') {
        Some((q, rest)) => (q.trim(), Some(rest)),
        None => (args.trim(), None),
    };
    if question.is_empty() {
        return None;
    }
    Some((question.to_string(), split_options(rest, '|')))
}

pub fn poll_embed(question: &str, options: &[String], author: &serenity::User) -> serenity::CreateEmbed {
    let body = options
        .iter()
        .zip(POLL_EMOJIS)
        .map(|(option, emoji)| format!("{} {}", emoji, option))
        .collect::<Vec<_>>()
        .join("\n");

    serenity::CreateEmbed::new()
        .color(colors::PRIMARY)
        .title("📊 استطلاع")
        .description(format!("**{}**\n\n{}", truncate(question, 256), body))
        .footer(serenity::CreateEmbedFooter::new(format!("بواسطة {}", author.name)))
}

async fn add_poll_reactions(
    http: &serenity::Http,
    message: &serenity::Message,
    option_count: usize,
) -> Result<(), Error> {
    for emoji in POLL_EMOJIS.iter().take(option_count) {
        message
            .react(http, serenity::ReactionType::Unicode(emoji.to_string()))
            .await?;
    }
    Ok(())
}

/// Roll a six-sided die
#[poise::command(slash_command)]
pub async fn roll(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(roll_text(roll_die())).await?;
    Ok(())
}

/// Create a poll with reaction voting
#[poise::command(slash_command)]
pub async fn poll(
    ctx: Context<'_>,
    #[description = "سؤال الاستطلاع"] question: String,
    #[description = "الخيارات مفصولة بفاصلة"] options: Option<String>,
) -> Result<(), Error> {
    let options = split_options(options.as_deref(), ',');
    let embed = poll_embed(&question, &options, ctx.author());

    let reply = ctx.send(poise::CreateReply::default().embed(embed)).await?;
    let message = reply.message().await?;
    add_poll_reactions(ctx.http(), &message, options.len()).await
}

pub async fn roll_message(ctx: &serenity::Context, msg: &serenity::Message) -> Result<(), Error> {
    msg.reply(&ctx.http, roll_text(roll_die())).await?;
    Ok(())
}

pub async fn poll_message(ctx: &serenity::Context, msg: &serenity::Message, args: &str) -> Result<(), Error> {
    let Some((question, options)) = parse_text_poll(args) else {
        msg.reply(&ctx.http, POLL_USAGE).await?;
        return Ok(());
    };

    let embed = poll_embed(&question, &options, &msg.author);
    let sent = msg
        .channel_id
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await?;
    add_poll_reactions(&ctx.http, &sent, options.len()).await
}
