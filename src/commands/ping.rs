// Ping command - round trip and gateway latency

use poise::serenity_prelude as serenity;
use std::time::{Duration, Instant};

use crate::{Context, Error};

pub const PING_PENDING: &str = "جاري حساب البنق...";

pub fn pong_text(round_trip: Duration, gateway: Option<Duration>) -> String {
    let gateway = gateway
        .map(|d| format!("{}ms", d.as_millis()))
        .unwrap_or_else(|| "?".to_string());
    format!(
        "🏓 بونج! زمن الاستجابة: {}ms. زمن استجابة API: {}",
        round_trip.as_millis(),
        gateway
    )
}

/// Check the bot's response time
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let start = Instant::now();
    let reply = ctx.say(PING_PENDING).await?;
    let round_trip = start.elapsed();

    let gateway = ctx.ping().await;
    let gateway = (!gateway.is_zero()).then_some(gateway);

    reply
        .edit(ctx, poise::CreateReply::default().content(pong_text(round_trip, gateway)))
        .await?;
    Ok(())
}

/// Text form: send the placeholder, then edit it with the measurements
pub async fn ping_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    gateway: Option<Duration>,
) -> Result<(), Error> {
    let start = Instant::now();
    let mut sent = msg.channel_id.say(&ctx.http, PING_PENDING).await?;
    let round_trip = start.elapsed();

    sent.edit(&ctx.http, serenity::EditMessage::new().content(pong_text(round_trip, gateway)))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pong_text() {
        let text = pong_text(Duration::from_millis(120), Some(Duration::from_millis(45)));
        assert!(text.contains("120ms"));
        assert!(text.contains("45ms"));

        let text = pong_text(Duration::from_millis(7), None);
        assert!(text.ends_with("API: ?"));
    }
}
