// Welcome delivery - sends the templated message and rendered image on member join

use poise::serenity_prelude as serenity;
use serenity::Mentionable;
use tracing::{error, info, warn};

use crate::api::discord_cdn::avatar_png_url;
use crate::models::welcome::{ImageSource, WelcomeLayout};
use crate::utils::config::WELCOME_IMAGE_NAME;
use crate::utils::formatters::render_template;
use crate::Data;

/// Handle a guild member join. Never fails: every problem is logged.
pub async fn handle_member_join(ctx: &serenity::Context, member: &serenity::Member, data: &Data) {
    let guild_id = member.guild_id;
    info!("New member joined: {} in {}", member.user.name, guild_id);

    let settings = match data.store.welcome_settings(&guild_id.to_string()).await {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load welcome settings for server {}: {}", guild_id, e);
            return;
        }
    };

    let layout = WelcomeLayout::from(&settings);
    let Some(channel_id) = layout.delivery_channel() else {
        info!(
            "Welcome messages are disabled or channel not set for server {} (enabled: {}, channel: '{}')",
            guild_id, layout.enabled, layout.channel_id
        );
        return;
    };
    let channel_id = serenity::ChannelId::new(channel_id);

    let guild_name = guild_id.name(&ctx.cache).unwrap_or_default();
    let content = render_template(&layout.message, &member.mention().to_string(), &guild_name);

    let image = if layout.base_image.is_some() {
        let avatar = ImageSource::Url(avatar_png_url(&member.user));
        match data.renderer.render(layout, member.display_name(), avatar).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Failed to create welcome image for {}: {}. Sending message without image.", member.user.name, e);
                None
            }
        }
    } else {
        None
    };

    let mut message = serenity::CreateMessage::new().content(content);
    if let Some(bytes) = image {
        message = message.add_file(serenity::CreateAttachment::bytes(bytes, WELCOME_IMAGE_NAME));
    }

    match channel_id.send_message(&ctx.http, message).await {
        Ok(_) => info!("Sent welcome message for {} in {}", member.user.name, channel_id),
        Err(e) => error!("Failed to send welcome message to channel {}: {:?}", channel_id, e),
    }
}
