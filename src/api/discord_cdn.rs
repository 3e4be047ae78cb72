// Image downloads (avatars and remote welcome backgrounds)

use anyhow::{bail, Result};
use poise::serenity_prelude as serenity;
use std::time::Duration;

use crate::utils::config::AVATAR_FETCH_SIZE;

pub const DISCORD_CDN_BASE: &str = "https://cdn.discordapp.com";

/// PNG avatar URL at the size the compositor expects.
/// Users without a custom avatar get their default avatar.
pub fn avatar_png_url(user: &serenity::User) -> String {
    match &user.avatar {
        Some(hash) => format!(
            "{}/avatars/{}/{}.png?size={}",
            DISCORD_CDN_BASE, user.id, hash, AVATAR_FETCH_SIZE
        ),
        None => user.default_avatar_url(),
    }
}

/// Largest avatar Discord serves, animated avatars stay animated
pub fn avatar_full_url(user: &serenity::User) -> String {
    match &user.avatar {
        Some(hash) => {
            let ext = if hash.is_animated() { "gif" } else { "png" };
            format!("{}/avatars/{}/{}.{}?size=4096", DISCORD_CDN_BASE, user.id, hash, ext)
        }
        None => user.default_avatar_url(),
    }
}

/// Download an image with a hard deadline covering connect, headers and body
pub async fn download_image(client: &reqwest::Client, url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let fetch = async {
        let response = client.get(url).timeout(timeout).send().await?;
        if !response.status().is_success() {
            bail!("GET {} returned {}", url, response.status());
        }
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    };

    match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result,
        Err(_) => bail!("GET {} timed out after {:?}", url, timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_download_refused_connection() {
        let client = reqwest::Client::new();
        // Port 9 (discard) is closed on test machines
        let result = download_image(&client, "http://127.0.0.1:9/avatar.png", Duration::from_secs(2)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_download_times_out_on_silent_server() {
        // Accepts the connection but never writes a response
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = reqwest::Client::new();
        let timeout = Duration::from_millis(300);
        let started = std::time::Instant::now();
        let result = download_image(&client, &format!("http://{}/avatar.png", addr), timeout).await;

        let elapsed = started.elapsed();
        assert!(result.is_err());
        assert!(elapsed >= Duration::from_millis(250), "returned too early: {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(3), "timeout not enforced: {:?}", elapsed);
    }
}
