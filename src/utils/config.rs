// Centralized configuration for Furat Bot

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Welcome text size range exposed by the dashboard editor (px)
pub const TEXT_SIZE_MIN: f32 = 12.0;
pub const TEXT_SIZE_MAX: f32 = 72.0;

/// Avatar diameter range exposed by the dashboard editor (px)
pub const AVATAR_DIAMETER_MIN: u32 = 32;
pub const AVATAR_DIAMETER_MAX: u32 = 256;

/// Size requested from the Discord CDN for avatars
pub const AVATAR_FETCH_SIZE: u32 = 256;

/// File name of the attached welcome image
pub const WELCOME_IMAGE_NAME: &str = "welcome-image.png";

/// Reply sent when a command handler fails
pub const COMMAND_FAILED: &str = "عذرًا، حدث خطأ أثناء تنفيذ هذا الأمر. الرجاء المحاولة مرة أخرى لاحقًا.";

const DEFAULT_DATA_PATH: &str = "data/servers";
const DEFAULT_FONT_DIR: &str = "assets/fonts";
const DEFAULT_FONT_FAMILY: &str = "Cairo";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Discord embed colors
pub mod colors {
    pub const PRIMARY: u32 = 0x0099ff;
    pub const SUCCESS: u32 = 0x2ecc71;
    pub const ERROR: u32 = 0xff0000;
    pub const WARNING: u32 = 0xffa500;
}

/// Runtime settings read from the environment (.env is loaded first)
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub token: String,
    pub data_path: PathBuf,
    pub font_dir: PathBuf,
    pub default_font: String,
    pub fetch_timeout: Duration,
}

impl BotSettings {
    pub fn from_env() -> anyhow::Result<Self> {
        let token = env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?;

        Ok(Self {
            token,
            data_path: env_or("SERVER_DATA_PATH", DEFAULT_DATA_PATH).into(),
            font_dir: env_or("FONT_DIR", DEFAULT_FONT_DIR).into(),
            default_font: env_or("DEFAULT_FONT", DEFAULT_FONT_FAMILY),
            fetch_timeout: Duration::from_secs(parse_timeout(
                env::var("AVATAR_FETCH_TIMEOUT_SECS").ok().as_deref(),
            )),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse the fetch timeout, falling back to the default on junk or zero
fn parse_timeout(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
}
