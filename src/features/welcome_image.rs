// Welcome image compositor
// Layers: background -> circular avatar -> welcome text -> username.
// The dashboard editor preview draws with the same order, centering and clipping rules.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use base64::Engine;
use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, ImageEncoder, Rgb, Rgba, RgbImage, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::discord_cdn::download_image;
use crate::models::welcome::{ImageSource, WelcomeLayout};
use crate::utils::config::{AVATAR_DIAMETER_MAX, AVATAR_DIAMETER_MIN, TEXT_SIZE_MAX, TEXT_SIZE_MIN};
use crate::utils::fonts::FontRegistry;
use crate::utils::formatters::{parse_hex_color, shape_for_display};

const FALLBACK_TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Missing, unreachable or corrupt base image
    #[error("base image could not be decoded: {0}")]
    Decode(String),
    /// Avatar download failed or returned something that is not an image
    #[error("avatar could not be fetched: {0}")]
    AvatarFetch(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Decode the payload of a `data:<mime>;base64,<payload>` URL
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, String> {
    let rest = url.strip_prefix("data:").ok_or("not a data URL")?;
    let (header, payload) = rest.split_once(',').ok_or("data URL has no payload")?;
    if !header.ends_with(";base64") {
        return Err(format!("unsupported data URL encoding '{}'", header));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("invalid base64 payload: {}", e))
}

/// Renders welcome images; cheap to clone, safe to share between concurrent joins
#[derive(Clone)]
pub struct WelcomeRenderer {
    client: reqwest::Client,
    fonts: Arc<FontRegistry>,
    fetch_timeout: Duration,
}

impl WelcomeRenderer {
    pub fn new(client: reqwest::Client, fonts: Arc<FontRegistry>, fetch_timeout: Duration) -> Self {
        Self {
            client,
            fonts,
            fetch_timeout,
        }
    }

    async fn load(&self, source: &ImageSource) -> Result<Vec<u8>, String> {
        match source {
            ImageSource::Bytes(bytes) => Ok(bytes.clone()),
            ImageSource::DataUrl(url) => decode_data_url(url),
            ImageSource::Url(url) => download_image(&self.client, url, self.fetch_timeout)
                .await
                .map_err(|e| e.to_string()),
        }
    }

    async fn load_avatar(&self, source: &ImageSource) -> Result<DynamicImage, RenderError> {
        let bytes = self.load(source).await.map_err(RenderError::AvatarFetch)?;
        image::load_from_memory(&bytes).map_err(|e| RenderError::AvatarFetch(e.to_string()))
    }

    /// Render the welcome image for one member.
    ///
    /// The caller decides whether rendering should happen at all (enabled flag,
    /// base image present). A failed avatar download only drops the avatar layer;
    /// a bad base image fails the whole call.
    pub async fn render(
        &self,
        layout: WelcomeLayout,
        display_name: &str,
        avatar: ImageSource,
    ) -> Result<Vec<u8>, RenderError> {
        let base_source = layout
            .base_image
            .as_ref()
            .ok_or_else(|| RenderError::Decode("no base image configured".to_string()))?;
        let base = self.load(base_source).await.map_err(RenderError::Decode)?;

        let avatar = if layout.avatar.visible {
            match self.load_avatar(&avatar).await {
                Ok(img) => Some(img),
                Err(e) => {
                    warn!("{}; rendering without avatar", e);
                    None
                }
            }
        } else {
            None
        };

        let fonts = self.fonts.clone();
        let display_name = display_name.to_string();
        tokio::task::spawn_blocking(move || compose(&layout, &base, &display_name, avatar.as_ref(), &fonts))
            .await
            .map_err(|e| RenderError::Encode(format!("render task failed: {}", e)))?
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn clamp_text_size(size: f64) -> f32 {
    if !size.is_finite() {
        return TEXT_SIZE_MIN;
    }
    (size as f32).clamp(TEXT_SIZE_MIN, TEXT_SIZE_MAX)
}

fn clamp_diameter(diameter: f64) -> u32 {
    if !diameter.is_finite() || diameter < 0.0 {
        return AVATAR_DIAMETER_MIN;
    }
    (diameter.round() as u32).clamp(AVATAR_DIAMETER_MIN, AVATAR_DIAMETER_MAX)
}

fn text_color(hex: &str) -> Rgba<u8> {
    parse_hex_color(hex).unwrap_or_else(|| {
        warn!("Invalid text color '{}', using white", hex);
        FALLBACK_TEXT_COLOR
    })
}

/// Resize (aspect-filling) to a square and clear everything outside the inscribed circle
fn circular_avatar(avatar: &DynamicImage, diameter: u32) -> RgbaImage {
    let mut img = avatar
        .resize_to_fill(diameter, diameter, FilterType::Lanczos3)
        .to_rgba8();

    let r = diameter as f64 / 2.0;
    for (px, py, pixel) in img.enumerate_pixels_mut() {
        let dx = px as f64 + 0.5 - r;
        let dy = py as f64 + 0.5 - r;
        if dx * dx + dy * dy > r * r {
            pixel.0[3] = 0;
        }
    }
    img
}

/// Draw `text` horizontally centered on `x` with its baseline on `y`
fn draw_centered_text(
    canvas: &mut RgbaImage,
    text: &str,
    font: &FontArc,
    size: f32,
    color: Rgba<u8>,
    x: f64,
    y: f64,
) {
    if text.trim().is_empty() {
        return;
    }

    let scale = PxScale::from(size);
    let visual = shape_for_display(text);
    let (width, _) = text_size(scale, font, &visual);
    let ascent = font.as_scaled(scale).ascent() as f64;

    let left = (finite_or_zero(x) - width as f64 / 2.0).round() as i32;
    let top = (finite_or_zero(y) - ascent).round() as i32;
    draw_text_mut(canvas, color, left, top, scale, font, &visual);
}

/// Compose the final image. Pure: same inputs, same bytes.
pub fn compose(
    layout: &WelcomeLayout,
    base: &[u8],
    display_name: &str,
    avatar: Option<&DynamicImage>,
    fonts: &FontRegistry,
) -> Result<Vec<u8>, RenderError> {
    let background = image::load_from_memory(base).map_err(|e| RenderError::Decode(e.to_string()))?;

    // Canvas always matches the base image's native size
    let mut canvas = background.to_rgba8();
    debug!("Composing welcome image {}x{}", canvas.width(), canvas.height());

    if layout.avatar.visible {
        if let Some(avatar) = avatar {
            let diameter = clamp_diameter(layout.avatar.diameter);
            let circle = circular_avatar(avatar, diameter);
            let half = diameter as f64 / 2.0;
            let left = (finite_or_zero(layout.avatar.x) - half).round() as i64;
            let top = (finite_or_zero(layout.avatar.y) - half).round() as i64;
            image::imageops::overlay(&mut canvas, &circle, left, top);
        }
    }

    if layout.text.visible {
        match fonts.resolve(&layout.text.font) {
            Some(font) => draw_centered_text(
                &mut canvas,
                &layout.text.content,
                font,
                clamp_text_size(layout.text.size),
                text_color(&layout.text.color),
                layout.text.x,
                layout.text.y,
            ),
            None => warn!("No usable font; skipping welcome text"),
        }
    }

    if layout.username.visible {
        match fonts.resolve(&layout.username.font) {
            Some(font) => draw_centered_text(
                &mut canvas,
                display_name,
                font,
                clamp_text_size(layout.username.size),
                text_color(&layout.username.color),
                layout.username.x,
                layout.username.y,
            ),
            None => warn!("No usable font; skipping username"),
        }
    }

    encode_png(&flatten(&canvas))
}

/// Composite over a black matte: each channel is weighted by alpha
fn flatten(canvas: &RgbaImage) -> RgbImage {
    ImageBuffer::from_fn(canvas.width(), canvas.height(), |x, y| {
        let Rgba([r, g, b, a]) = *canvas.get_pixel(x, y);
        let weight = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
        Rgb([weight(r), weight(g), weight(b)])
    })
}

fn encode_png(img: &RgbImage) -> Result<Vec<u8>, RenderError> {
    let mut png_bytes: Vec<u8> = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(img.as_raw(), img.width(), img.height(), image::ExtendedColorType::Rgb8)
            .map_err(|e| RenderError::Encode(format!("{:?}", e)))?;
    }
    Ok(png_bytes)
}
