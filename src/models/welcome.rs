// Welcome settings and layout model
// Matches the `welcomeSettings` object the dashboard writes into each server file

use serde::{Deserialize, Serialize};

/// Flat welcome settings record as persisted by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WelcomeSettings {
    pub is_welcome_enabled: bool,
    pub welcome_channel: String,
    pub welcome_message: String,
    /// Data URL (dashboard upload) or http(s) URL of the background
    pub welcome_image: Option<String>,

    pub show_welcome_text: bool,
    pub image_text: String,
    pub image_text_color: String,
    pub image_text_size: f64,
    pub image_text_x: f64,
    pub image_text_y: f64,

    pub show_avatar: bool,
    pub avatar_x: f64,
    pub avatar_y: f64,
    pub avatar_size: f64,

    pub show_username: bool,
    pub username_x: f64,
    pub username_y: f64,
    pub username_size: f64,
    pub username_color: String,

    pub font: String,
}

impl Default for WelcomeSettings {
    fn default() -> Self {
        Self {
            is_welcome_enabled: false,
            welcome_channel: String::new(),
            welcome_message: "مرحبًا {user} في سيرفر {server}!".to_string(),
            welcome_image: None,
            show_welcome_text: true,
            image_text: "أهلاً بك!".to_string(),
            image_text_color: "#ffffff".to_string(),
            image_text_size: 40.0,
            image_text_x: 50.0,
            image_text_y: 50.0,
            show_avatar: true,
            avatar_x: 50.0,
            avatar_y: 50.0,
            avatar_size: 128.0,
            show_username: false,
            username_x: 50.0,
            username_y: 100.0,
            username_size: 24.0,
            username_color: "#ffffff".to_string(),
            font: "Cairo".to_string(),
        }
    }
}

/// Where an image comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Raw encoded image bytes
    Bytes(Vec<u8>),
    /// `data:<mime>;base64,<payload>`
    DataUrl(String),
    /// Remote http(s) resource
    Url(String),
}

impl ImageSource {
    /// Interpret a stored image reference. Empty references mean "no image".
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            None
        } else if reference.starts_with("data:") {
            Some(Self::DataUrl(reference.to_string()))
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            Some(Self::Url(reference.to_string()))
        } else {
            // Bare base64 payload without the data: prefix
            Some(Self::DataUrl(format!("data:application/octet-stream;base64,{}", reference)))
        }
    }
}

/// Welcome text element
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub visible: bool,
    pub content: String,
    pub x: f64,
    /// Baseline
    pub y: f64,
    pub size: f64,
    pub color: String,
    pub font: String,
}

/// Avatar element, centered on (x, y)
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarElement {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub diameter: f64,
}

/// Username element; the text is the joining member's display name
#[derive(Debug, Clone, PartialEq)]
pub struct UsernameElement {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: String,
    pub font: String,
}

/// Everything the compositor and delivery need for one server.
/// Coordinates are in the base image's native pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct WelcomeLayout {
    pub enabled: bool,
    pub base_image: Option<ImageSource>,
    pub message: String,
    pub channel_id: String,
    pub text: TextElement,
    pub avatar: AvatarElement,
    pub username: UsernameElement,
}

impl From<&WelcomeSettings> for WelcomeLayout {
    fn from(s: &WelcomeSettings) -> Self {
        Self {
            enabled: s.is_welcome_enabled,
            base_image: s.welcome_image.as_deref().and_then(ImageSource::parse),
            message: s.welcome_message.clone(),
            channel_id: s.welcome_channel.trim().to_string(),
            text: TextElement {
                visible: s.show_welcome_text,
                content: s.image_text.clone(),
                x: s.image_text_x,
                y: s.image_text_y,
                size: s.image_text_size,
                color: s.image_text_color.clone(),
                font: s.font.clone(),
            },
            avatar: AvatarElement {
                visible: s.show_avatar,
                x: s.avatar_x,
                y: s.avatar_y,
                diameter: s.avatar_size,
            },
            username: UsernameElement {
                visible: s.show_username,
                x: s.username_x,
                y: s.username_y,
                size: s.username_size,
                color: s.username_color.clone(),
                font: s.font.clone(),
            },
        }
    }
}

impl WelcomeLayout {
    /// Target channel, only when the welcome flow is enabled and a channel is set
    pub fn delivery_channel(&self) -> Option<u64> {
        if !self.enabled {
            return None;
        }
        self.channel_id.parse::<u64>().ok().filter(|id| *id != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let settings: WelcomeSettings =
            serde_json::from_str(r#"{"isWelcomeEnabled": true, "welcomeChannel": "42"}"#).unwrap();
        assert!(settings.is_welcome_enabled);
        assert_eq!(settings.welcome_channel, "42");
        assert_eq!(settings.image_text_size, 40.0);
        assert_eq!(settings.avatar_size, 128.0);
        assert!(!settings.show_username);
        assert_eq!(settings.font, "Cairo");
    }

    #[test]
    fn test_dashboard_document_round_trips_keys() {
        let json = serde_json::to_value(WelcomeSettings::default()).unwrap();
        for key in ["isWelcomeEnabled", "welcomeImage", "imageTextX", "avatarSize", "usernameColor"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
    }

    #[test]
    fn test_layout_from_settings() {
        let settings = WelcomeSettings {
            is_welcome_enabled: true,
            welcome_channel: " 123 ".to_string(),
            welcome_image: Some("data:image/png;base64,AAAA".to_string()),
            avatar_x: 500.0,
            avatar_y: 300.0,
            ..Default::default()
        };
        let layout = WelcomeLayout::from(&settings);

        assert_eq!(layout.channel_id, "123");
        assert!(matches!(layout.base_image, Some(ImageSource::DataUrl(_))));
        assert_eq!(layout.avatar.x, 500.0);
        assert_eq!(layout.text.font, "Cairo");
        assert_eq!(layout.username.font, "Cairo");
    }

    #[test]
    fn test_image_source_parse() {
        assert_eq!(ImageSource::parse("  "), None);
        assert!(matches!(ImageSource::parse("https://cdn.example/bg.png"), Some(ImageSource::Url(_))));
        assert!(matches!(ImageSource::parse("data:image/png;base64,AA=="), Some(ImageSource::DataUrl(_))));
        match ImageSource::parse("iVBORw0KGgo=") {
            Some(ImageSource::DataUrl(url)) => assert!(url.ends_with(",iVBORw0KGgo=")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_delivery_channel() {
        let mut layout = WelcomeLayout::from(&WelcomeSettings::default());
        layout.channel_id = "987".to_string();
        assert_eq!(layout.delivery_channel(), None);

        layout.enabled = true;
        assert_eq!(layout.delivery_channel(), Some(987));

        layout.channel_id = String::new();
        assert_eq!(layout.delivery_channel(), None);
    }
}
