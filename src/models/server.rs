use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::command::{CommandConfig, DEFAULT_COMMANDS};
use super::welcome::WelcomeSettings;

/// Server (guild) document stored at `<data dir>/<guild id>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
    #[serde(default)]
    pub welcome_settings: WelcomeSettings,
    /// Keys written by the dashboard that the bot does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            commands: DEFAULT_COMMANDS.clone(),
            welcome_settings: WelcomeSettings::default(),
            extra: Map::new(),
        }
    }
}

impl ServerConfig {
    /// Structural checks serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for command in &self.commands {
            if command.name.trim().is_empty() {
                return Err(format!("command {:?} has an empty name", command.id));
            }
            if !seen.insert(command.id) {
                return Err(format!("command {:?} is listed twice", command.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::command::CommandKind;

    #[test]
    fn test_missing_sections_default() {
        let config: ServerConfig = serde_json::from_str("{}").unwrap();
        assert!(config.commands.is_empty());
        assert_eq!(config.welcome_settings, WelcomeSettings::default());
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let raw = r#"{"commands": [], "modCommands": [{"id": "ban"}], "name": "Furat"}"#;
        let config: ServerConfig = serde_json::from_str(raw).unwrap();
        assert!(config.extra.contains_key("modCommands"));

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["name"], "Furat");
        assert!(back.get("welcomeSettings").is_some());
    }

    #[test]
    fn test_validate_duplicates() {
        let mut config = ServerConfig::default();
        assert!(config.validate().is_ok());

        config.commands.push(CommandConfig::new(CommandKind::Ping, "again", &[]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_name() {
        let mut config = ServerConfig::default();
        config.commands[0].name = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
