// Per-server command configuration
// Each entry is one known command kind with explicit access rules

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Commands the bot knows how to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Help,
    ServerInfo,
    UserInfo,
    User,
    Avatar,
    Ping,
    Roles,
    Roll,
    Poll,
}

impl CommandKind {
    pub const ALL: [CommandKind; 9] = [
        CommandKind::Help,
        CommandKind::ServerInfo,
        CommandKind::UserInfo,
        CommandKind::User,
        CommandKind::Avatar,
        CommandKind::Ping,
        CommandKind::Roles,
        CommandKind::Roll,
        CommandKind::Poll,
    ];

    /// Canonical (slash) command name
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Help => "help",
            CommandKind::ServerInfo => "serverinfo",
            CommandKind::UserInfo => "userinfo",
            CommandKind::User => "user",
            CommandKind::Avatar => "avatar",
            CommandKind::Ping => "ping",
            CommandKind::Roles => "roles",
            CommandKind::Roll => "roll",
            CommandKind::Poll => "poll",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Why a command invocation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("This command is not available.")]
    Disabled,
    #[error("This command cannot be used in this channel.")]
    ChannelNotAllowed,
    #[error("You do not have permission to use this command.")]
    RoleNotAllowed,
}

/// One command entry in a server file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandConfig {
    pub id: CommandKind,
    pub name: String,
    pub description: String,
    #[serde(rename = "isEnabled")]
    pub enabled: bool,
    #[serde(default)]
    pub alternative_names: Vec<String>,
    #[serde(default)]
    pub allowed_roles: Vec<String>,
    #[serde(default)]
    pub disallowed_roles: Vec<String>,
    #[serde(default)]
    pub allowed_channels: Vec<String>,
    #[serde(default)]
    pub disallowed_channels: Vec<String>,
}

impl CommandConfig {
    pub fn new(kind: CommandKind, description: &str, alternative_names: &[&str]) -> Self {
        Self {
            id: kind,
            name: kind.name().to_string(),
            description: description.to_string(),
            enabled: true,
            alternative_names: alternative_names.iter().map(|s| s.to_string()).collect(),
            allowed_roles: Vec::new(),
            disallowed_roles: Vec::new(),
            allowed_channels: Vec::new(),
            disallowed_channels: Vec::new(),
        }
    }

    /// Whether `invoked` is this command's name or one of its alternative names
    pub fn matches(&self, invoked: &str) -> bool {
        let invoked = invoked.trim().to_lowercase();
        self.name.to_lowercase() == invoked
            || self
                .alternative_names
                .iter()
                .any(|alt| alt.trim().to_lowercase() == invoked)
    }

    /// Apply the enabled flag, then channel rules, then role rules
    pub fn check_access(&self, channel_id: &str, member_roles: &[String]) -> Result<(), AccessDenied> {
        if !self.enabled {
            return Err(AccessDenied::Disabled);
        }

        if !self.allowed_channels.is_empty() && !self.allowed_channels.iter().any(|c| c == channel_id) {
            return Err(AccessDenied::ChannelNotAllowed);
        }
        if self.disallowed_channels.iter().any(|c| c == channel_id) {
            return Err(AccessDenied::ChannelNotAllowed);
        }

        if !self.allowed_roles.is_empty() && !self.allowed_roles.iter().any(|r| member_roles.contains(r)) {
            return Err(AccessDenied::RoleNotAllowed);
        }
        if self.disallowed_roles.iter().any(|r| member_roles.contains(r)) {
            return Err(AccessDenied::RoleNotAllowed);
        }

        Ok(())
    }
}

/// Partial update for one command, merged over the stored entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "isEnabled")]
    pub enabled: Option<bool>,
    pub alternative_names: Option<Vec<String>>,
    pub allowed_roles: Option<Vec<String>>,
    pub disallowed_roles: Option<Vec<String>>,
    pub allowed_channels: Option<Vec<String>>,
    pub disallowed_channels: Option<Vec<String>>,
}

impl CommandPatch {
    pub fn apply(self, command: &mut CommandConfig) {
        if let Some(name) = self.name {
            command.name = name;
        }
        if let Some(description) = self.description {
            command.description = description;
        }
        if let Some(enabled) = self.enabled {
            command.enabled = enabled;
        }
        if let Some(v) = self.alternative_names {
            command.alternative_names = v;
        }
        if let Some(v) = self.allowed_roles {
            command.allowed_roles = v;
        }
        if let Some(v) = self.disallowed_roles {
            command.disallowed_roles = v;
        }
        if let Some(v) = self.allowed_channels {
            command.allowed_channels = v;
        }
        if let Some(v) = self.disallowed_channels {
            command.disallowed_channels = v;
        }
    }
}

/// Command list a new server starts with
pub static DEFAULT_COMMANDS: Lazy<Vec<CommandConfig>> = Lazy::new(|| {
    vec![
        CommandConfig::new(CommandKind::Help, "عرض قائمة الأوامر المتاحة", &["مساعدة", "اوامر"]),
        CommandConfig::new(CommandKind::ServerInfo, "عرض معلومات السيرفر", &["معلومات_السيرفر", "السيرفر"]),
        CommandConfig::new(CommandKind::UserInfo, "عرض معلومات المستخدم", &["معلومات_المستخدم", "المستخدم"]),
        CommandConfig::new(CommandKind::User, "معلومات المستخدم", &[]),
        CommandConfig::new(CommandKind::Avatar, "عرض الصورة الشخصية للمستخدم", &["صورة", "الصورة"]),
        CommandConfig::new(CommandKind::Ping, "فحص استجابة البوت", &["بينج", "اختبار"]),
        CommandConfig::new(CommandKind::Roles, "قائمة الرتب", &["الرتب"]),
        CommandConfig::new(CommandKind::Roll, "رمي النرد", &["نرد", "رمي"]),
        CommandConfig::new(CommandKind::Poll, "إنشاء استطلاع بسيط", &["استطلاع", "تصويت"]),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_name(kind.name()), Some(kind));
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.name().to_string()));
        }
        assert_eq!(CommandKind::from_name("ban"), None);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let raw = r#"{"id": "eval", "name": "eval", "description": "", "isEnabled": true}"#;
        assert!(serde_json::from_str::<CommandConfig>(raw).is_err());
    }

    #[test]
    fn test_dashboard_entry_parses() {
        let raw = r#"{
            "id": "roll", "name": "roll", "description": "رمي النرد", "isEnabled": false,
            "alternativeNames": ["نرد"], "allowedRoles": [], "disallowedRoles": ["5"],
            "allowedChannels": [], "disallowedChannels": []
        }"#;
        let cmd: CommandConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cmd.id, CommandKind::Roll);
        assert!(!cmd.enabled);
        assert_eq!(cmd.disallowed_roles, vec!["5"]);
    }

    #[test]
    fn test_matches_alternative_names() {
        let cmd = CommandConfig::new(CommandKind::Roll, "dice", &["نرد", "Dice"]);
        assert!(cmd.matches("roll"));
        assert!(cmd.matches("ROLL"));
        assert!(cmd.matches("نرد"));
        assert!(cmd.matches("dice"));
        assert!(!cmd.matches("poll"));
    }

    #[test]
    fn test_disabled() {
        let mut cmd = CommandConfig::new(CommandKind::Ping, "", &[]);
        cmd.enabled = false;
        assert_eq!(cmd.check_access("1", &[]), Err(AccessDenied::Disabled));
    }

    #[test]
    fn test_channel_rules() {
        let mut cmd = CommandConfig::new(CommandKind::Ping, "", &[]);
        cmd.allowed_channels = roles(&["10"]);
        assert_eq!(cmd.check_access("11", &[]), Err(AccessDenied::ChannelNotAllowed));
        assert_eq!(cmd.check_access("10", &[]), Ok(()));

        let mut cmd = CommandConfig::new(CommandKind::Ping, "", &[]);
        cmd.disallowed_channels = roles(&["10"]);
        assert_eq!(cmd.check_access("10", &[]), Err(AccessDenied::ChannelNotAllowed));
        assert_eq!(cmd.check_access("11", &[]), Ok(()));
    }

    #[test]
    fn test_role_rules() {
        let mut cmd = CommandConfig::new(CommandKind::Ping, "", &[]);
        cmd.allowed_roles = roles(&["1", "2"]);
        assert_eq!(cmd.check_access("c", &roles(&["3"])), Err(AccessDenied::RoleNotAllowed));
        assert_eq!(cmd.check_access("c", &roles(&["3", "2"])), Ok(()));

        let mut cmd = CommandConfig::new(CommandKind::Ping, "", &[]);
        cmd.disallowed_roles = roles(&["9"]);
        assert_eq!(cmd.check_access("c", &roles(&["1", "9"])), Err(AccessDenied::RoleNotAllowed));
        assert_eq!(cmd.check_access("c", &roles(&["1"])), Ok(()));
    }

    #[test]
    fn test_channel_checked_before_roles() {
        let mut cmd = CommandConfig::new(CommandKind::Ping, "", &[]);
        cmd.disallowed_channels = roles(&["10"]);
        cmd.disallowed_roles = roles(&["9"]);
        assert_eq!(cmd.check_access("10", &roles(&["9"])), Err(AccessDenied::ChannelNotAllowed));
    }

    #[test]
    fn test_patch_merges() {
        let mut cmd = CommandConfig::new(CommandKind::Poll, "old", &["a"]);
        CommandPatch {
            enabled: Some(false),
            allowed_channels: Some(roles(&["7"])),
            ..Default::default()
        }
        .apply(&mut cmd);

        assert!(!cmd.enabled);
        assert_eq!(cmd.description, "old");
        assert_eq!(cmd.alternative_names, vec!["a"]);
        assert_eq!(cmd.allowed_channels, vec!["7"]);
    }

    #[test]
    fn test_default_commands_unique() {
        let mut seen = std::collections::HashSet::new();
        for cmd in DEFAULT_COMMANDS.iter() {
            assert!(seen.insert(cmd.id), "duplicate {:?}", cmd.id);
            assert_eq!(cmd.name, cmd.id.name());
        }
        assert_eq!(seen.len(), CommandKind::ALL.len());
    }
}
