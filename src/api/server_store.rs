// Server settings store
// One JSON document per guild under the data directory, shared with the dashboard

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::command::{CommandConfig, CommandKind, CommandPatch, DEFAULT_COMMANDS};
use crate::models::server::ServerConfig;
use crate::models::welcome::WelcomeSettings;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed server document {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid server document: {0}")]
    Invalid(String),
    #[error("{0} not found")]
    NotFound(String),
}

/// File-backed document store keyed by guild id
pub struct ServerStore {
    root: PathBuf,
    // Serializes read-modify-write cycles per guild
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ServerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Guild ids are snowflakes; anything else could escape the data directory
    fn path_for(&self, server_id: &str) -> Result<PathBuf, StoreError> {
        if server_id.is_empty() || !server_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(StoreError::Invalid(format!("bad server id '{}'", server_id)));
        }
        Ok(self.root.join(format!("{}.json", server_id)))
    }

    fn lock_for(&self, server_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(server_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn read_unlocked(&self, server_id: &str) -> Result<ServerConfig, StoreError> {
        let path = self.path_for(server_id)?;

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No configuration file for server {}. Creating a default one.", server_id);
                let config = ServerConfig::default();
                self.write_unlocked(server_id, &config).await?;
                return Ok(config);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        // An empty file is treated like a missing one
        if content.trim().is_empty() {
            let config = ServerConfig::default();
            self.write_unlocked(server_id, &config).await?;
            return Ok(config);
        }

        let config: ServerConfig = serde_json::from_str(&content)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;
        config.validate().map_err(StoreError::Invalid)?;
        Ok(config)
    }

    async fn write_unlocked(&self, server_id: &str, config: &ServerConfig) -> Result<(), StoreError> {
        config.validate().map_err(StoreError::Invalid)?;
        let path = self.path_for(server_id)?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StoreError::Io { path: self.root.clone(), source })?;

        let json = serde_json::to_string_pretty(config)
            .map_err(|source| StoreError::Json { path: path.clone(), source })?;

        // Write then rename so the dashboard never reads a half-written file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StoreError::Io { path: tmp.clone(), source })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io { path: path.clone(), source })?;

        debug!("Saved configuration for server {}", server_id);
        Ok(())
    }

    /// Read a server document, creating the default one when absent
    pub async fn get(&self, server_id: &str) -> Result<ServerConfig, StoreError> {
        let lock = self.lock_for(server_id);
        let _guard = lock.lock().await;
        self.read_unlocked(server_id).await
    }

    /// Replace a server document wholesale
    pub async fn put(&self, server_id: &str, config: &ServerConfig) -> Result<(), StoreError> {
        let lock = self.lock_for(server_id);
        let _guard = lock.lock().await;
        self.write_unlocked(server_id, config).await
    }

    /// Read, mutate and write back under the guild lock
    pub async fn modify<T>(
        &self,
        server_id: &str,
        f: impl FnOnce(&mut ServerConfig) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let lock = self.lock_for(server_id);
        let _guard = lock.lock().await;

        let mut config = self.read_unlocked(server_id).await?;
        let out = f(&mut config)?;
        self.write_unlocked(server_id, &config).await?;
        Ok(out)
    }

    pub async fn welcome_settings(&self, server_id: &str) -> Result<WelcomeSettings, StoreError> {
        Ok(self.get(server_id).await?.welcome_settings)
    }

    pub async fn put_welcome_settings(
        &self,
        server_id: &str,
        settings: WelcomeSettings,
    ) -> Result<(), StoreError> {
        self.modify(server_id, |config| {
            config.welcome_settings = settings;
            Ok(())
        })
        .await
    }

    /// Command list for a server; an empty list is reset to the defaults
    pub async fn commands(&self, server_id: &str) -> Result<Vec<CommandConfig>, StoreError> {
        let config = self.get(server_id).await?;
        if !config.commands.is_empty() {
            return Ok(config.commands);
        }

        info!("No commands found for server {}, using default commands", server_id);
        self.modify(server_id, |config| {
            if config.commands.is_empty() {
                config.commands = DEFAULT_COMMANDS.clone();
            }
            Ok(config.commands.clone())
        })
        .await
    }

    /// Merge a partial update into one command
    pub async fn update_command(
        &self,
        server_id: &str,
        kind: CommandKind,
        patch: CommandPatch,
    ) -> Result<CommandConfig, StoreError> {
        self.modify(server_id, |config| {
            let command = config
                .commands
                .iter_mut()
                .find(|c| c.id == kind)
                .ok_or_else(|| StoreError::NotFound(format!("command '{}'", kind.name())))?;
            patch.apply(command);
            Ok(command.clone())
        })
        .await
    }

    /// Ids of every server that has a document
    pub async fn list_servers(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(source) => return Err(StoreError::Io { path: self.root.clone(), source }),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| StoreError::Io { path: self.root.clone(), source })?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if self.path_for(stem).is_ok() {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ServerStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ServerStore::new(dir.path().join("servers"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_get_creates_default_file() {
        let (_dir, store) = store();
        let config = store.get("123").await.unwrap();

        assert_eq!(config, ServerConfig::default());
        assert!(store.root().join("123.json").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_ids() {
        let (_dir, store) = store();
        assert!(matches!(store.get("../etc").await, Err(StoreError::Invalid(_))));
        assert!(matches!(store.get("").await, Err(StoreError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let (_dir, store) = store();
        let mut config = ServerConfig::default();
        config.welcome_settings.welcome_channel = "555".to_string();
        store.put("1", &config).await.unwrap();

        assert_eq!(store.get("1").await.unwrap(), config);
        assert_eq!(store.welcome_settings("1").await.unwrap().welcome_channel, "555");
    }

    #[tokio::test]
    async fn test_put_welcome_settings_keeps_commands() {
        let (_dir, store) = store();
        store
            .update_command("7", CommandKind::Roll, CommandPatch { enabled: Some(false), ..Default::default() })
            .await
            .unwrap();

        let settings = WelcomeSettings { is_welcome_enabled: true, ..Default::default() };
        store.put_welcome_settings("7", settings.clone()).await.unwrap();

        let config = store.get("7").await.unwrap();
        assert_eq!(config.welcome_settings, settings);
        let roll = config.commands.iter().find(|c| c.id == CommandKind::Roll).unwrap();
        assert!(!roll.enabled);
    }

    #[tokio::test]
    async fn test_empty_command_list_reset() {
        let (_dir, store) = store();
        let config = ServerConfig { commands: vec![], ..Default::default() };
        store.put("9", &config).await.unwrap();

        let commands = store.commands("9").await.unwrap();
        assert_eq!(commands.len(), DEFAULT_COMMANDS.len());
        assert_eq!(store.get("9").await.unwrap().commands.len(), DEFAULT_COMMANDS.len());
    }

    #[tokio::test]
    async fn test_update_missing_command() {
        let (_dir, store) = store();
        let config = ServerConfig {
            commands: vec![CommandConfig::new(CommandKind::Ping, "", &[])],
            ..Default::default()
        };
        store.put("4", &config).await.unwrap();

        let result = store.update_command("4", CommandKind::Poll, CommandPatch::default()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_command_id_rejected() {
        let (_dir, store) = store();
        tokio::fs::create_dir_all(store.root()).await.unwrap();
        tokio::fs::write(
            store.root().join("5.json"),
            r#"{"commands": [{"id": "nuke", "name": "nuke", "description": "", "isEnabled": true}]}"#,
        )
        .await
        .unwrap();

        assert!(matches!(store.get("5").await, Err(StoreError::Json { .. })));
    }

    #[tokio::test]
    async fn test_dashboard_keys_survive_rewrite() {
        let (_dir, store) = store();
        tokio::fs::create_dir_all(store.root()).await.unwrap();
        tokio::fs::write(store.root().join("6.json"), r#"{"modCommands": [{"id": "ban"}]}"#)
            .await
            .unwrap();

        store.put_welcome_settings("6", WelcomeSettings::default()).await.unwrap();

        let raw = tokio::fs::read_to_string(store.root().join("6.json")).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["modCommands"][0]["id"], "ban");
    }

    #[tokio::test]
    async fn test_concurrent_modifications_serialize() {
        let (_dir, store) = store();
        let store = Arc::new(store);
        store.get("8").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .modify("8", move |config| {
                        config.extra.insert(format!("k{}", i), serde_json::json!(i));
                        Ok(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.get("8").await.unwrap().extra.len(), 10);
    }

    #[tokio::test]
    async fn test_list_servers() {
        let (_dir, store) = store();
        assert!(store.list_servers().await.unwrap().is_empty());

        store.get("20").await.unwrap();
        store.get("10").await.unwrap();
        tokio::fs::write(store.root().join("notes.txt"), "x").await.unwrap();

        assert_eq!(store.list_servers().await.unwrap(), vec!["10", "20"]);
    }
}
