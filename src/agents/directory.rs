//! Agent Directory Module
//!
//! The backing store that cache misses fall through to.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::agents::{AgentInfo, AgentKind};
use crate::error::{AppError, Result};

// == Agent Directory ==
/// Source of truth for agent and user metadata (normally the game database).
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    /// Looks up one record. `Ok(None)` means the id is unknown.
    async fn fetch(&self, kind: AgentKind, id: &str) -> Result<Option<AgentInfo>>;
}

// == In-Memory Directory ==
/// `AgentDirectory` backed by two hash maps.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    agents: RwLock<HashMap<String, AgentInfo>>,
    users: RwLock<HashMap<String, AgentInfo>>,
}

/// On-disk seed format for [`InMemoryDirectory::from_json_file`].
#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    agents: HashMap<String, AgentInfo>,
    #[serde(default)]
    users: HashMap<String, AgentInfo>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `{"agents": {id: info}, "users": {id: info}}` from a JSON file.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::InvalidConfig(format!("cannot read seed file {}: {}", path.display(), e))
        })?;
        let seed: SeedFile = serde_json::from_str(&raw).map_err(|e| {
            AppError::InvalidConfig(format!("malformed seed file {}: {}", path.display(), e))
        })?;

        info!(
            "Loaded {} agents and {} users from {}",
            seed.agents.len(),
            seed.users.len(),
            path.display()
        );

        Ok(Self {
            agents: RwLock::new(seed.agents),
            users: RwLock::new(seed.users),
        })
    }

    /// Inserts or replaces a record.
    pub async fn upsert(&self, kind: AgentKind, id: impl Into<String>, info: AgentInfo) {
        self.table(kind).write().await.insert(id.into(), info);
    }

    pub async fn len(&self, kind: AgentKind) -> usize {
        self.table(kind).read().await.len()
    }

    fn table(&self, kind: AgentKind) -> &RwLock<HashMap<String, AgentInfo>> {
        match kind {
            AgentKind::Agent => &self.agents,
            AgentKind::User => &self.users,
        }
    }
}

#[async_trait]
impl AgentDirectory for InMemoryDirectory {
    async fn fetch(&self, kind: AgentKind, id: &str) -> Result<Option<AgentInfo>> {
        Ok(self.table(kind).read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_respects_kind() {
        let directory = InMemoryDirectory::new();
        directory
            .upsert(AgentKind::Agent, "42", AgentInfo::new("bot", "an agent"))
            .await;

        let agent = directory.fetch(AgentKind::Agent, "42").await.unwrap();
        let user = directory.fetch(AgentKind::User, "42").await.unwrap();

        assert_eq!(agent.unwrap().username, "bot");
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("agent_memo_seed_{}.json", std::process::id()));
        tokio::fs::write(
            &path,
            r#"{"agents": {"a1": {"username": "ava", "summary": "explorer"}},
                "users": {"u1": {"username": "sam", "summary": "builder"}}}"#,
        )
        .await
        .unwrap();

        let directory = InMemoryDirectory::from_json_file(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(directory.len(AgentKind::Agent).await, 1);
        assert_eq!(directory.len(AgentKind::User).await, 1);
        let user = directory.fetch(AgentKind::User, "u1").await.unwrap().unwrap();
        assert_eq!(user.summary, "builder");
    }

    #[tokio::test]
    async fn test_from_missing_file_is_config_error() {
        let result = InMemoryDirectory::from_json_file("/definitely/not/here.json").await;
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }
}
