//! Agents Module
//!
//! Agent and user metadata with memoized lookups.

mod directory;
mod service;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use directory::{AgentDirectory, InMemoryDirectory};
pub use service::{AgentCacheStats, AgentInfoService};

// == Agent Info ==
/// Display name and running summary of an agent or a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub username: String,
    pub summary: String,
}

impl AgentInfo {
    pub fn new(username: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            summary: summary.into(),
        }
    }
}

// == Agent Kind ==
/// Which table an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Agent,
    User,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Agent => f.write_str("agent"),
            AgentKind::User => f.write_str("user"),
        }
    }
}
