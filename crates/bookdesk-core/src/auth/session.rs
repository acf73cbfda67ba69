use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::LoginResponse;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub email: String,
    #[serde(default)]
    pub admin_user: Option<serde_json::Value>,
    #[serde(default)]
    pub profile: Option<serde_json::Value>,
    #[serde(default)]
    pub is_author_login: bool,
    /// Whether the admin asked to stay signed in across restarts
    #[serde(default)]
    pub remember_me: bool,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn from_login(email: &str, response: LoginResponse, remember_me: bool) -> Self {
        Self {
            token: response.token,
            email: email.to_string(),
            admin_user: response.admin_user,
            profile: response.profile,
            is_author_login: response.is_author_login,
            remember_me,
            created_at: Utc::now(),
        }
    }

    /// Name to greet the admin with: the profile/admin name if present, else the login email.
    pub fn display_name(&self) -> String {
        [&self.admin_user, &self.profile]
            .into_iter()
            .flatten()
            .find_map(|v| v.get("name").and_then(|n| n.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| self.email.clone())
    }
}

/// Durable storage for a remembered session.
///
/// Sessions without "remember me" never touch disk; they live only in the
/// in-memory auth state and end with the process.
#[derive(Debug, Clone)]
pub struct Session {
    cache_dir: PathBuf,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Load a remembered session from disk
    pub fn load(&self) -> Result<Option<SessionData>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(data))
    }

    /// Persist the session if it asked to be remembered, otherwise make sure
    /// no earlier durable copy outlives it.
    pub fn store(&self, data: &SessionData) -> Result<()> {
        if !data.remember_me {
            return self.clear();
        }
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(path, contents).context("Failed to write session file")?;
        Ok(())
    }

    /// Remove any persisted session
    pub fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}
