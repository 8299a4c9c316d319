use std::path::{Path, PathBuf};

use crate::{config, types::Credential, utils};

/// Client-side holder of the session credential.
///
/// The credential is persisted as JSON so separate CLI invocations share one
/// login.
pub struct SessionManager {
    credential: Credential,
}

impl SessionManager {
    pub fn new(credential: Credential) -> Self {
        SessionManager { credential }
    }

    pub async fn load() -> Result<Self, String> {
        Self::load_from(&Self::session_path()).await
    }

    pub async fn load_from(path: &Path) -> Result<Self, String> {
        let content = async_fs::read_to_string(path)
            .await
            .map_err(|e| e.to_string())?;
        let credential: Credential = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { credential })
    }

    /// The stored token, or `None` when there is no session or it has expired.
    pub async fn load_valid_token() -> Option<String> {
        match Self::load().await {
            Ok(session) if !session.is_expired() => Some(session.credential.token),
            _ => None,
        }
    }

    pub async fn persist(&self) -> Result<(), String> {
        self.persist_to(&Self::session_path()).await
    }

    pub async fn persist_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.credential).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    /// Removes the persisted session. Clearing an absent session succeeds.
    pub async fn clear() -> Result<(), String> {
        Self::clear_at(&Self::session_path()).await
    }

    pub async fn clear_at(path: &Path) -> Result<(), String> {
        match async_fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    }

    pub fn is_expired(&self) -> bool {
        utils::now_secs()
            >= self
                .credential
                .obtained_at
                .saturating_add(self.credential.expires_in)
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    fn session_path() -> PathBuf {
        config::data_dir().join("session.json")
    }
}
