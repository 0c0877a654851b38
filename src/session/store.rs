//! Durable storage of [`UserSession`] records, one per address.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::UserSession;
use crate::error::StoreError;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, address: &str) -> Result<Option<UserSession>, StoreError>;

    /// Replace the stored record for `session.address`.
    async fn save(&self, session: &UserSession) -> Result<(), StoreError>;
}

/// Process-local store. Records are lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, UserSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn insert(&self, session: UserSession) {
        self.sessions
            .write()
            .await
            .insert(session.address.clone(), session);
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, address: &str) -> Result<Option<UserSession>, StoreError> {
        Ok(self.sessions.read().await.get(address).cloned())
    }

    async fn save(&self, session: &UserSession) -> Result<(), StoreError> {
        self.insert(session.clone()).await;
        Ok(())
    }
}

/// One pretty-printed JSON file per address under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSessionStore {
    dir: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Alphanumerics are kept and every other byte becomes `_XX` hex, so
    /// distinct addresses never share a file.
    fn path_for(&self, address: &str) -> PathBuf {
        let mut name = String::with_capacity(address.len());
        for byte in address.bytes() {
            if byte.is_ascii_alphanumeric() {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("_{byte:02X}"));
            }
        }
        self.dir.join(format!("users.{name}.json"))
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn load(&self, address: &str) -> Result<Option<UserSession>, StoreError> {
        let path = self.path_for(address);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, session: &UserSession) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&session.address);
        let tmp = path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
