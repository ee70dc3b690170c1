use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::SessionError;

/// Persisted key/value strings backing "stay logged in"
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), SessionError>;

    async fn remove_many(&self, keys: &[&str]) -> Result<(), SessionError>;
}

/// Store kept in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, SessionError> {
        self.values
            .lock()
            .map_err(|_| SessionError::Store("session store lock poisoned".to_string()))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), SessionError> {
        let mut values = self.lock()?;
        for (key, value) in entries {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), SessionError> {
        let mut values = self.lock()?;
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}

/// Store backed by a small JSON object on disk
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                SessionError::Store(format!("{} is not a session file: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(SessionError::Store(e.to_string())),
        }
    }

    async fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if values.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(SessionError::Store(e.to_string())),
            };
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionError::Store(e.to_string()))?;
        }
        let text = serde_json::to_string_pretty(values)
            .map_err(|e| SessionError::Store(e.to_string()))?;
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), SessionError> {
        let mut values = self.read_all().await?;
        for (key, value) in entries {
            values.insert(key.to_string(), value.to_string());
        }
        self.write_all(&values).await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<(), SessionError> {
        let mut values = self.read_all().await?;
        for key in keys {
            values.remove(*key);
        }
        self.write_all(&values).await
    }
}
