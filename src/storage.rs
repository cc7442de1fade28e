use crate::errors::ClientError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{error, warn};

pub const FAVORITES_KEY: &str = "jokeFavorites";
pub const AUTO_SPEAK_KEY: &str = "autoSpeak";

/// Durable string key/value store. Reads fail open: anything unreadable is `None`.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;
}

pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = load_entries(&self.path).await;
        match entries.get(key)? {
            Value::String(value) => Some(value.clone()),
            other => Some(other.to_string()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = load_entries(&self.path).await;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        persist_entries(&self.path, &entries).await
    }
}

async fn load_entries(path: &Path) -> Map<String, Value> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse storage file: {err}");
                Map::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
        Err(err) => {
            error!("failed to read storage file: {err}");
            Map::new()
        }
    }
}

async fn persist_entries(path: &Path, entries: &Map<String, Value>) -> Result<(), ClientError> {
    let payload = serde_json::to_vec_pretty(entries).map_err(ClientError::storage)?;
    fs::write(path, payload).await?;
    Ok(())
}

#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub async fn auto_speak_enabled(storage: &dyn Storage) -> bool {
    match storage.get(AUTO_SPEAK_KEY).await.as_deref() {
        Some("true") => true,
        Some("false") | None => false,
        Some(other) => {
            warn!("ignoring unexpected {AUTO_SPEAK_KEY} value {other:?}");
            false
        }
    }
}
