//! Local key-value cache implementations.

use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use tokio::sync::RwLock;

use crate::ports::LocalCache;

/// Process-local cache. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .wrap_err_with(|| format!("Failed to create cache directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl LocalCache for FileCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).wrap_err_with(|| format!("Failed to read cache key {}", key)),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, value)
            .await
            .wrap_err_with(|| format!("Failed to write cache key {}", key))?;
        tokio::fs::rename(&staging, &path)
            .await
            .wrap_err_with(|| format!("Failed to replace cache key {}", key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_cache_overwrites_whole_value() {
        let cache = MemoryCache::new();
        cache.set("bookings:u1", "[1]".to_string()).await.unwrap();
        cache.set("bookings:u1", "[2]".to_string()).await.unwrap();
        assert_eq!(cache.get("bookings:u1").await.unwrap().as_deref(), Some("[2]"));
        assert_eq!(cache.get("bookings:u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::open(dir.path()).await.unwrap();
        cache.set("availability:anna", "{}".to_string()).await.unwrap();

        let reopened = FileCache::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get("availability:anna").await.unwrap().as_deref(), Some("{}"));
        assert_eq!(reopened.get("availability:jonas").await.unwrap(), None);
    }
}
