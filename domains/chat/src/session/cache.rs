//! Local profile cache
//!
//! Keeps the captured profile across reloads so a returning visitor is not
//! asked for their details again.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::domain::entities::UserProfile;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Profile cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Profile cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Profile cache unavailable: {0}")]
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait ProfileCache: Send + Sync {
    /// Previously stored profile, if any
    async fn load(&self) -> Result<Option<UserProfile>, CacheError>;

    async fn store(&self, profile: &UserProfile) -> Result<(), CacheError>;
}

/// Profile cache backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileProfileCache {
    path: PathBuf,
}

impl FileProfileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ProfileCache for FileProfileCache {
    async fn load(&self) -> Result<Option<UserProfile>, CacheError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let profile: UserProfile = serde_json::from_slice(&raw)?;
        Ok(Some(profile))
    }

    async fn store(&self, profile: &UserProfile) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let raw = serde_json::to_vec_pretty(profile)?;
        tokio::fs::write(&self.path, raw).await?;
        tracing::debug!(path = %self.path.display(), "Stored profile cache");
        Ok(())
    }
}

/// Process-lifetime profile cache
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileCache {
    profile: Arc<Mutex<Option<UserProfile>>>,
}

impl MemoryProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-populated with `profile`
    pub fn with_profile(profile: UserProfile) -> Self {
        Self {
            profile: Arc::new(Mutex::new(Some(profile))),
        }
    }
}

#[async_trait::async_trait]
impl ProfileCache for MemoryProfileCache {
    async fn load(&self) -> Result<Option<UserProfile>, CacheError> {
        self.profile
            .lock()
            .map(|guard| guard.clone())
            .map_err(|e| CacheError::Unavailable(e.to_string()))
    }

    async fn store(&self, profile: &UserProfile) -> Result<(), CacheError> {
        let mut guard = self
            .profile
            .lock()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        *guard = Some(profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> UserProfile {
        UserProfile::captured("Ada", "Lovelace", "ada@example.com", None)
    }

    #[tokio::test]
    async fn test_file_cache_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileProfileCache::new(dir.path().join("profile.json"));

        assert_eq!(cache.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_cache_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("profile.json");

        FileProfileCache::new(&path).store(&ada()).await.unwrap();

        let reloaded = FileProfileCache::new(&path).load().await.unwrap();
        assert_eq!(reloaded, Some(ada()));
    }

    #[tokio::test]
    async fn test_file_cache_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileProfileCache::new(&path).load().await;
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_memory_cache_store_and_load() {
        let cache = MemoryProfileCache::new();
        assert_eq!(cache.load().await.unwrap(), None);

        cache.store(&ada()).await.unwrap();
        assert_eq!(cache.load().await.unwrap(), Some(ada()));
    }
}
