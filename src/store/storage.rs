use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::StoreError;
use crate::store::{ObjectStore, validate_key};

/// Object store on the local filesystem, served over HTTP under `base_url`.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self { base_dir, base_url }
    }

    pub async fn put(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await?;
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.resolve_path(key)?;
        match fs::metadata(path).await {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub fn get_public_url(&self, key: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let key = key.trim_start_matches('/');
        format!("{base}/{key}")
    }

    pub fn resolve_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let normalized = validate_key(key)?;
        Ok(self.base_dir.join(Path::new(normalized)))
    }
}

#[async_trait]
impl ObjectStore for LocalFileStorage {
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        tracing::debug!(path, content_type, size = bytes.len(), "storing object");
        self.put(path, bytes).await
    }

    async fn download_url(&self, path: &str) -> Result<Option<String>, StoreError> {
        if self.exists(path).await? {
            Ok(Some(self.get_public_url(path)))
        } else {
            Ok(None)
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let path = self.resolve_path(path)?;
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
