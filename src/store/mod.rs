//! Object and document stores backing persisted stories.

pub mod documents;
pub mod storage;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;

pub use documents::LocalDocumentStore;
pub use storage::LocalFileStorage;

pub type Fields = Map<String, Value>;

/// Blob storage that hands out durable URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError>;

    /// `None` when nothing is stored at `path`.
    async fn download_url(&self, path: &str) -> Result<Option<String>, StoreError>;

    async fn delete(&self, path: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Collection-scoped JSON documents. Collections are slash-separated paths
/// such as `users/<uid>/stories`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores `fields` under a fresh id and returns it.
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Writes `fields` at `id`. With `merge` the existing fields not named in
    /// `fields` are kept; without it the document is replaced.
    async fn update(&self, collection: &str, id: &str, fields: Fields, merge: bool) -> Result<(), StoreError>;

    /// Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

pub fn get_extension_from_mime_type(mime_type: &str) -> &str {
    match mime_type.to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}

/// Rejects empty, absolute and parent-relative segments.
pub(crate) fn validate_key(key: &str) -> Result<&str, StoreError> {
    let trimmed = key.trim_matches('/');
    if trimmed.is_empty()
        || trimmed
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\'))
    {
        return Err(StoreError::InvalidPath(key.to_string()));
    }
    Ok(trimmed)
}
