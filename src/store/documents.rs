use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use crate::error::StoreError;
use crate::store::{Document, DocumentStore, Fields, validate_key};

/// One JSON file per document, laid out as `<root>/<collection>/<id>.json`.
#[derive(Clone, Debug)]
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(validate_key(collection)?))
    }

    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty() || id.contains('/') || id.starts_with('.') {
            return Err(StoreError::InvalidPath(id.to_string()));
        }
        Ok(self.collection_dir(collection)?.join(format!("{id}.json")))
    }

    async fn read_fields(&self, path: &PathBuf) -> Result<Option<Fields>, StoreError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Object(fields) => Ok(Some(fields)),
            _ => Err(StoreError::Backend(format!(
                "document {} is not a JSON object",
                path.display()
            ))),
        }
    }

    async fn write_fields(&self, path: &PathBuf, fields: &Fields) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(fields)?;
        fs::write(path, payload).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let path = self.document_path(collection, &id)?;
        self.write_fields(&path, &fields).await?;
        tracing::debug!(collection, id = %id, "document created");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let path = self.document_path(collection, id)?;
        Ok(self.read_fields(&path).await?.map(|fields| Document {
            id: id.to_string(),
            fields,
        }))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let dir_path = self.collection_dir(collection)?;
        let mut entries: Vec<PathBuf> = Vec::new();
        let mut dir = match fs::read_dir(&dir_path).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                entries.push(path);
            }
        }
        entries.sort();

        let mut documents = Vec::with_capacity(entries.len());
        for path in entries {
            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()).map(str::to_string) else {
                continue;
            };
            match self.read_fields(&path).await {
                Ok(Some(fields)) => documents.push(Document { id, fields }),
                Ok(None) => {}
                Err(StoreError::Io(err)) => return Err(StoreError::Io(err)),
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "skipping unreadable document"),
            }
        }
        Ok(documents)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields, merge: bool) -> Result<(), StoreError> {
        let path = self.document_path(collection, id)?;
        let fields = if merge {
            let mut existing = self.read_fields(&path).await?.unwrap_or_default();
            existing.extend(fields);
            existing
        } else {
            fields
        };
        self.write_fields(&path, &fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let path = self.document_path(collection, id)?;
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
