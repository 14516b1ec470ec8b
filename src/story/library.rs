use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::auth::Identity;
use crate::error::{DeleteError, ListError};
use crate::store::{Document, DocumentStore};
use crate::story::model::{Language, StoryRecord};

/// Read and delete access to an identity's stored stories.
pub struct StoryLibrary {
    documents: Arc<dyn DocumentStore>,
}

impl StoryLibrary {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    /// Newest first. An identity without stories gets an empty list.
    pub async fn list(&self, identity: Option<&Identity>) -> Result<Vec<StoryRecord>, ListError> {
        let identity = identity.ok_or(ListError::Unauthenticated)?;
        let documents = self
            .documents
            .list(&identity.stories_collection())
            .await
            .map_err(|err| ListError::FetchFailed(err.to_string()))?;

        let mut records: Vec<StoryRecord> = documents.into_iter().filter_map(decode_record).collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
        tracing::debug!(identity = %identity, count = records.len(), "stories listed");
        Ok(records)
    }

    pub async fn get(&self, identity: Option<&Identity>, record_id: &str) -> Result<Option<StoryRecord>, ListError> {
        let identity = identity.ok_or(ListError::Unauthenticated)?;
        let document = self
            .documents
            .get(&identity.stories_collection(), record_id)
            .await
            .map_err(|err| ListError::FetchFailed(err.to_string()))?;
        Ok(document.and_then(decode_record))
    }

    /// Callers refetch with [`StoryLibrary::list`] afterwards.
    pub async fn delete(&self, identity: Option<&Identity>, record_id: &str) -> Result<(), DeleteError> {
        let identity = identity.ok_or(DeleteError::Unauthenticated)?;
        self.documents
            .delete(&identity.stories_collection(), record_id)
            .await
            .map_err(|err| DeleteError::DeleteFailed(err.to_string()))?;
        tracing::info!(identity = %identity, id = record_id, "story deleted");
        Ok(())
    }
}

fn decode_record(document: Document) -> Option<StoryRecord> {
    match serde_json::from_value::<StoryRecord>(Value::Object(document.fields)) {
        Ok(mut record) => {
            record.id = document.id;
            Some(record)
        }
        Err(err) => {
            tracing::warn!(id = %document.id, error = %err, "skipping malformed story");
            None
        }
    }
}

/// Groups by English display label.
pub fn group_by_type(records: &[StoryRecord]) -> BTreeMap<String, Vec<StoryRecord>> {
    group_by_type_in(records, Language::English)
}

/// Keys iterate in lexicographic order; each group keeps input order.
pub fn group_by_type_in(records: &[StoryRecord], language: Language) -> BTreeMap<String, Vec<StoryRecord>> {
    let mut groups: BTreeMap<String, Vec<StoryRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.type_label(language).to_string())
            .or_default()
            .push(record.clone());
    }
    groups
}
