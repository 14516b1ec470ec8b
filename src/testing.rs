//! Recording fakes for the orchestrator's collaborators.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use url::Url;

use crate::error::{ProviderError, StoreError};
use crate::fetch::{FetchedImage, ImageFetcher};
use crate::openai::{
    ChatChoice, ChatChoiceMessage, ChatCompletionRequest, ChatCompletionResponse, ImageData,
    ImageGenerationRequest, ImageGenerationResponse, LlmProvider,
};
use crate::image_processing::sample_png;
use crate::mcp_server::StoryServices;
use crate::profile::ProfileService;
use crate::store::{Document, DocumentStore, Fields, ObjectStore};
use crate::story::{Language, OrchestratorConfig, StoryLibrary, StoryOrchestrator};

/// Ordered names of every external call made, shared by all fakes.
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub(crate) fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Clone)]
pub(crate) enum Outcome<T> {
    Respond(T),
    Fail(String),
    Hang,
    /// Responds once the gate is notified.
    Gated(Arc<Notify>, T),
}

impl<T: Clone> Outcome<T> {
    async fn resolve(&self) -> Result<T, ProviderError> {
        match self {
            Outcome::Respond(value) => Ok(value.clone()),
            Outcome::Fail(message) => Err(ProviderError::Status {
                status: 500,
                message: message.clone(),
            }),
            Outcome::Hang => std::future::pending().await,
            Outcome::Gated(gate, value) => {
                gate.notified().await;
                Ok(value.clone())
            }
        }
    }
}

pub(crate) struct FakeLlm {
    log: CallLog,
    text: Outcome<Option<String>>,
    image: Outcome<Option<String>>,
    pub(crate) chat_requests: Mutex<Vec<ChatCompletionRequest>>,
    pub(crate) image_requests: Mutex<Vec<ImageGenerationRequest>>,
}

impl FakeLlm {
    pub(crate) fn new(log: CallLog) -> Self {
        Self {
            log,
            text: Outcome::Respond(Some("Once upon a time".into())),
            image: Outcome::Respond(Some("https://x/y.png".into())),
            chat_requests: Mutex::default(),
            image_requests: Mutex::default(),
        }
    }

    pub(crate) fn with_text(mut self, outcome: Outcome<Option<String>>) -> Self {
        self.text = outcome;
        self
    }

    pub(crate) fn with_image(mut self, outcome: Outcome<Option<String>>) -> Self {
        self.image = outcome;
        self
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        self.log.push("chat");
        self.chat_requests.lock().unwrap().push(request.clone());
        let content = self.text.resolve().await?;
        Ok(ChatCompletionResponse {
            choices: content
                .map(|content| ChatChoice {
                    message: ChatChoiceMessage {
                        role: Some("assistant".into()),
                        content: Some(content),
                    },
                })
                .into_iter()
                .collect(),
        })
    }

    async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, ProviderError> {
        self.log.push("image");
        self.image_requests.lock().unwrap().push(request.clone());
        let url = self.image.resolve().await?;
        Ok(ImageGenerationResponse {
            data: url.map(|url| ImageData { url: Some(url) }).into_iter().collect(),
        })
    }
}

pub(crate) struct FakeFetcher {
    log: CallLog,
    outcome: Outcome<Vec<u8>>,
}

impl FakeFetcher {
    pub(crate) fn new(log: CallLog, outcome: Outcome<Vec<u8>>) -> Self {
        Self { log, outcome }
    }
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedImage, ProviderError> {
        self.log.push(format!("download {url}"));
        let bytes = self.outcome.resolve().await?;
        Ok(FetchedImage {
            bytes,
            mime_type: Some("image/png".into()),
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeObjectStore {
    log: CallLog,
    pub(crate) fail_upload: bool,
    pub(crate) fail_resolve: bool,
    pub(crate) missing_url: bool,
    pub(crate) uploads: Mutex<Vec<(String, Vec<u8>, String)>>,
    pub(crate) deleted: Mutex<Vec<String>>,
}

impl FakeObjectStore {
    pub(crate) fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        self.log.push("upload");
        if self.fail_upload {
            return Err(StoreError::Backend("quota exceeded".into()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((path.to_string(), bytes.to_vec(), content_type.to_string()));
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<Option<String>, StoreError> {
        self.log.push("resolve");
        if self.fail_resolve {
            return Err(StoreError::Backend("unavailable".into()));
        }
        if self.missing_url {
            return Ok(None);
        }
        Ok(Some(format!("http://localhost:3000/objects/{path}")))
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.log.push("delete object");
        self.deleted.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

/// Documents kept in memory, ids assigned sequentially.
#[derive(Default)]
pub(crate) struct MemoryDocumentStore {
    log: CallLog,
    pub(crate) fail_writes: bool,
    pub(crate) fail_reads: bool,
    collections: Mutex<BTreeMap<String, Vec<Document>>>,
    next_id: Mutex<u64>,
}

impl MemoryDocumentStore {
    pub(crate) fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub(crate) fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self, failing: bool) -> Result<(), StoreError> {
        if failing {
            Err(StoreError::Backend("permission denied".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.log.push("write");
        self.check(self.fail_writes)?;
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("doc{next}")
        };
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields,
            });
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.log.push("get");
        self.check(self.fail_reads)?;
        Ok(self.documents(collection).into_iter().find(|doc| doc.id == id))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.log.push("list");
        self.check(self.fail_reads)?;
        Ok(self.documents(collection))
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields, merge: bool) -> Result<(), StoreError> {
        self.log.push("update");
        self.check(self.fail_writes)?;
        let mut collections = self.collections.lock().unwrap();
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|doc| doc.id == id) {
            Some(doc) if merge => doc.fields.extend(fields),
            Some(doc) => doc.fields = fields,
            None => docs.push(Document {
                id: id.to_string(),
                fields,
            }),
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.log.push("delete");
        self.check(self.fail_writes)?;
        if let Some(docs) = self.collections.lock().unwrap().get_mut(collection) {
            docs.retain(|doc| doc.id != id);
        }
        Ok(())
    }
}

/// Services wired to in-memory fakes, as the server would build them.
pub(crate) fn fake_services(log: &CallLog) -> (StoryServices, Arc<MemoryDocumentStore>) {
    fake_services_with(log, Outcome::Respond(sample_png()))
}

pub(crate) fn fake_services_with(
    log: &CallLog,
    download: Outcome<Vec<u8>>,
) -> (StoryServices, Arc<MemoryDocumentStore>) {
    let documents = Arc::new(MemoryDocumentStore::new(log.clone()));
    let orchestrator = StoryOrchestrator::new(
        Arc::new(FakeLlm::new(log.clone())),
        Arc::new(FakeFetcher::new(log.clone(), download)),
        Arc::new(FakeObjectStore::new(log.clone())),
        documents.clone(),
        OrchestratorConfig::default(),
    );
    let services = StoryServices {
        orchestrator,
        library: StoryLibrary::new(documents.clone()),
        profiles: ProfileService::new(documents.clone()),
        display_language: Language::English,
        default_identity: None,
    };
    (services, documents)
}
