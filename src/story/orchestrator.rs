use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::{GenerationError, PersistError, ProviderError};
use crate::fetch::{ImageFetcher, validate_http_url};
use crate::image_processing::{self, JPEG_MIME_TYPE};
use crate::openai::{ChatCompletionRequest, ChatMessage, DEFAULT_IMAGE_MODEL, ImageGenerationRequest, LlmProvider};
use crate::store::{DocumentStore, Fields, ObjectStore, get_extension_from_mime_type};
use crate::story::model::{GeneratedStory, StoryRecord, StoryRequest};
use crate::story::prompt::{build_image_prompt, build_story_prompt};

pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub image_model: String,
    /// Upper bound for each LLM call.
    pub llm_timeout: Duration,
    /// Upper bound for fetching the generated image during a save.
    pub download_timeout: Duration,
    /// Delete the uploaded image when the record could not be written.
    pub cleanup_orphaned_uploads: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            llm_timeout: DEFAULT_LLM_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            cleanup_orphaned_uploads: false,
        }
    }
}

enum StepFailure {
    Provider(ProviderError),
    TimedOut(Duration),
    Cancelled,
}

impl StepFailure {
    fn into_generation_error(self, stage: fn(String) -> GenerationError) -> GenerationError {
        match self {
            StepFailure::Provider(err) => stage(err.to_string()),
            StepFailure::TimedOut(limit) => stage(format!("timed out after {}s", limit.as_secs())),
            StepFailure::Cancelled => GenerationError::Cancelled,
        }
    }
}

/// Drives a story from request to generated draft, and from draft to stored
/// record. Every external call is made strictly after the previous one
/// resolved.
pub struct StoryOrchestrator {
    llm: Arc<dyn LlmProvider>,
    fetcher: Arc<dyn ImageFetcher>,
    objects: Arc<dyn ObjectStore>,
    documents: Arc<dyn DocumentStore>,
    config: OrchestratorConfig,
}

impl StoryOrchestrator {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        fetcher: Arc<dyn ImageFetcher>,
        objects: Arc<dyn ObjectStore>,
        documents: Arc<dyn DocumentStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            llm,
            fetcher,
            objects,
            documents,
            config,
        }
    }

    async fn llm_step<T, F>(&self, cancel: &CancellationToken, call: F) -> Result<T, StepFailure>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        let limit = self.config.llm_timeout;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StepFailure::Cancelled),
            result = tokio::time::timeout(limit, call) => match result {
                Ok(result) => result.map_err(StepFailure::Provider),
                Err(_) => Err(StepFailure::TimedOut(limit)),
            },
        }
    }

    #[tracing::instrument(skip_all, fields(model = request.text_model.as_str(), language = request.language.label()))]
    pub async fn generate(
        &self,
        request: &StoryRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedStory, GenerationError> {
        request.validate()?;

        tracing::info!("generating story text");
        let chat = ChatCompletionRequest {
            model: request.text_model.as_str().to_string(),
            messages: vec![ChatMessage::user(build_story_prompt(request))],
        };
        let response = self
            .llm_step(cancel, self.llm.chat_completion(&chat))
            .await
            .map_err(|failure| failure.into_generation_error(GenerationError::TextGenerationFailed))?;
        // Kept verbatim; whitespace only matters for the emptiness check.
        let generated_text = response
            .first_content()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| GenerationError::TextGenerationFailed("no response".to_string()))?
            .to_string();

        tracing::info!(chars = generated_text.len(), "generating story image");
        let image = ImageGenerationRequest::single(
            self.config.image_model.clone(),
            build_image_prompt(&generated_text, request.art_style, request.language),
        );
        let response = self
            .llm_step(cancel, self.llm.generate_image(&image))
            .await
            .map_err(|failure| failure.into_generation_error(GenerationError::ImageGenerationFailed))?;
        let generated_image_url = response
            .first_url()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| GenerationError::ImageGenerationFailed("no url".to_string()))?
            .to_string();

        tracing::info!("story generated");
        Ok(GeneratedStory {
            generated_text,
            generated_image_url,
        })
    }

    /// Re-hosts the generated image in the object store and writes the
    /// record. A retry starts over from the download; an image uploaded by a
    /// failed attempt stays behind unless cleanup is enabled.
    #[tracing::instrument(skip_all, fields(identity = identity.map(Identity::as_str).unwrap_or("-")))]
    pub async fn persist(
        &self,
        identity: Option<&Identity>,
        request: &StoryRequest,
        generated: &GeneratedStory,
        cancel: &CancellationToken,
    ) -> Result<StoryRecord, PersistError> {
        let identity = identity.ok_or(PersistError::Unauthenticated)?;
        let source_url =
            validate_http_url(&generated.generated_image_url).map_err(PersistError::InvalidImageUrl)?;

        tracing::info!(url = %source_url, "downloading generated image");
        let limit = self.config.download_timeout;
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PersistError::Cancelled),
            result = tokio::time::timeout(limit, self.fetcher.fetch(&source_url)) => match result {
                Ok(result) => result.map_err(|err| PersistError::DownloadFailed(err.to_string()))?,
                Err(_) => {
                    return Err(PersistError::DownloadFailed(format!(
                        "timed out after {}s",
                        limit.as_secs()
                    )));
                }
            },
        };
        let bytes = image_processing::to_jpeg(&fetched.bytes, fetched.mime_type.as_deref())
            .map_err(|err| PersistError::DownloadFailed(err.to_string()))?;

        ensure_not_cancelled(cancel)?;
        let path = format!(
            "{}/stories/{}.{}",
            identity.namespace(),
            Uuid::new_v4(),
            get_extension_from_mime_type(JPEG_MIME_TYPE)
        );
        tracing::info!(path = %path, size = bytes.len(), "uploading image");
        self.objects
            .upload(&path, &bytes, JPEG_MIME_TYPE)
            .await
            .map_err(|err| PersistError::UploadFailed(err.to_string()))?;

        let resolved = match ensure_not_cancelled(cancel) {
            Ok(()) => self
                .objects
                .download_url(&path)
                .await
                .map_err(|err| PersistError::UrlResolutionFailed(err.to_string()))
                .and_then(|url| {
                    url.ok_or_else(|| PersistError::UrlResolutionFailed("image not found".to_string()))
                }),
            Err(err) => Err(err),
        };
        let image_url = match resolved {
            Ok(url) => url,
            Err(err) => {
                self.discard_upload(&path).await;
                return Err(err);
            }
        };

        let mut record = StoryRecord::from_parts(request, generated.generated_text.clone(), image_url, Utc::now());
        let written = match (ensure_not_cancelled(cancel), record_fields(&record)) {
            (Err(err), _) => Err(err),
            (Ok(()), Err(err)) => Err(err),
            (Ok(()), Ok(fields)) => self
                .documents
                .create(&identity.stories_collection(), fields)
                .await
                .map_err(|err| PersistError::WriteFailed(err.to_string())),
        };
        match written {
            Ok(id) => {
                tracing::info!(id = %id, "story saved");
                record.id = id;
                Ok(record)
            }
            Err(err) => {
                self.discard_upload(&path).await;
                Err(err)
            }
        }
    }

    async fn discard_upload(&self, path: &str) {
        if !self.config.cleanup_orphaned_uploads {
            tracing::warn!(path, "leaving uploaded image without a record");
            return;
        }
        if let Err(err) = self.objects.delete(path).await {
            tracing::warn!(path, error = %err, "failed to remove orphaned image");
        }
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<(), PersistError> {
    if cancel.is_cancelled() {
        Err(PersistError::Cancelled)
    } else {
        Ok(())
    }
}

fn record_fields(record: &StoryRecord) -> Result<Fields, PersistError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(mut fields)) => {
            fields.remove("id");
            Ok(fields)
        }
        Ok(_) => Err(PersistError::WriteFailed("record is not an object".to_string())),
        Err(err) => Err(PersistError::WriteFailed(err.to_string())),
    }
}
