//! Error types for each boundary of the story service.

use thiserror::Error;

/// Fields of a story request that must be filled before generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing required fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

/// Failure talking to the LLM provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Failure inside an object or document store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid store path: {0}")]
    InvalidPath(String),

    #[error("{0}")]
    Backend(String),
}

/// Failure of the two-stage story generation.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("story text generation failed: {0}")]
    TextGenerationFailed(String),

    #[error("story image generation failed: {0}")]
    ImageGenerationFailed(String),

    #[error("story generation was cancelled")]
    Cancelled,
}

/// Failure while promoting a generated story to a stored record.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("user is not signed in")]
    Unauthenticated,

    #[error("invalid image url: {0}")]
    InvalidImageUrl(String),

    #[error("failed to download image: {0}")]
    DownloadFailed(String),

    #[error("failed to upload image: {0}")]
    UploadFailed(String),

    #[error("failed to resolve image url: {0}")]
    UrlResolutionFailed(String),

    #[error("failed to save story: {0}")]
    WriteFailed(String),

    #[error("saving the story was cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum ListError {
    #[error("user is not signed in")]
    Unauthenticated,

    #[error("failed to fetch stories: {0}")]
    FetchFailed(String),
}

#[derive(Error, Debug)]
pub enum DeleteError {
    #[error("user is not signed in")]
    Unauthenticated,

    #[error("failed to delete story: {0}")]
    DeleteFailed(String),
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("user is not signed in")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("profile store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
