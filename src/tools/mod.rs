pub mod create_story;
pub mod list_stories;
pub mod profile;
pub mod save_story;
pub mod session;
pub mod story_options;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use serde_json::Value;

use crate::error::{DeleteError, GenerationError, ListError, PersistError, ProfileError};
use crate::story::{Language, StoryRecord};

pub use create_story::{create_story, discard_story};
pub use list_stories::{DeleteStoryRequest, GetStoryRequest, ListStoriesRequest, delete_story, get_story, list_stories};
pub use profile::{ProfileRequest, get_profile, register_profile, update_profile};
pub use save_story::save_story;
pub use session::{SignInRequest, sign_in, sign_out, whoami};
pub use story_options::story_options;

/// A stored story as returned to clients, with its category label resolved.
#[derive(Serialize)]
pub struct StoryView {
    #[serde(flatten)]
    pub record: StoryRecord,
    #[serde(rename = "storyTypeLabel")]
    pub story_type_label: String,
}

impl StoryView {
    pub fn new(record: StoryRecord, language: Language) -> Self {
        let story_type_label = record.type_label(language).to_string();
        Self {
            record,
            story_type_label,
        }
    }
}

pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string(value).map_err(|err| {
        McpError::internal_error(
            "serialize tool response failed",
            Some(Value::String(err.to_string())),
        )
    })?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

pub(crate) fn not_signed_in() -> McpError {
    McpError::invalid_request("user is not signed in", None)
}

impl From<GenerationError> for McpError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Validation(_) => McpError::invalid_params(err.to_string(), None),
            _ => McpError::internal_error(err.to_string(), None),
        }
    }
}

impl From<PersistError> for McpError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::Unauthenticated => not_signed_in(),
            PersistError::InvalidImageUrl(_) => McpError::invalid_params(err.to_string(), None),
            _ => McpError::internal_error(err.to_string(), None),
        }
    }
}

impl From<ListError> for McpError {
    fn from(err: ListError) -> Self {
        match err {
            ListError::Unauthenticated => not_signed_in(),
            ListError::FetchFailed(_) => McpError::internal_error(err.to_string(), None),
        }
    }
}

impl From<DeleteError> for McpError {
    fn from(err: DeleteError) -> Self {
        match err {
            DeleteError::Unauthenticated => not_signed_in(),
            DeleteError::DeleteFailed(_) => McpError::internal_error(err.to_string(), None),
        }
    }
}

impl From<ProfileError> for McpError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Unauthenticated => not_signed_in(),
            ProfileError::Validation(_) => McpError::invalid_params(err.to_string(), None),
            ProfileError::Store(_) => McpError::internal_error(err.to_string(), None),
        }
    }
}
