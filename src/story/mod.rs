//! Story generation, persistence and listing.

pub mod library;
pub mod model;
pub mod orchestrator;
pub mod prompt;

pub use library::{StoryLibrary, group_by_type, group_by_type_in};
pub use model::{
    ArtStyle, GeneratedStory, Language, StoryLength, StoryRecord, StoryRequest, StoryTypeKey, TextModel,
};
pub use orchestrator::{OrchestratorConfig, StoryOrchestrator};
