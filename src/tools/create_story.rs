use rmcp::{ErrorData as McpError, handler::server::wrapper::Parameters, model::CallToolResult};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::{
    mcp_server::StoryServices,
    session::{Draft, StorySession},
    story::StoryRequest,
    tools::json_result,
};

#[derive(Serialize)]
struct CreateStoryResponse {
    text: String,
    /// Provider-hosted preview; only `save_story` makes it permanent.
    image_url: String,
    text_model: &'static str,
    message: &'static str,
}

pub async fn create_story(
    services: &StoryServices,
    session: &StorySession,
    Parameters(request): Parameters<StoryRequest>,
    cancel: CancellationToken,
) -> Result<CallToolResult, McpError> {
    request
        .validate()
        .map_err(|err| McpError::invalid_params(format!("Please fill in all the fields: {err}"), None))?;

    let story = services.orchestrator.generate(&request, &cancel).await?;
    let response = CreateStoryResponse {
        text: story.generated_text.clone(),
        image_url: story.generated_image_url.clone(),
        text_model: request.text_model.as_str(),
        message: "Story generated. Call save_story to keep it, or create_story again to recreate it.",
    };
    session.set_draft(Draft { request, story }).await;
    json_result(&response)
}

#[derive(Serialize)]
struct DiscardResponse {
    discarded: bool,
}

pub async fn discard_story(session: &StorySession) -> Result<CallToolResult, McpError> {
    let discarded = session.take_draft().await.is_some();
    json_result(&DiscardResponse { discarded })
}
