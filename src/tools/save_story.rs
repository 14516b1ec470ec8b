use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::{
    mcp_server::StoryServices,
    session::StorySession,
    tools::{StoryView, json_result, not_signed_in},
};

#[derive(Serialize)]
struct SaveStoryResponse {
    story: StoryView,
    message: &'static str,
}

/// Persists the session draft. The draft survives a failed save so the
/// caller can retry; a retry starts again from the image download.
pub async fn save_story(
    services: &StoryServices,
    session: &StorySession,
    cancel: CancellationToken,
) -> Result<CallToolResult, McpError> {
    let identity = session.auth.current().ok_or_else(not_signed_in)?;
    let _guard = session
        .begin_save()
        .ok_or_else(|| McpError::invalid_request("a save is already in progress", None))?;
    let (generation, draft) = session
        .checkout_draft()
        .await
        .ok_or_else(|| McpError::invalid_request("there is no generated story to save; call create_story first", None))?;

    let record = services
        .orchestrator
        .persist(Some(&identity), &draft.request, &draft.story, &cancel)
        .await?;
    // A story created while this save ran stays as the new draft.
    session.clear_draft_if(generation).await;

    json_result(&SaveStoryResponse {
        story: StoryView::new(record, draft.request.language),
        message: "Story saved.",
    })
}
