use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::JsonSchema,
};
use serde::Deserialize;

use crate::{mcp_server::StoryServices, session::StorySession, tools::json_result};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProfileRequest {
    #[schemars(description = "Display name")]
    pub name: String,
    #[schemars(description = "Email address")]
    pub email: String,
}

pub async fn register_profile(
    services: &StoryServices,
    session: &StorySession,
    Parameters(request): Parameters<ProfileRequest>,
) -> Result<CallToolResult, McpError> {
    let identity = session.auth.current();
    let profile = services
        .profiles
        .register(identity.as_ref(), &request.name, &request.email)
        .await?;
    json_result(&profile)
}

pub async fn get_profile(services: &StoryServices, session: &StorySession) -> Result<CallToolResult, McpError> {
    let identity = session.auth.current();
    let profile = services
        .profiles
        .fetch(identity.as_ref())
        .await?
        .ok_or_else(|| McpError::resource_not_found("profile not found; call register_profile first", None))?;
    json_result(&profile)
}

pub async fn update_profile(
    services: &StoryServices,
    session: &StorySession,
    Parameters(request): Parameters<ProfileRequest>,
) -> Result<CallToolResult, McpError> {
    let identity = session.auth.current();
    let profile = services
        .profiles
        .update(identity.as_ref(), &request.name, &request.email)
        .await?;
    json_result(&profile)
}
