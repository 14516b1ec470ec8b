use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::JsonSchema,
};
use serde::{Deserialize, Serialize};

use crate::{auth::Identity, session::StorySession, tools::json_result};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SignInRequest {
    #[schemars(description = "Authenticated user id (letters, digits, '-' and '_')")]
    pub user_id: String,
}

#[derive(Serialize)]
struct SessionResponse {
    signed_in: bool,
    user_id: Option<String>,
}

fn session_state(session: &StorySession) -> SessionResponse {
    let current = session.auth.current();
    SessionResponse {
        signed_in: current.is_some(),
        user_id: current.map(|identity| identity.to_string()),
    }
}

pub async fn sign_in(
    session: &StorySession,
    Parameters(request): Parameters<SignInRequest>,
) -> Result<CallToolResult, McpError> {
    let identity = Identity::parse(&request.user_id)
        .ok_or_else(|| McpError::invalid_params("user_id may only contain letters, digits, '-' and '_'", None))?;
    // Switching identity also drops the session draft.
    session.auth.sign_in(identity);
    json_result(&session_state(session))
}

pub async fn sign_out(session: &StorySession) -> Result<CallToolResult, McpError> {
    session.auth.sign_out();
    json_result(&session_state(session))
}

pub async fn whoami(session: &StorySession) -> Result<CallToolResult, McpError> {
    json_result(&session_state(session))
}
