use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo},
    service::RequestContext,
    tool, tool_handler, tool_router,
};

use crate::auth::Identity;
use crate::profile::ProfileService;
use crate::session::StorySession;
use crate::story::{Language, StoryLibrary, StoryOrchestrator, StoryRequest};
use crate::tools::{
    DeleteStoryRequest, GetStoryRequest, ListStoriesRequest, ProfileRequest, SignInRequest,
};

/// Process-wide services shared by every MCP session.
pub struct StoryServices {
    pub orchestrator: StoryOrchestrator,
    pub library: StoryLibrary,
    pub profiles: ProfileService,
    pub display_language: Language,
    /// Identity every new session starts signed in as, if any.
    pub default_identity: Option<Identity>,
}

#[derive(Clone)]
pub struct StoryServer {
    tool_router: ToolRouter<Self>,
    services: Arc<StoryServices>,
    session: Arc<StorySession>,
}

impl StoryServer {
    pub fn new(services: Arc<StoryServices>) -> Self {
        let session = Arc::new(StorySession::new(services.default_identity.clone()));
        Self {
            tool_router: Self::tool_router(),
            services,
            session,
        }
    }
}

#[tool_router]
impl StoryServer {
    #[tool(description = "List the languages, text models, story lengths, art styles and story types accepted by create_story")]
    async fn story_options(&self) -> Result<CallToolResult, McpError> {
        crate::tools::story_options().await
    }

    #[tool(
        description = "Sign this session in as the given user; stories and profiles are scoped to that user. The user id is trusted as given: the server expects the caller to have authenticated the user already"
    )]
    async fn sign_in(
        &self,
        Parameters(request): Parameters<SignInRequest>,
    ) -> Result<CallToolResult, McpError> {
        crate::tools::sign_in(&self.session, Parameters(request)).await
    }

    #[tool(description = "Sign this session out and drop any unsaved story")]
    async fn sign_out(&self) -> Result<CallToolResult, McpError> {
        crate::tools::sign_out(&self.session).await
    }

    #[tool(description = "Show which user this session is signed in as")]
    async fn whoami(&self) -> Result<CallToolResult, McpError> {
        crate::tools::whoami(&self.session).await
    }

    #[tool(
        description = "Generate a story and a matching illustration. Warn the user this can take a while. The result is a draft: show the image with ![](url) and ask whether to save it with save_story"
    )]
    async fn create_story(
        &self,
        Parameters(request): Parameters<StoryRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        crate::tools::create_story(&self.services, &self.session, Parameters(request), context.ct).await
    }

    #[tool(description = "Save the current draft story: the image is re-hosted and the story is added to the user's library")]
    async fn save_story(&self, context: RequestContext<RoleServer>) -> Result<CallToolResult, McpError> {
        crate::tools::save_story(&self.services, &self.session, context.ct).await
    }

    #[tool(description = "Drop the current draft story without saving it")]
    async fn discard_story(&self) -> Result<CallToolResult, McpError> {
        crate::tools::discard_story(&self.session).await
    }

    #[tool(description = "List the signed-in user's saved stories grouped by story type, newest first")]
    async fn list_stories(
        &self,
        Parameters(request): Parameters<ListStoriesRequest>,
    ) -> Result<CallToolResult, McpError> {
        crate::tools::list_stories(&self.services, &self.session, Parameters(request)).await
    }

    #[tool(description = "Show one saved story in full. Use ![](imageUrl) to display its illustration")]
    async fn get_story(
        &self,
        Parameters(request): Parameters<GetStoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        crate::tools::get_story(&self.services, &self.session, Parameters(request)).await
    }

    #[tool(description = "Delete a saved story and return the refreshed library")]
    async fn delete_story(
        &self,
        Parameters(request): Parameters<DeleteStoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        crate::tools::delete_story(&self.services, &self.session, Parameters(request)).await
    }

    #[tool(description = "Create the signed-in user's profile")]
    async fn register_profile(
        &self,
        Parameters(request): Parameters<ProfileRequest>,
    ) -> Result<CallToolResult, McpError> {
        crate::tools::register_profile(&self.services, &self.session, Parameters(request)).await
    }

    #[tool(description = "Show the signed-in user's profile")]
    async fn get_profile(&self) -> Result<CallToolResult, McpError> {
        crate::tools::get_profile(&self.services, &self.session).await
    }

    #[tool(description = "Change the signed-in user's name and email")]
    async fn update_profile(
        &self,
        Parameters(request): Parameters<ProfileRequest>,
    ) -> Result<CallToolResult, McpError> {
        crate::tools::update_profile(&self.services, &self.session, Parameters(request)).await
    }
}

#[tool_handler]
impl ServerHandler for StoryServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Story studio. Call story_options to see the accepted values, create_story to draft a story, then save_story to keep it."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
