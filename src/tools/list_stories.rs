use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::JsonSchema,
};
use serde::{Deserialize, Serialize};

use crate::{
    mcp_server::StoryServices,
    session::StorySession,
    story::{Language, StoryRecord, group_by_type_in},
    tools::{StoryView, json_result},
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListStoriesRequest {
    #[schemars(description = "Language of the category labels: Turkish or English. Defaults to the server setting")]
    pub language: Option<Language>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetStoryRequest {
    #[schemars(description = "Story id")]
    pub id: String,
    pub language: Option<Language>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteStoryRequest {
    #[schemars(description = "Story id")]
    pub id: String,
    pub language: Option<Language>,
}

#[derive(Serialize)]
struct StoryGroup {
    label: String,
    stories: Vec<StoryView>,
}

#[derive(Serialize)]
struct ListStoriesResponse {
    /// Distinguishes "no stories yet" from a failed fetch, which is an error.
    empty: bool,
    total: usize,
    groups: Vec<StoryGroup>,
}

fn build_listing(records: Vec<StoryRecord>, language: Language) -> ListStoriesResponse {
    let total = records.len();
    let groups = group_by_type_in(&records, language)
        .into_iter()
        .map(|(label, records)| StoryGroup {
            label,
            stories: records
                .into_iter()
                .map(|record| StoryView::new(record, language))
                .collect(),
        })
        .collect();
    ListStoriesResponse {
        empty: total == 0,
        total,
        groups,
    }
}

async fn fetch_listing(
    services: &StoryServices,
    session: &StorySession,
    language: Language,
) -> Result<ListStoriesResponse, McpError> {
    let identity = session.auth.current();
    let records = services.library.list(identity.as_ref()).await?;
    Ok(build_listing(records, language))
}

pub async fn list_stories(
    services: &StoryServices,
    session: &StorySession,
    Parameters(request): Parameters<ListStoriesRequest>,
) -> Result<CallToolResult, McpError> {
    let language = request.language.unwrap_or(services.display_language);
    json_result(&fetch_listing(services, session, language).await?)
}

pub async fn get_story(
    services: &StoryServices,
    session: &StorySession,
    Parameters(request): Parameters<GetStoryRequest>,
) -> Result<CallToolResult, McpError> {
    let language = request.language.unwrap_or(services.display_language);
    let identity = session.auth.current();
    let record = services
        .library
        .get(identity.as_ref(), &request.id)
        .await?
        .ok_or_else(|| McpError::resource_not_found(format!("story {} not found", request.id), None))?;
    json_result(&StoryView::new(record, language))
}

/// Returns the refreshed listing after the delete.
pub async fn delete_story(
    services: &StoryServices,
    session: &StorySession,
    Parameters(request): Parameters<DeleteStoryRequest>,
) -> Result<CallToolResult, McpError> {
    let language = request.language.unwrap_or(services.display_language);
    let identity = session.auth.current();
    services.library.delete(identity.as_ref(), &request.id).await?;
    json_result(&fetch_listing(services, session, language).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::StoryTypeKey;

    fn record(id: &str, story_type: StoryTypeKey) -> StoryRecord {
        StoryRecord {
            id: id.into(),
            story_type,
            ..StoryRecord::default()
        }
    }

    #[test]
    fn empty_listing_is_flagged() {
        let listing = build_listing(Vec::new(), Language::English);
        assert!(listing.empty);
        assert!(listing.groups.is_empty());
    }

    #[test]
    fn listing_groups_follow_label_order() {
        let listing = build_listing(
            vec![
                record("a", StoryTypeKey::Romantic),
                record("b", StoryTypeKey::Adventure),
                record("c", StoryTypeKey::Romantic),
            ],
            Language::English,
        );
        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["total"], 3);
        assert_eq!(value["groups"][0]["label"], "Adventure");
        assert_eq!(value["groups"][1]["label"], "Romantic");
        assert_eq!(value["groups"][1]["stories"][0]["id"], "a");
        assert_eq!(value["groups"][1]["stories"][1]["id"], "c");
    }
}
