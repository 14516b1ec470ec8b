use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::Serialize;

use crate::{
    story::{ArtStyle, Language, StoryLength, StoryTypeKey, TextModel},
    tools::json_result,
};

#[derive(Serialize)]
struct LocalizedOptions {
    language: &'static str,
    story_types: Vec<&'static str>,
    story_lengths: Vec<&'static str>,
    art_styles: Vec<&'static str>,
}

#[derive(Serialize)]
struct StoryOptions {
    languages: Vec<&'static str>,
    text_models: Vec<&'static str>,
    /// Values accepted by `create_story` for the enumerated fields.
    story_lengths: Vec<&'static str>,
    art_styles: Vec<&'static str>,
    localized: Vec<LocalizedOptions>,
}

fn build_options() -> StoryOptions {
    StoryOptions {
        languages: Language::ALL.iter().map(|language| language.label()).collect(),
        text_models: TextModel::ALL.iter().map(|model| model.as_str()).collect(),
        story_lengths: StoryLength::ALL
            .iter()
            .map(|length| length.label(Language::English))
            .collect(),
        art_styles: ArtStyle::ALL
            .iter()
            .map(|style| style.label(Language::English))
            .collect(),
        localized: Language::ALL
            .iter()
            .map(|&language| LocalizedOptions {
                language: language.label(),
                story_types: StoryTypeKey::KNOWN.iter().map(|key| key.label(language)).collect(),
                story_lengths: StoryLength::ALL.iter().map(|length| length.label(language)).collect(),
                art_styles: ArtStyle::ALL.iter().map(|style| style.label(language)).collect(),
            })
            .collect(),
    }
}

pub async fn story_options() -> Result<CallToolResult, McpError> {
    json_result(&build_options())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_list_every_choice() {
        let value = serde_json::to_value(build_options()).unwrap();
        assert_eq!(value["text_models"][0], "gpt-4o");
        assert_eq!(value["text_models"].as_array().unwrap().len(), 6);
        assert_eq!(value["art_styles"][2], "Oil Painting");
        assert_eq!(value["localized"][0]["language"], "Turkish");
        assert_eq!(value["localized"][0]["story_types"][3], "Korku");
        assert_eq!(value["localized"][1]["story_types"][2], "Science Fiction");
    }
}
