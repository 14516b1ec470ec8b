use chrono::{DateTime, Utc};
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Language {
    Turkish,
    #[default]
    English,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Turkish, Language::English];

    pub fn label(self) -> &'static str {
        match self {
            Language::Turkish => "Turkish",
            Language::English => "English",
        }
    }

    /// Accepts the English name, the Turkish name or a two-letter code.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "turkish" | "türkçe" | "turkce" | "tr" => Some(Language::Turkish),
            "english" | "ingilizce" | "en" => Some(Language::English),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum StoryLength {
    #[default]
    Short,
    Medium,
    Long,
}

impl StoryLength {
    pub const ALL: [StoryLength; 3] = [StoryLength::Short, StoryLength::Medium, StoryLength::Long];

    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (StoryLength::Short, Language::English) => "Short",
            (StoryLength::Medium, Language::English) => "Medium",
            (StoryLength::Long, Language::English) => "Long",
            (StoryLength::Short, Language::Turkish) => "Kısa",
            (StoryLength::Medium, Language::Turkish) => "Orta",
            (StoryLength::Long, Language::Turkish) => "Uzun",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ArtStyle {
    #[default]
    Realistic,
    Cartoon,
    #[serde(rename = "Oil Painting")]
    OilPainting,
    Abstract,
}

impl ArtStyle {
    pub const ALL: [ArtStyle; 4] = [
        ArtStyle::Realistic,
        ArtStyle::Cartoon,
        ArtStyle::OilPainting,
        ArtStyle::Abstract,
    ];

    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (ArtStyle::Realistic, Language::English) => "Realistic",
            (ArtStyle::Cartoon, Language::English) => "Cartoon",
            (ArtStyle::OilPainting, Language::English) => "Oil Painting",
            (ArtStyle::Abstract, Language::English) => "Abstract",
            (ArtStyle::Realistic, Language::Turkish) => "Gerçekçi",
            (ArtStyle::Cartoon, Language::Turkish) => "Çizgi Film",
            (ArtStyle::OilPainting, Language::Turkish) => "Yağlı Boya",
            (ArtStyle::Abstract, Language::Turkish) => "Soyut",
        }
    }
}

/// Chat models offered for story text. The wire name is sent verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum TextModel {
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4-turbo")]
    Gpt4Turbo,
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "gpt-3.5-turbo-0125")]
    Gpt35Turbo0125,
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
}

impl TextModel {
    pub const ALL: [TextModel; 6] = [
        TextModel::Gpt4o,
        TextModel::Gpt4oMini,
        TextModel::Gpt4Turbo,
        TextModel::Gpt4,
        TextModel::Gpt35Turbo0125,
        TextModel::Gpt35Turbo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TextModel::Gpt4o => "gpt-4o",
            TextModel::Gpt4oMini => "gpt-4o-mini",
            TextModel::Gpt4Turbo => "gpt-4-turbo",
            TextModel::Gpt4 => "gpt-4",
            TextModel::Gpt35Turbo0125 => "gpt-3.5-turbo-0125",
            TextModel::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }
}

/// Stable storage key of a story category.
///
/// Requests carry the category as a display label in the user's language;
/// records store this key so they can be shown in any language later.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StoryTypeKey {
    Adventure,
    Romantic,
    ScienceFiction,
    Fear,
    #[default]
    Unknown,
}

impl StoryTypeKey {
    pub const KNOWN: [StoryTypeKey; 4] = [
        StoryTypeKey::Adventure,
        StoryTypeKey::Romantic,
        StoryTypeKey::ScienceFiction,
        StoryTypeKey::Fear,
    ];

    pub fn as_key(self) -> &'static str {
        match self {
            StoryTypeKey::Adventure => "adventureKey",
            StoryTypeKey::Romantic => "romanticKey",
            StoryTypeKey::ScienceFiction => "scienceFictionKey",
            StoryTypeKey::Fear => "fearKey",
            StoryTypeKey::Unknown => "unknown_type",
        }
    }

    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (StoryTypeKey::Adventure, Language::English) => "Adventure",
            (StoryTypeKey::Romantic, Language::English) => "Romantic",
            (StoryTypeKey::ScienceFiction, Language::English) => "Science Fiction",
            (StoryTypeKey::Fear, Language::English) => "Horror",
            (StoryTypeKey::Unknown, Language::English) => "Unknown",
            (StoryTypeKey::Adventure, Language::Turkish) => "Macera",
            (StoryTypeKey::Romantic, Language::Turkish) => "Romantik",
            (StoryTypeKey::ScienceFiction, Language::Turkish) => "Bilim Kurgu",
            (StoryTypeKey::Fear, Language::Turkish) => "Korku",
            (StoryTypeKey::Unknown, Language::Turkish) => "Bilinmeyen Tür",
        }
    }

    /// Maps a display label (either language) or a stored key to its key.
    /// Never fails: anything unrecognised is `Unknown`.
    pub fn from_display(raw: &str) -> Self {
        let needle = raw.trim().to_lowercase();
        Self::KNOWN
            .into_iter()
            .find(|key| {
                needle == key.as_key().to_lowercase()
                    || Language::ALL
                        .into_iter()
                        .any(|language| needle == key.label(language).to_lowercase())
            })
            .unwrap_or(StoryTypeKey::Unknown)
    }
}

impl Serialize for StoryTypeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_key())
    }
}

impl<'de> Deserialize<'de> for StoryTypeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(StoryTypeKey::from_display(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StoryRequest {
    #[schemars(description = "Story theme, e.g. 'Space Travel'")]
    pub theme: String,
    #[schemars(description = "Main character name, e.g. 'Luna'")]
    pub main_character_name: String,
    #[schemars(description = "Main character traits, e.g. 'Brave, curious, young wizard'")]
    pub main_character_traits: String,
    #[schemars(description = "Where the story takes place, e.g. 'Ancient Forest'")]
    pub setting: String,
    #[schemars(description = "A special event in the story")]
    pub special_event: String,
    #[schemars(description = "Story type label, e.g. Adventure, Romantic, Science Fiction, Horror")]
    pub story_type: String,
    pub story_length: StoryLength,
    pub language: Language,
    pub art_style: ArtStyle,
    pub text_model: TextModel,
}

impl StoryRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("theme", &self.theme),
            ("main_character_name", &self.main_character_name),
            ("main_character_traits", &self.main_character_traits),
            ("setting", &self.setting),
            ("special_event", &self.special_event),
        ];
        let missing: Vec<&'static str> = fields
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    pub fn story_type_key(&self) -> StoryTypeKey {
        StoryTypeKey::from_display(&self.story_type)
    }
}

/// Output of a successful generation, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedStory {
    pub generated_text: String,
    /// Provider-hosted, may expire.
    pub generated_image_url: String,
}

/// A story as stored in the document store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryRecord {
    pub id: String,
    pub theme: String,
    pub main_character_name: String,
    pub main_character_traits: String,
    pub setting: String,
    pub story_type: StoryTypeKey,
    pub special_event: String,
    pub story_length: StoryLength,
    pub language: Language,
    pub art_style: ArtStyle,
    pub text_model: TextModel,
    pub generated_story: String,
    pub timestamp: DateTime<Utc>,
    /// Durable URL inside the owned object store.
    pub image_url: String,
}

impl StoryRecord {
    pub fn from_parts(
        request: &StoryRequest,
        generated_text: String,
        image_url: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            theme: request.theme.clone(),
            main_character_name: request.main_character_name.clone(),
            main_character_traits: request.main_character_traits.clone(),
            setting: request.setting.clone(),
            story_type: request.story_type_key(),
            special_event: request.special_event.clone(),
            story_length: request.story_length,
            language: request.language,
            art_style: request.art_style,
            text_model: request.text_model,
            generated_story: generated_text,
            timestamp,
            image_url,
        }
    }

    pub fn type_label(&self, language: Language) -> &'static str {
        self.story_type.label(language)
    }
}

#[cfg(test)]
pub(crate) fn sample_request() -> StoryRequest {
    StoryRequest {
        theme: "Space Travel".into(),
        main_character_name: "Luna".into(),
        main_character_traits: "brave, curious".into(),
        setting: "Ancient Forest".into(),
        special_event: "Luna discovers a spell to control time".into(),
        story_type: "Adventure".into(),
        story_length: StoryLength::Short,
        language: Language::English,
        art_style: ArtStyle::Cartoon,
        text_model: TextModel::Gpt4o,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_label_maps_to_its_key() {
        for key in StoryTypeKey::KNOWN {
            for language in Language::ALL {
                assert_eq!(StoryTypeKey::from_display(key.label(language)), key);
            }
            assert_eq!(StoryTypeKey::from_display(key.as_key()), key);
        }
        assert_eq!(StoryTypeKey::from_display("  science fiction "), StoryTypeKey::ScienceFiction);
    }

    #[test]
    fn unrecognised_labels_fall_back_to_unknown() {
        assert_eq!(StoryTypeKey::from_display("Western"), StoryTypeKey::Unknown);
        assert_eq!(StoryTypeKey::from_display(""), StoryTypeKey::Unknown);
        assert_eq!(StoryTypeKey::Unknown.as_key(), "unknown_type");
    }

    #[test]
    fn validate_reports_blank_fields_in_order() {
        let mut request = sample_request();
        assert!(request.validate().is_ok());

        request.theme = String::new();
        request.special_event = "   ".into();
        let err = request.validate().unwrap_err();
        assert_eq!(err.missing, vec!["theme", "special_event"]);
    }

    #[test]
    fn request_enums_use_display_names_on_the_wire() {
        let json = serde_json::json!({
            "theme": "t",
            "main_character_name": "n",
            "main_character_traits": "tr",
            "setting": "s",
            "special_event": "e",
            "story_type": "Macera",
            "story_length": "Medium",
            "language": "Turkish",
            "art_style": "Oil Painting",
            "text_model": "gpt-3.5-turbo-0125"
        });
        let request: StoryRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.art_style, ArtStyle::OilPainting);
        assert_eq!(request.text_model, TextModel::Gpt35Turbo0125);
        assert_eq!(request.story_type_key(), StoryTypeKey::Adventure);
    }

    #[test]
    fn record_tolerates_missing_and_unknown_fields() {
        let record: StoryRecord = serde_json::from_value(serde_json::json!({
            "theme": "Dragons",
            "storyType": "mysteryKey",
            "imageUrl": "http://localhost/objects/a.jpg"
        }))
        .unwrap();
        assert_eq!(record.theme, "Dragons");
        assert_eq!(record.story_type, StoryTypeKey::Unknown);
        assert_eq!(record.generated_story, "");
        assert_eq!(record.timestamp, DateTime::<Utc>::default());
    }

    #[test]
    fn record_stores_story_type_as_key() {
        let record = StoryRecord::from_parts(
            &sample_request(),
            "Once upon a time".into(),
            "http://localhost/objects/x.jpg".into(),
            Utc::now(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["storyType"], "adventureKey");
        assert_eq!(value["generatedStory"], "Once upon a time");
        assert_eq!(value["mainCharacterName"], "Luna");
    }
}
