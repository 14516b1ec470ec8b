use crate::story::model::{ArtStyle, Language, StoryRequest};

pub fn build_story_prompt(request: &StoryRequest) -> String {
    let length = request.story_length.label(request.language);
    match request.language {
        Language::Turkish => format!(
            "{} türünde bir hikaye oluştur. Hikaye, {} ortamında {} adlı {} bir karakteri anlatıyor. \
Hikayenin teması {} ve {} gibi bir olay içeriyor. Hikayenin uzunluğu {} olmalı.",
            request.story_type,
            request.setting,
            request.main_character_name,
            request.main_character_traits,
            request.theme,
            request.special_event,
            length,
        ),
        Language::English => format!(
            "Create a {} story set in {}, featuring a character named {} who is {}. \
The story theme is {} and includes an event where {}. The story should be {} in length.",
            request.story_type,
            request.setting,
            request.main_character_name,
            request.main_character_traits,
            request.theme,
            request.special_event,
            length,
        ),
    }
}

/// The image model tends to render captions unless told not to.
pub fn build_image_prompt(story_text: &str, art_style: ArtStyle, language: Language) -> String {
    let style = art_style.label(language);
    match language {
        Language::Turkish => format!(
            "Bu hikayeye dayanarak ayrıntılı bir görüntü oluşturun: {story_text}, \
yalnızca görsel unsurlara odaklanarak, metin içermeden. Stil: {style}"
        ),
        Language::English => format!(
            "Create a detailed image based on this story: {story_text}. \
Focus only on visual elements and do not include any text. Style: {style}"
        ),
    }
}
