//! Instructions sent to the vision model.

use galleria_core::{JournalStyle, MediaType};

/// Instruction asking for a caption and categories drawn from `vocabulary`.
///
/// The vocabulary is embedded as a JSON array literal so names containing
/// commas or quotes stay unambiguous.
pub fn suggestion_prompt(media_type: MediaType, vocabulary: &[String]) -> String {
    let list = serde_json::to_string(vocabulary).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Analyze this {media_type} and provide a short description and relevant categories \
         from the following list: {list}. Please output the result as a JSON object with two \
         keys: \"description\" (string) and \"categories\" (array of strings from the list \
         provided). For example: {{ \"description\": \"A photo of...\", \"categories\": \
         [\"Nature\", \"Travel\"] }}. If no categories are relevant, the \"categories\" array \
         should be empty."
    )
}

/// Instruction asking for a short journal entry in the given style.
pub fn journal_prompt(style: JournalStyle, media_type: MediaType, description: &str) -> String {
    let task = match style {
        JournalStyle::SpecialDay => {
            "Look for signs that this was a special day, such as a celebration, holiday, \
             milestone or trip, and write a short journal entry remembering the occasion. \
             If nothing suggests a special occasion, write about what made the moment worth keeping."
        }
        JournalStyle::Mood => {
            "Describe the mood and atmosphere of this moment in a short, personal journal entry \
             written in the first person."
        }
        JournalStyle::Poetic => {
            "Write a short poetic reflection of four to six lines inspired by this moment."
        }
    };

    let context = if description.trim().is_empty() {
        String::new()
    } else {
        format!(" The owner described it as: \"{}\".", description.trim())
    };

    format!(
        "This {media_type} is from a personal gallery.{context} {task} \
         Reply with the entry text only, without a title, quotes or markdown."
    )
}
