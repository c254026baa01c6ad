//! Tolerant decoding of the model's caption/category answer.
//!
//! Models are asked for a bare JSON object but frequently wrap it in a
//! markdown code fence or surround it with prose. Decoding never fails: text
//! that is not JSON becomes the caption, and categories outside the owner's
//! vocabulary are dropped.

use serde_json::Value;
use tracing::warn;

use galleria_core::Suggestions;

/// Outcome of decoding a model answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionDecode {
    /// JSON was found; fields were validated against the vocabulary.
    Parsed(Suggestions),
    /// No JSON could be decoded. Carries the original answer untouched.
    Unparsed { raw: String },
}

impl SuggestionDecode {
    /// Collapse to suggestions, using unparsed text as the description.
    pub fn into_suggestions(self) -> Suggestions {
        match self {
            SuggestionDecode::Parsed(s) => s,
            SuggestionDecode::Unparsed { raw } => Suggestions {
                categories: Vec::new(),
                description: raw,
            },
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, SuggestionDecode::Parsed(_))
    }
}

/// Decode a model answer against the owner's category vocabulary.
pub fn decode_suggestions(raw: &str, vocabulary: &[String]) -> SuggestionDecode {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return SuggestionDecode::Parsed(Suggestions::default());
    }

    let body = strip_code_fence(trimmed);
    let value = serde_json::from_str::<Value>(body)
        .ok()
        .or_else(|| object_slice(body).and_then(|s| serde_json::from_str(s).ok()));

    match value {
        Some(value) => SuggestionDecode::Parsed(suggestions_from_value(&value, vocabulary)),
        None => {
            warn!(
                subsystem = "inference",
                component = "parser",
                op = "decode_suggestions",
                response_len = raw.len(),
                "Model answer is not JSON, using it as the description"
            );
            SuggestionDecode::Unparsed {
                raw: raw.to_string(),
            }
        }
    }
}

/// Remove a leading code fence with any language tag and a trailing fence.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')))
            .unwrap_or(rest.len());
        body = rest[tag_len..].trim_start();
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Slice from the first `{` to the last `}`, if both exist in that order.
fn object_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn suggestions_from_value(value: &Value, vocabulary: &[String]) -> Suggestions {
    let Some(object) = value.as_object() else {
        return Suggestions::default();
    };

    let description = object
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let categories = object
        .get("categories")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|name| vocabulary.iter().any(|known| known == name))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Suggestions {
        categories,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vec<String> {
        vec!["Beach".to_string(), "Family".to_string()]
    }

    fn parsed(description: &str, categories: &[&str]) -> SuggestionDecode {
        SuggestionDecode::Parsed(Suggestions {
            description: description.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        })
    }

    #[test]
    fn test_fenced_json_drops_unknown_categories() {
        let raw = "```json\n{\"description\":\"A sunny beach\",\"categories\":[\"Beach\",\"NotAReal\"]}\n```";
        assert_eq!(decode_suggestions(raw, &vocab()), parsed("A sunny beach", &["Beach"]));
    }

    #[test]
    fn test_plain_text_becomes_description() {
        let raw = "Just a nice photo of friends.";
        let decoded = decode_suggestions(raw, &vocab());
        assert_eq!(
            decoded,
            SuggestionDecode::Unparsed {
                raw: raw.to_string()
            }
        );
        let s = decoded.into_suggestions();
        assert_eq!(s.description, raw);
        assert!(s.categories.is_empty());
    }

    #[test]
    fn test_unparsed_keeps_untrimmed_original() {
        let raw = "  not json \n";
        let s = decode_suggestions(raw, &vocab()).into_suggestions();
        assert_eq!(s.description, raw);
    }

    #[test]
    fn test_empty_answer_is_empty_suggestions() {
        assert_eq!(decode_suggestions("", &vocab()), parsed("", &[]));
        assert_eq!(decode_suggestions(" \n\t", &vocab()), parsed("", &[]));
    }

    #[test]
    fn test_bare_json() {
        let raw = r#"{"description":"Kids playing","categories":["Family"]}"#;
        assert_eq!(decode_suggestions(raw, &vocab()), parsed("Kids playing", &["Family"]));
    }

    #[test]
    fn test_other_fence_tags_and_trailing_whitespace() {
        for raw in [
            "```JSON\n{\"description\":\"x\",\"categories\":[]}\n```  \n",
            "```\n{\"description\":\"x\",\"categories\":[]}\n```",
            "```json {\"description\":\"x\",\"categories\":[]} ```",
            "  ```javascript\r\n{\"description\":\"x\",\"categories\":[]}\r\n```\r\n",
        ] {
            assert_eq!(decode_suggestions(raw, &vocab()), parsed("x", &[]), "input: {raw:?}");
        }
    }

    #[test]
    fn test_json_surrounded_by_prose() {
        let raw = "Sure! Here you go:\n{\"description\":\"Dinner\",\"categories\":[\"Family\"]}\nEnjoy.";
        assert_eq!(decode_suggestions(raw, &vocab()), parsed("Dinner", &["Family"]));
    }

    #[test]
    fn test_category_match_is_case_sensitive() {
        let raw = r#"{"description":"d","categories":["beach","Beach","BEACH"]}"#;
        assert_eq!(decode_suggestions(raw, &vocab()), parsed("d", &["Beach"]));
    }

    #[test]
    fn test_preserves_model_order() {
        let raw = r#"{"description":"d","categories":["Family","Beach"]}"#;
        assert_eq!(decode_suggestions(raw, &vocab()), parsed("d", &["Family", "Beach"]));
    }

    #[test]
    fn test_wrong_field_types_are_ignored() {
        let raw = r#"{"description":42,"categories":"Beach"}"#;
        assert_eq!(decode_suggestions(raw, &vocab()), parsed("", &[]));

        let raw = r#"{"description":"d","categories":["Beach",7,null,{"x":1}]}"#;
        assert_eq!(decode_suggestions(raw, &vocab()), parsed("d", &["Beach"]));
    }

    #[test]
    fn test_non_object_json_is_empty() {
        assert_eq!(decode_suggestions("[\"Beach\"]", &vocab()), parsed("", &[]));
        assert_eq!(decode_suggestions("\"A caption\"", &vocab()), parsed("", &[]));
        assert_eq!(decode_suggestions("true", &vocab()), parsed("", &[]));
    }

    #[test]
    fn test_empty_vocabulary_drops_everything() {
        let raw = r#"{"description":"d","categories":["Beach"]}"#;
        assert_eq!(decode_suggestions(raw, &[]), parsed("d", &[]));
    }

    #[test]
    fn test_broken_braces_fall_back_to_raw() {
        let raw = "Looks like {a beach} to me";
        assert!(!decode_suggestions(raw, &vocab()).is_parsed());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("{}"), "{}");
        assert_eq!(strip_code_fence("```\n{}"), "{}");
        assert_eq!(strip_code_fence("{}\n```"), "{}");
    }
}
