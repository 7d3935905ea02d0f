//! Recovering a JSON object from model output.

use serde_json::{Map, Value};

use crate::error::ContentError;

/// Strip a surrounding ```` ``` ```` / ```` ```json ```` fence if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// First balanced `{...}` substring, found by scanning brace depth.
///
/// Braces inside JSON string literals are skipped.
pub fn find_first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse model output into a JSON object.
///
/// Tries the fence-stripped text first, then the first balanced object.
/// A nested object under `"values"` replaces the outer object.
pub fn parse_model_json(content: &str) -> Result<Map<String, Value>, ContentError> {
    let stripped = strip_code_fences(content);
    let value = match serde_json::from_str::<Value>(stripped) {
        Ok(v) => v,
        Err(first) => {
            let candidate = find_first_json_object(stripped).ok_or(ContentError::Json(first))?;
            serde_json::from_str(candidate)?
        }
    };

    match value {
        Value::Object(map) => Ok(unwrap_values(map)),
        other => Err(ContentError::NotAnObject(json_type(&other))),
    }
}

/// Some models wrap the answer as `{"values": {...}}`.
pub fn unwrap_values(mut map: Map<String, Value>) -> Map<String, Value> {
    if matches!(map.get("values"), Some(Value::Object(_))) {
        if let Some(Value::Object(inner)) = map.remove("values") {
            return inner;
        }
    }
    map
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_json_fence() {
        let text = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(text), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_code_fences("```\n{}\n```\n"), "{}");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn finds_balanced_object() {
        let text = "Here you go: {\"a\": {\"b\": 2}} and more {\"c\": 3}";
        assert_eq!(find_first_json_object(text), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn braces_in_strings_are_ignored() {
        let text = r#"note {"name": "x}y{", "n": 1} tail"#;
        assert_eq!(find_first_json_object(text), Some(r#"{"name": "x}y{", "n": 1}"#));
    }

    #[test]
    fn unbalanced_has_no_object() {
        assert_eq!(find_first_json_object("{\"a\": 1"), None);
        assert_eq!(find_first_json_object("no json"), None);
    }

    #[test]
    fn parses_garbage_with_embedded_object() {
        let map = parse_model_json("Sure! {\"line_7_royalties\": 5} Hope that helps.").unwrap();
        assert_eq!(map["line_7_royalties"], json!(5));
    }

    #[test]
    fn unwraps_values_object() {
        let map = parse_model_json("{\"values\": {\"line_7_royalties\": 5}}").unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["line_7_royalties"], json!(5));
    }

    #[test]
    fn scalar_values_key_is_kept() {
        let map = parse_model_json("{\"values\": 3}").unwrap();
        assert_eq!(map["values"], json!(3));
    }

    #[test]
    fn rejects_non_objects() {
        assert!(matches!(
            parse_model_json("[1, 2]"),
            Err(ContentError::NotAnObject("array"))
        ));
        assert!(matches!(
            parse_model_json("nothing here"),
            Err(ContentError::Json(_))
        ));
    }
}
