use serde_json::{Map, Value};

pub const RESPONSE_FALLBACK_MAX_CHARS: usize = 4000;
pub const ERROR_BODY_EXCERPT_MAX_CHARS: usize = 1500;
pub const PROBE_BODY_EXCERPT_MAX_CHARS: usize = 2000;

/// Recognizes one vendor response layout and pulls the display text out of it.
#[derive(Clone, Copy)]
pub struct ShapeMatcher {
    pub name: &'static str,
    extract: fn(&Map<String, Value>) -> Option<String>,
}

impl ShapeMatcher {
    pub fn extract(&self, payload: &Map<String, Value>) -> Option<String> {
        (self.extract)(payload)
    }
}

/// Tried in order, first hit wins.
pub const SHAPE_MATCHERS: [ShapeMatcher; 3] = [
    ShapeMatcher {
        name: "output",
        extract: extract_output_shape,
    },
    ShapeMatcher {
        name: "choices",
        extract: extract_choices_shape,
    },
    ShapeMatcher {
        name: "text",
        extract: extract_text_shape,
    },
];

/// Best-effort decoding of a 2xx payload into a display string.
///
/// Unknown object layouts fall back to a capped JSON dump so unexpected shapes stay
/// visible instead of being swallowed.
pub fn extract_reply(payload: &Value) -> String {
    match payload {
        Value::Object(map) => match_shape(map)
            .map(|(_, text)| text)
            .unwrap_or_else(|| cap_chars(&payload.to_string(), RESPONSE_FALLBACK_MAX_CHARS)),
        Value::String(text) => cap_chars(text, RESPONSE_FALLBACK_MAX_CHARS),
        other => cap_chars(&other.to_string(), RESPONSE_FALLBACK_MAX_CHARS),
    }
}

/// Like [`extract_reply`] for a raw body; non-JSON bodies are returned as capped text.
pub fn extract_reply_from_body(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(payload) => extract_reply(&payload),
        Err(_) => cap_chars(body, RESPONSE_FALLBACK_MAX_CHARS),
    }
}

/// Returns the name of the matching shape alongside the extracted text.
pub fn match_shape(payload: &Map<String, Value>) -> Option<(&'static str, String)> {
    SHAPE_MATCHERS.iter().find_map(|matcher| {
        matcher
            .extract(payload)
            .map(|text| (matcher.name, text))
    })
}

pub fn cap_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value.to_string(),
    }
}

fn extract_output_shape(payload: &Map<String, Value>) -> Option<String> {
    let output = payload.get("output")?.as_array()?;

    output.iter().find_map(|item| match item {
        Value::String(text) => Some(text.clone()),
        Value::Object(entry) => match entry.get("content")? {
            Value::String(text) => Some(text.clone()),
            Value::Array(parts) => {
                first_string_field(parts, "text").or_else(|| first_string_field(parts, "content"))
            }
            _ => None,
        },
        _ => None,
    })
}

fn extract_choices_shape(payload: &Map<String, Value>) -> Option<String> {
    let first_choice = payload.get("choices")?.as_array()?.first()?.as_object()?;

    if let Some(message) = first_choice.get("message").and_then(Value::as_object) {
        match message.get("content") {
            Some(Value::String(text)) => return Some(text.clone()),
            Some(Value::Object(content)) => {
                if let Some(text) = content.get("text").and_then(Value::as_str) {
                    return Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    first_choice
        .get("text")
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn extract_text_shape(payload: &Map<String, Value>) -> Option<String> {
    payload
        .get("text")
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn first_string_field(parts: &[Value], field: &str) -> Option<String> {
    parts
        .iter()
        .find_map(|part| part.get(field).and_then(Value::as_str))
        .map(ToString::to_string)
}
