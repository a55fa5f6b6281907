//! Pull a readable message out of an error response body.

use serde_json::Value;

/// Best message for a failed response.
///
/// Understands Google API errors (`{"error": {"message": ...}}`) and OAuth
/// token endpoint errors (`{"error": "invalid_grant", "error_description": ...}`).
/// Falls back to a trimmed plain-text body, then to `HTTP <code>`.
pub(crate) fn error_message(code: u32, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        match value.get("error") {
            Some(Value::Object(obj)) => {
                if let Some(msg) = obj.get("message").and_then(Value::as_str) {
                    return msg.to_string();
                }
            }
            Some(Value::String(kind)) => {
                return match value.get("error_description").and_then(Value::as_str) {
                    Some(desc) => format!("{kind}: {desc}"),
                    None => kind.clone(),
                };
            }
            _ => {}
        }
    }

    const MAX_TEXT: usize = 200;
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() || text.starts_with('<') {
        return format!("HTTP {code}");
    }
    let mut end = text.len().min(MAX_TEXT);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
