//! Attachment discovery in a message's MIME tree, and body decoding.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use super::types::{Message, MessagePart};

/// Gmail's base64url; padding shows up inconsistently, so accept both.
const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Attachment metadata extracted from a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentMeta {
    pub message_id: String,
    /// Missing when the body is inlined in `inline_data`.
    pub attachment_id: Option<String>,
    pub filename: String,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub inline_data: Option<String>,
}

/// Every part with a non-empty filename, depth-first in document order.
pub fn attachments_of(message: &Message) -> Vec<AttachmentMeta> {
    let mut out = Vec::new();
    if let Some(payload) = &message.payload {
        walk(&message.id, payload, &mut out);
    }
    out
}

fn walk(message_id: &str, part: &MessagePart, out: &mut Vec<AttachmentMeta>) {
    if let Some(filename) = part.filename.as_deref().filter(|f| !f.is_empty()) {
        let body = part.body.as_ref();
        out.push(AttachmentMeta {
            message_id: message_id.to_string(),
            attachment_id: body.and_then(|b| b.attachment_id.clone()),
            filename: filename.to_string(),
            mime_type: part.mime_type.clone(),
            size: body.and_then(|b| b.size),
            inline_data: body.and_then(|b| b.data.clone()),
        });
    }
    for child in &part.parts {
        walk(message_id, child, out);
    }
}

/// Decode a base64url body (`data` of a part or of an attachment).
pub fn decode_body_data(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64URL.decode(data.trim())
}
