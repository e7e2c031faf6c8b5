use base64::Engine as _;

use crate::{
  decode::json::parse_json_string,
  models::{DecodedPayload, JsonValue, PayloadEncoding, PayloadType},
};

/// Classify a raw payload by content.
///
/// Checked in order: JSON by leading `{`/`[`, then printable UTF-8 text, then
/// standard base64 decoding to text. Anything else degrades to plain text
/// with a diagnostic.
pub fn detect_encoding(raw: &[u8]) -> PayloadEncoding {
  let trimmed = raw.trim_ascii();
  if trimmed.is_empty() {
    return PayloadEncoding::PlainText;
  }
  if matches!(trimmed.first(), Some(b'{' | b'[')) {
    return PayloadEncoding::Json;
  }
  if let Ok(text) = std::str::from_utf8(trimmed) {
    if is_mostly_printable(text) {
      return PayloadEncoding::PlainText;
    }
  }
  if is_valid_base64(trimmed) {
    return PayloadEncoding::Base64;
  }
  tracing::warn!("unable to determine payload encoding, defaulting to plain text");
  PayloadEncoding::PlainText
}

/// Decode a raw payload for preview display.
///
/// Total: malformed content degrades to plain text rather than failing, since
/// this feeds the display path. JSON payloads come back with a parsed tree,
/// base64 payloads with the decoded text, binary with a lossy rendering.
pub fn decode_raw_payload(raw: &[u8]) -> DecodedPayload {
  match detect_encoding(raw) {
    PayloadEncoding::Json => {
      let text = String::from_utf8_lossy(raw).to_string();
      match parse_json_string(&text) {
        Ok(tree) => DecodedPayload {
          payload: text,
          json_payload: tree,
          payload_type: PayloadType::Json,
        },
        Err(err) => {
          tracing::warn!(error = %err, "payload looked like JSON but failed to parse");
          plain_text(text)
        }
      }
    }
    PayloadEncoding::PlainText => plain_text(String::from_utf8_lossy(raw).to_string()),
    PayloadEncoding::Base64 => {
      match base64::engine::general_purpose::STANDARD.decode(raw.trim_ascii()) {
        Ok(decoded) => plain_text(String::from_utf8_lossy(&decoded).to_string()),
        Err(err) => {
          tracing::warn!(error = %err, "payload classified as base64 but failed to decode");
          plain_text(String::from_utf8_lossy(raw).to_string())
        }
      }
    }
  }
}

fn plain_text(payload: String) -> DecodedPayload {
  DecodedPayload {
    payload,
    json_payload: JsonValue::Null,
    payload_type: PayloadType::String,
  }
}

fn is_mostly_printable(text: &str) -> bool {
  let mut total = 0usize;
  let mut printable = 0usize;
  for ch in text.chars() {
    total += 1;
    if !ch.is_control() {
      printable += 1;
    }
  }
  total > 0 && (printable as f64) / (total as f64) > 0.9
}

fn is_valid_base64(data: &[u8]) -> bool {
  match base64::engine::general_purpose::STANDARD.decode(data) {
    // Decoding alone is not proof; require the decoded bytes to be text.
    Ok(decoded) => !decoded.is_empty() && std::str::from_utf8(&decoded).is_ok(),
    Err(_) => false,
  }
}
