use crate::{
  engine::CoreError,
  models::{JsonValue, PayloadType, WireJsonValue},
};

/// Convert a wire-level tagged JSON union into a native tree.
///
/// Total: an absent value decodes to `Null`, and a present value with no
/// recognized variant set degrades to `Null` with a diagnostic instead of
/// failing. This sits on the display path, where partial rendering beats a
/// crash.
///
/// The variant checks below are first-match-wins and their order is part of
/// the wire contract; existing clients depend on it. In particular:
/// - an array or object wins even when empty,
/// - `bool_val` matches an explicit `false`,
/// - `null_val` only matches when explicitly `true`,
/// - `number_val` matches an explicit `0`, `string_val` an empty string.
pub fn decode_json_value(wire: Option<&WireJsonValue>) -> JsonValue {
  let value = match wire {
    Some(v) => v,
    None => return JsonValue::Null,
  };
  if let Some(items) = &value.array_val {
    return JsonValue::Array(items.iter().map(|item| decode_json_value(Some(item))).collect());
  }
  if let Some(b) = value.bool_val {
    return JsonValue::Bool(b);
  }
  if value.null_val == Some(true) {
    return JsonValue::Null;
  }
  if let Some(n) = value.number_val {
    return JsonValue::Number(n);
  }
  if let Some(entries) = &value.object_val {
    return JsonValue::Object(
      entries
        .iter()
        .map(|(key, entry)| (key.clone(), decode_json_value(Some(entry))))
        .collect(),
    );
  }
  if let Some(s) = &value.string_val {
    return JsonValue::String(s.clone());
  }
  tracing::warn!(?value, "no recognized variant set in wire JSON value, decoding as null");
  JsonValue::Null
}

/// Map the wire payload-type tag to its native enumeration.
///
/// Unlike the JSON decoder this is deliberately loud: an unknown tag means a
/// client/server version mismatch and must not be papered over.
pub fn decode_payload_type(wire: &str) -> Result<PayloadType, CoreError> {
  match wire {
    "stringPayload" => Ok(PayloadType::String),
    "jsonPayload" => Ok(PayloadType::Json),
    "consumerOffsetPayload" => Ok(PayloadType::ConsumerOffset),
    other => Err(CoreError::UnknownPayloadType(other.to_string())),
  }
}

/// Parse arbitrary JSON text into a native tree.
pub fn parse_json_string(text: &str) -> Result<JsonValue, CoreError> {
  let parsed: serde_json::Value =
    serde_json::from_str(text).map_err(|e| CoreError::InvalidJson(e.to_string()))?;
  Ok(from_serde_value(&parsed))
}

fn from_serde_value(value: &serde_json::Value) -> JsonValue {
  match value {
    serde_json::Value::Null => JsonValue::Null,
    serde_json::Value::Bool(b) => JsonValue::Bool(*b),
    serde_json::Value::Number(n) => JsonValue::Number(n.as_f64().unwrap_or(0.0)),
    serde_json::Value::String(s) => JsonValue::String(s.clone()),
    serde_json::Value::Array(items) => JsonValue::Array(items.iter().map(from_serde_value).collect()),
    serde_json::Value::Object(entries) => JsonValue::Object(
      entries
        .iter()
        .map(|(key, entry)| (key.clone(), from_serde_value(entry)))
        .collect(),
    ),
  }
}
