use crate::{
  engine::CoreError,
  models::{MessageDetails, WireMessage},
};

mod json;
mod payload;

pub use json::{decode_json_value, decode_payload_type, parse_json_string};
pub use payload::{decode_raw_payload, detect_encoding};

/// Map one wire message into its native form.
///
/// JSON payload trees degrade to `Null` when absent or unrecognized; an
/// unknown payload type is the one fatal condition and propagates.
pub fn decode_message(wire: &WireMessage) -> Result<MessageDetails, CoreError> {
  Ok(MessageDetails {
    key: wire.key.clone(),
    key_json_payload: decode_json_value(wire.key_json_payload.as_ref()),
    key_payload_type: decode_payload_type(&wire.key_payload_type)?,
    offset: wire.offset,
    partition: wire.partition,
    timestamp: wire.timestamp.clone(),
    topic: wire.topic.clone(),
    value: wire.value.clone(),
    value_json_payload: decode_json_value(wire.value_json_payload.as_ref()),
    value_payload_type: decode_payload_type(&wire.value_payload_type)?,
  })
}

/// Map a fetched batch; the first unknown payload type aborts the batch.
pub fn decode_messages(wire: &[WireMessage]) -> Result<Vec<MessageDetails>, CoreError> {
  wire.iter().map(decode_message).collect()
}
