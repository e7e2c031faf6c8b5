mod debounce;
mod decode;
mod engine;
mod models;
mod offsets;
mod partitions;

pub use crate::decode::{
  decode_json_value, decode_message, decode_messages, decode_payload_type, decode_raw_payload,
  detect_encoding, parse_json_string,
};
pub use crate::engine::{BrowseEngine, CoreError, CoreOptions};
pub use crate::models::{
  DecodedPayload, JsonValue, MessageDetails, OffsetMode, PartitionWindow, PayloadEncoding,
  PayloadType, RetentionMs, SessionInfo, SessionSnapshot, TopicDetails, TopicMessagesRequest,
  WireJsonValue, WireMessage,
};
