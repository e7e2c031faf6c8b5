use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// How the offset window of every partition in a session is derived.
///
/// Exactly one mode is active per session and applies uniformly to all
/// partitions; per-partition modes are not supported by the platform UI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OffsetMode {
  Latest,
  Earliest,
  Custom,
}

/// One requested offset window per partition.
///
/// Negative offsets are relative to the newest record (`-50` means "50 before
/// the end", `-1` the newest record itself); non-negative offsets are
/// absolute. Both bounds are inclusive. No ordering between start and end is
/// enforced here; validity is mode-dependent.
///
/// Serializes as the per-partition element of `TopicMessagesRequest`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartitionWindow {
  pub partition: i32,
  pub start_offset: i64,
  pub end_offset: i64,
}

/// The request object handed to the external fetch collaborator.
///
/// Contains a complete window for every currently visible partition, in
/// ascending partition order; partial requests are never constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TopicMessagesRequest {
  pub topic_name: String,
  pub partitions: Vec<PartitionWindow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
  pub session_id: String,
  pub topic: String,
  pub num_partitions: i32,
  pub created_at_ms: i64,
}

/// Point-in-time view of a session's browsing state.
///
/// `message_count` reflects user edits immediately, even while the debounced
/// recompute of the windows is still pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
  pub mode: OffsetMode,
  pub message_count: i64,
  pub custom_start: Option<i64>,
  pub custom_end: Option<i64>,
  pub visible_partitions: Vec<i32>,
  pub windows: Vec<PartitionWindow>,
}

/// Topic metadata as served by the platform API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDetails {
  pub topic: String,
  pub num_partitions: i32,
  pub replication_factor: i16,
  pub is_internal: bool,
  pub cleanup_policy: String,
  pub retention_ms: RetentionMs,
  pub retention_bytes: i64,
  pub additional_configs: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionMs {
  pub value: i64,
  pub indefinite: bool,
}

/// A native JSON tree.
///
/// Produced only by the decoders and consumed by the rendering collaborator.
/// Untagged, so it serializes as the plain JSON it represents. Object keys
/// live in a `BTreeMap`: key order is not semantically meaningful, and the
/// sorted container keeps output deterministic for display and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonValue {
  String(String),
  Number(f64),
  Bool(bool),
  Null,
  Array(Vec<JsonValue>),
  Object(BTreeMap<String, JsonValue>),
}

/// Wire-level discriminated encoding of a JSON value.
///
/// By contract at most one field is populated per instance, but the producer
/// is not trusted to enforce that; `decode_json_value` applies a fixed
/// precedence instead of assuming single-variant inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireJsonValue {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub array_val: Option<Vec<WireJsonValue>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bool_val: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub null_val: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub number_val: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub object_val: Option<BTreeMap<String, WireJsonValue>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub string_val: Option<String>,
}

/// Classification of a decoded message key or value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PayloadType {
  String,
  Json,
  ConsumerOffset,
}

/// A message as returned by the platform fetch API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
  pub key: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub key_json_payload: Option<WireJsonValue>,
  pub key_payload_type: String,
  pub offset: i64,
  pub partition: i32,
  pub timestamp: String,
  pub topic: String,
  pub value: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub value_json_payload: Option<WireJsonValue>,
  pub value_payload_type: String,
}

/// A message with both payloads decoded into native form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageDetails {
  pub key: String,
  pub key_json_payload: JsonValue,
  pub key_payload_type: PayloadType,
  pub offset: i64,
  pub partition: i32,
  pub timestamp: String,
  pub topic: String,
  pub value: String,
  pub value_json_payload: JsonValue,
  pub value_payload_type: PayloadType,
}

/// Content classification of a raw payload, checked in this order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayloadEncoding {
  Json,
  PlainText,
  Base64,
}

/// A raw payload decoded for preview display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecodedPayload {
  pub payload: String,
  pub json_payload: JsonValue,
  pub payload_type: PayloadType,
}
