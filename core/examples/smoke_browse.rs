use std::{thread, time::Duration};

use tw_core::{
  decode_raw_payload, BrowseEngine, CoreOptions, OffsetMode, RetentionMs, TopicDetails,
  WireJsonValue, WireMessage,
};

fn main() -> Result<(), String> {
  let eng = BrowseEngine::new(CoreOptions {
    debounce_window: Duration::from_millis(200),
    ..CoreOptions::default()
  });

  let topic = TopicDetails {
    topic: "orders".to_string(),
    num_partitions: 3,
    replication_factor: 1,
    is_internal: false,
    cleanup_policy: "delete".to_string(),
    retention_ms: RetentionMs {
      value: 604_800_000,
      indefinite: false,
    },
    retention_bytes: -1,
    additional_configs: Default::default(),
  };

  let (session, initial) = eng.open_topic_with_listener(&topic, |req| {
    println!("would fetch: {}", serde_json::to_string(&req).unwrap_or_default());
  });
  println!(
    "initial request: {}",
    serde_json::to_string(&initial).map_err(|e| e.to_string())?
  );

  let sid = session.session_id;
  eng.set_mode(&sid, OffsetMode::Earliest).map_err(|e| e.to_string())?;
  eng.set_message_count(&sid, 10).map_err(|e| e.to_string())?;
  eng.select_partition(&sid, 1).map_err(|e| e.to_string())?;

  // Give the debounced count edit time to fire.
  thread::sleep(Duration::from_millis(600));
  let snap = eng.snapshot(&sid).map_err(|e| e.to_string())?;
  println!("visible={:?} windows={:?}", snap.visible_partitions, snap.windows);

  let wire = WireMessage {
    key: "user-7".to_string(),
    key_json_payload: None,
    key_payload_type: "stringPayload".to_string(),
    offset: 41,
    partition: 1,
    timestamp: "2024-01-01T00:00:00Z".to_string(),
    topic: "orders".to_string(),
    value: r#"{"total":9.5}"#.to_string(),
    value_json_payload: Some(WireJsonValue {
      number_val: Some(9.5),
      ..Default::default()
    }),
    value_payload_type: "jsonPayload".to_string(),
  };
  let decoded = eng.decode_messages(&[wire]).map_err(|e| e.to_string())?;
  println!(
    "decoded value payload: {}",
    serde_json::to_string(&decoded[0].value_json_payload).map_err(|e| e.to_string())?
  );

  let preview = decode_raw_payload(br#"{"answer":42}"#);
  println!(
    "raw preview: type={:?} tree={}",
    preview.payload_type,
    serde_json::to_string(&preview.json_payload).map_err(|e| e.to_string())?
  );

  eng.close_topic(&sid).map_err(|e| e.to_string())?;
  Ok(())
}
