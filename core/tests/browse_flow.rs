use std::{sync::Arc, thread, time::Duration};

use parking_lot::Mutex;
use tw_core::{
  BrowseEngine, CoreError, CoreOptions, JsonValue, MessageDetails, OffsetMode, PayloadType,
  RetentionMs, TopicDetails, TopicMessagesRequest,
};

const FAST_DEBOUNCE: Duration = Duration::from_millis(40);

fn engine_with_debounce(window: Duration) -> BrowseEngine {
  BrowseEngine::new(CoreOptions {
    debounce_window: window,
    ..CoreOptions::default()
  })
}

fn topic(name: &str, num_partitions: i32) -> TopicDetails {
  TopicDetails {
    topic: name.to_string(),
    num_partitions,
    replication_factor: 1,
    is_internal: false,
    cleanup_policy: "delete".to_string(),
    retention_ms: RetentionMs {
      value: 604_800_000,
      indefinite: false,
    },
    retention_bytes: -1,
    additional_configs: Default::default(),
  }
}

type Emissions = Arc<Mutex<Vec<TopicMessagesRequest>>>;

fn open_with_capture(
  eng: &BrowseEngine,
  details: &TopicDetails,
) -> (String, TopicMessagesRequest, Emissions) {
  let emissions: Emissions = Arc::new(Mutex::new(Vec::new()));
  let sink = emissions.clone();
  let (info, initial) = eng.open_topic_with_listener(details, move |req| sink.lock().push(req));
  (info.session_id, initial, emissions)
}

fn wait_for_emissions(emissions: &Emissions, at_least: usize) {
  for _ in 0..200 {
    if emissions.lock().len() >= at_least {
      return;
    }
    thread::sleep(Duration::from_millis(10));
  }
}

fn windows_of(req: &TopicMessagesRequest) -> Vec<(i32, i64, i64)> {
  req
    .partitions
    .iter()
    .map(|w| (w.partition, w.start_offset, w.end_offset))
    .collect()
}

#[test]
fn open_topic_defaults_to_latest_fifty() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (_sid, initial, _emissions) = open_with_capture(&eng, &topic("orders", 3));
  assert_eq!(initial.topic_name, "orders");
  assert_eq!(
    windows_of(&initial),
    vec![(0, -50, -1), (1, -50, -1), (2, -50, -1)]
  );
}

#[test]
fn latest_mode_count_change_emits_after_quiet_window() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 3));

  eng.set_message_count(&sid, 10).unwrap();
  wait_for_emissions(&emissions, 1);

  let got = emissions.lock();
  assert_eq!(got.len(), 1);
  assert_eq!(
    windows_of(&got[0]),
    vec![(0, -10, -1), (1, -10, -1), (2, -10, -1)]
  );
}

#[test]
fn earliest_mode_derives_from_zero() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 2));

  eng.set_mode(&sid, OffsetMode::Earliest).unwrap();
  // Mode switches emit synchronously with the current count.
  assert_eq!(windows_of(&emissions.lock()[0]), vec![(0, 0, 49), (1, 0, 49)]);

  eng.set_message_count(&sid, 10).unwrap();
  wait_for_emissions(&emissions, 2);
  let got = emissions.lock();
  assert_eq!(got.len(), 2);
  assert_eq!(windows_of(&got[1]), vec![(0, 0, 9), (1, 0, 9)]);
}

#[test]
fn rapid_count_edits_collapse_into_one_emission() {
  // Window comfortably wider than the gaps between edits.
  let eng = engine_with_debounce(Duration::from_millis(200));
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 1));

  for count in [3, 4, 5, 6, 7] {
    eng.set_message_count(&sid, count).unwrap();
    thread::sleep(Duration::from_millis(10));
  }

  // Let the quiet window pass and any stragglers fire.
  thread::sleep(Duration::from_millis(800));
  let got = emissions.lock();
  assert_eq!(got.len(), 1);
  assert_eq!(windows_of(&got[0]), vec![(0, -7, -1)]);
}

#[test]
fn invalid_count_is_rejected_without_state_change_or_emission() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 1));

  let err = eng.set_message_count(&sid, 0).unwrap_err();
  assert!(matches!(err, CoreError::InvalidMessageCount(0)));
  let err = eng.set_message_count(&sid, -3).unwrap_err();
  assert!(matches!(err, CoreError::InvalidMessageCount(-3)));

  thread::sleep(FAST_DEBOUNCE * 8);
  assert!(emissions.lock().is_empty());

  let snap = eng.snapshot(&sid).unwrap();
  assert_eq!(snap.message_count, 50);
  assert_eq!(
    snap.windows.iter().map(|w| (w.start_offset, w.end_offset)).collect::<Vec<_>>(),
    vec![(-50, -1)]
  );
}

#[test]
fn count_updates_immediately_but_windows_wait_for_the_quiet_window() {
  // Wide window so the intermediate state is observable without racing.
  let eng = engine_with_debounce(Duration::from_millis(300));
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 1));

  eng.set_message_count(&sid, 10).unwrap();
  let snap = eng.snapshot(&sid).unwrap();
  assert_eq!(snap.message_count, 10);
  assert_eq!(snap.windows[0].start_offset, -50);
  assert_eq!(snap.windows[0].end_offset, -1);

  wait_for_emissions(&emissions, 1);
  let snap = eng.snapshot(&sid).unwrap();
  assert_eq!(snap.windows[0].start_offset, -10);
  assert_eq!(snap.windows[0].end_offset, -1);
}

#[test]
fn mode_switch_cancels_pending_count_emission() {
  let eng = engine_with_debounce(Duration::from_millis(150));
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 1));

  eng.set_message_count(&sid, 10).unwrap();
  eng.set_mode(&sid, OffsetMode::Earliest).unwrap();

  // The synchronous mode emission already used the new count; the pending
  // debounced one must not follow it up.
  assert_eq!(windows_of(&emissions.lock()[0]), vec![(0, 0, 9)]);
  thread::sleep(Duration::from_millis(600));
  assert_eq!(emissions.lock().len(), 1);
}

#[test]
fn custom_mode_seeds_bounds_from_prior_range() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 1));

  eng.set_mode(&sid, OffsetMode::Custom).unwrap();
  assert_eq!(windows_of(&emissions.lock()[0]), vec![(0, -50, -1)]);

  let snap = eng.snapshot(&sid).unwrap();
  assert_eq!(snap.custom_start, Some(-50));
  assert_eq!(snap.custom_end, Some(-1));
}

#[test]
fn custom_bounds_emit_synchronously() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 1));

  eng.set_mode(&sid, OffsetMode::Custom).unwrap();
  eng.set_custom_start(&sid, -100).unwrap();
  eng.set_custom_end(&sid, -2).unwrap();

  let got = emissions.lock();
  assert_eq!(got.len(), 3);
  assert_eq!(windows_of(&got[1]), vec![(0, -100, -1)]);
  assert_eq!(windows_of(&got[2]), vec![(0, -100, -2)]);
}

#[test]
fn custom_bound_of_zero_is_rejected() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 1));

  eng.set_mode(&sid, OffsetMode::Custom).unwrap();
  let before = emissions.lock().len();

  let err = eng.set_custom_start(&sid, 0).unwrap_err();
  assert!(matches!(err, CoreError::InvalidCustomOffset(0)));
  let err = eng.set_custom_end(&sid, 0).unwrap_err();
  assert!(matches!(err, CoreError::InvalidCustomOffset(0)));

  assert_eq!(emissions.lock().len(), before);
  let snap = eng.snapshot(&sid).unwrap();
  assert_eq!(snap.custom_start, Some(-50));
  assert_eq!(snap.custom_end, Some(-1));
}

#[test]
fn custom_bounds_require_custom_mode() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 1));

  let err = eng.set_custom_start(&sid, 5).unwrap_err();
  assert!(matches!(err, CoreError::NotCustomMode));
  assert!(emissions.lock().is_empty());
}

#[test]
fn custom_mode_passes_inverted_ranges_through() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 1));

  eng.set_mode(&sid, OffsetMode::Custom).unwrap();
  eng.set_custom_start(&sid, 50).unwrap();
  eng.set_custom_end(&sid, 10).unwrap();

  // Ordering is the platform's to validate, not the controller's.
  let got = emissions.lock();
  assert_eq!(windows_of(got.last().unwrap()), vec![(0, 50, 10)]);
}

#[test]
fn custom_bounds_survive_a_mode_round_trip() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 1));

  eng.set_mode(&sid, OffsetMode::Custom).unwrap();
  eng.set_custom_start(&sid, -200).unwrap();
  eng.set_custom_end(&sid, -5).unwrap();

  eng.set_mode(&sid, OffsetMode::Latest).unwrap();
  assert_eq!(windows_of(emissions.lock().last().unwrap()), vec![(0, -50, -1)]);

  eng.set_mode(&sid, OffsetMode::Custom).unwrap();
  assert_eq!(windows_of(emissions.lock().last().unwrap()), vec![(0, -200, -5)]);
}

#[test]
fn selecting_one_partition_narrows_requests_without_touching_windows() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, initial, emissions) = open_with_capture(&eng, &topic("orders", 3));
  assert_eq!(initial.partitions.len(), 3);

  eng.select_partition(&sid, 1).unwrap();
  assert!(emissions.lock().is_empty());

  let req = eng.current_request(&sid).unwrap();
  assert_eq!(windows_of(&req), vec![(1, -50, -1)]);

  // All three windows still exist, untouched.
  let snap = eng.snapshot(&sid).unwrap();
  assert_eq!(snap.visible_partitions, vec![1]);
  assert_eq!(snap.windows.len(), 3);
  assert_eq!(snap.windows[0].start_offset, -50);
}

#[test]
fn unknown_partition_selection_is_rejected() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, _emissions) = open_with_capture(&eng, &topic("orders", 3));

  let err = eng.select_partition(&sid, 7).unwrap_err();
  assert!(matches!(err, CoreError::UnknownPartition(7)));
  assert_eq!(eng.visible_partitions(&sid).unwrap(), vec![0, 1, 2]);
}

#[test]
fn select_all_restores_every_partition() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, _emissions) = open_with_capture(&eng, &topic("orders", 3));

  eng.select_partition(&sid, 2).unwrap();
  assert_eq!(eng.visible_partitions(&sid).unwrap(), vec![2]);
  eng.select_all_partitions(&sid).unwrap();
  assert_eq!(eng.visible_partitions(&sid).unwrap(), vec![0, 1, 2]);
}

#[test]
fn filter_messages_applies_the_visibility_predicate() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, _emissions) = open_with_capture(&eng, &topic("orders", 3));
  eng.select_partition(&sid, 1).unwrap();

  let messages: Vec<MessageDetails> = (0..3)
    .map(|partition| MessageDetails {
      key: format!("k{partition}"),
      key_json_payload: JsonValue::Null,
      key_payload_type: PayloadType::String,
      offset: 0,
      partition,
      timestamp: "2024-01-01T00:00:00Z".to_string(),
      topic: "orders".to_string(),
      value: "v".to_string(),
      value_json_payload: JsonValue::Null,
      value_payload_type: PayloadType::String,
    })
    .collect();

  let visible = eng.filter_messages(&sid, messages).unwrap();
  assert_eq!(visible.len(), 1);
  assert_eq!(visible[0].partition, 1);
}

#[test]
fn closing_a_session_cancels_the_pending_emission() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, _initial, emissions) = open_with_capture(&eng, &topic("orders", 1));

  eng.set_message_count(&sid, 10).unwrap();
  eng.close_topic(&sid).unwrap();

  thread::sleep(FAST_DEBOUNCE * 8);
  assert!(emissions.lock().is_empty());

  let err = eng.set_message_count(&sid, 10).unwrap_err();
  assert!(matches!(err, CoreError::UnknownSession(_)));
}

#[test]
fn zero_partition_topics_open_with_an_empty_window_set() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let (sid, initial, emissions) = open_with_capture(&eng, &topic("empty", 0));

  assert!(initial.partitions.is_empty());
  assert!(eng.visible_partitions(&sid).unwrap().is_empty());

  // Still a complete (if empty) request on mode changes.
  eng.set_mode(&sid, OffsetMode::Earliest).unwrap();
  let got = emissions.lock();
  assert_eq!(got.len(), 1);
  assert!(got[0].partitions.is_empty());
}

#[test]
fn unknown_sessions_are_reported() {
  let eng = engine_with_debounce(FAST_DEBOUNCE);
  let err = eng.current_request("nope").unwrap_err();
  assert!(matches!(err, CoreError::UnknownSession(_)));
}
