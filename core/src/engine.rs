use std::{
  collections::HashMap,
  sync::{Arc, Weak},
  time::{Duration, SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  debounce::Debouncer,
  decode,
  models::{
    MessageDetails, OffsetMode, SessionInfo, SessionSnapshot, TopicDetails, TopicMessagesRequest,
    WireMessage,
  },
  offsets::OffsetRangeController,
  partitions::PartitionSelector,
};

#[derive(Debug, Error)]
pub enum CoreError {
  #[error("unknown session: {0}")]
  UnknownSession(String),
  #[error("unknown partition: {0}")]
  UnknownPartition(i32),
  #[error("message count must be a positive integer, got {0}")]
  InvalidMessageCount(i64),
  #[error("invalid custom offset: {0}")]
  InvalidCustomOffset(i64),
  #[error("custom offsets can only be set in custom mode")]
  NotCustomMode,
  #[error("unknown payload type: {0}")]
  UnknownPayloadType(String),
  #[error("invalid json payload: {0}")]
  InvalidJson(String),
}

#[derive(Debug, Clone)]
pub struct CoreOptions {
  pub default_mode: OffsetMode,
  pub default_message_count: i64,
  /// Quiet window for message-count edits: rapid edits within the window
  /// collapse into a single emission carrying the last value.
  pub debounce_window: Duration,
}

impl Default for CoreOptions {
  fn default() -> Self {
    Self {
      default_mode: OffsetMode::Latest,
      default_message_count: 50,
      debounce_window: Duration::from_millis(500),
    }
  }
}

type RangeListener = Arc<dyn Fn(TopicMessagesRequest) + Send + Sync>;

struct SessionState {
  selector: PartitionSelector,
  controller: OffsetRangeController,
}

struct SessionHandle {
  info: SessionInfo,
  state: Mutex<SessionState>,
  listener: RangeListener,
  debounce: Debouncer,
}

/// Build the full request for the currently visible partitions.
fn current_request(state: &SessionState, info: &SessionInfo) -> TopicMessagesRequest {
  TopicMessagesRequest {
    topic_name: info.topic.clone(),
    partitions: state
      .controller
      .windows()
      .iter()
      .filter(|window| state.selector.is_visible(window.partition))
      .copied()
      .collect(),
  }
}

/// Session registry exposing the browsing state layer to an embedding shell.
///
/// The engine owns no I/O: it turns user edits into complete fetch request
/// objects and hands decoded wire data back as native models. Issuing the
/// fetch and rendering the result stay with the caller.
#[derive(Clone)]
pub struct BrowseEngine {
  options: CoreOptions,
  sessions: Arc<Mutex<HashMap<String, Arc<SessionHandle>>>>,
}

impl BrowseEngine {
  pub fn new(options: CoreOptions) -> Self {
    Self {
      options,
      sessions: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  /// Open a browsing session without range notifications.
  pub fn open_topic(&self, topic: &TopicDetails) -> (SessionInfo, TopicMessagesRequest) {
    self.open_topic_with_listener(topic, |_| {})
  }

  /// Open a browsing session for `topic`.
  ///
  /// Returns the session plus the initial fetch request (default mode and
  /// message count, every partition visible). `listener` receives each later
  /// emission: a complete request for the visible partitions whenever the
  /// derived ranges change. A topic with zero partitions opens with an empty
  /// window set.
  pub fn open_topic_with_listener(
    &self,
    topic: &TopicDetails,
    listener: impl Fn(TopicMessagesRequest) + Send + Sync + 'static,
  ) -> (SessionInfo, TopicMessagesRequest) {
    let info = SessionInfo {
      session_id: Uuid::new_v4().to_string(),
      topic: topic.topic.clone(),
      num_partitions: topic.num_partitions.max(0),
      created_at_ms: now_ms(),
    };
    let state = SessionState {
      selector: PartitionSelector::new(info.num_partitions),
      controller: OffsetRangeController::new(
        info.num_partitions,
        self.options.default_mode,
        self.options.default_message_count,
      ),
    };
    let initial = current_request(&state, &info);
    let handle = Arc::new(SessionHandle {
      info: info.clone(),
      state: Mutex::new(state),
      listener: Arc::new(listener),
      debounce: Debouncer::new(self.options.debounce_window),
    });
    self.sessions.lock().insert(info.session_id.clone(), handle);
    (info, initial)
  }

  /// Switch the offset mode; recomputes every window and emits synchronously.
  ///
  /// Any pending debounced emission is cancelled: the emission here already
  /// uses the latest stored message count.
  pub fn set_mode(&self, session_id: &str, mode: OffsetMode) -> Result<(), CoreError> {
    let handle = self.session(session_id)?;
    handle.debounce.cancel();
    let request = {
      let mut state = handle.state.lock();
      state.controller.set_mode(mode);
      current_request(&state, &handle.info)
    };
    (handle.listener)(request);
    Ok(())
  }

  /// Update the message count.
  ///
  /// The stored count changes immediately (visible via `snapshot`); the
  /// recompute-and-emit is debounced so rapid edits collapse into one
  /// emission with the final value. Non-positive counts are rejected without
  /// scheduling anything.
  pub fn set_message_count(&self, session_id: &str, count: i64) -> Result<(), CoreError> {
    let handle = self.session(session_id)?;
    {
      let mut state = handle.state.lock();
      if let Err(err) = state.controller.set_message_count(count) {
        tracing::warn!(session_id, count, "rejecting message count");
        return Err(err);
      }
    }
    let weak = Arc::downgrade(&handle);
    handle.debounce.schedule(move || emit_from_weak(&weak));
    Ok(())
  }

  /// Set the custom start offset; Custom mode only, emits synchronously.
  pub fn set_custom_start(&self, session_id: &str, offset: i64) -> Result<(), CoreError> {
    self.set_custom_bound(session_id, offset, true)
  }

  /// Set the custom end offset; Custom mode only, emits synchronously.
  pub fn set_custom_end(&self, session_id: &str, offset: i64) -> Result<(), CoreError> {
    self.set_custom_bound(session_id, offset, false)
  }

  fn set_custom_bound(
    &self,
    session_id: &str,
    offset: i64,
    is_start: bool,
  ) -> Result<(), CoreError> {
    let handle = self.session(session_id)?;
    let request = {
      let mut state = handle.state.lock();
      let res = if is_start {
        state.controller.set_custom_start(offset)
      } else {
        state.controller.set_custom_end(offset)
      };
      if let Err(err) = res {
        tracing::warn!(session_id, offset, "rejecting custom offset");
        return Err(err);
      }
      current_request(&state, &handle.info)
    };
    handle.debounce.cancel();
    (handle.listener)(request);
    Ok(())
  }

  /// Widen visibility to every partition. Windows are untouched and nothing
  /// is emitted; visibility only affects which partitions future requests and
  /// the display filter cover.
  pub fn select_all_partitions(&self, session_id: &str) -> Result<(), CoreError> {
    let handle = self.session(session_id)?;
    handle.state.lock().selector.select_all();
    Ok(())
  }

  /// Narrow visibility to a single partition of the topic.
  pub fn select_partition(&self, session_id: &str, partition: i32) -> Result<(), CoreError> {
    let handle = self.session(session_id)?;
    let mut state = handle.state.lock();
    if let Err(err) = state.selector.select_one(partition) {
      tracing::warn!(session_id, partition, "rejecting partition selection");
      return Err(err);
    }
    Ok(())
  }

  pub fn visible_partitions(&self, session_id: &str) -> Result<Vec<i32>, CoreError> {
    let handle = self.session(session_id)?;
    let state = handle.state.lock();
    Ok(state.selector.visible())
  }

  /// Keep only the messages on currently visible partitions.
  pub fn filter_messages(
    &self,
    session_id: &str,
    messages: Vec<MessageDetails>,
  ) -> Result<Vec<MessageDetails>, CoreError> {
    let handle = self.session(session_id)?;
    let state = handle.state.lock();
    Ok(
      messages
        .into_iter()
        .filter(|message| state.selector.is_visible(message.partition))
        .collect(),
    )
  }

  /// The request the fetch collaborator should issue right now.
  pub fn current_request(&self, session_id: &str) -> Result<TopicMessagesRequest, CoreError> {
    let handle = self.session(session_id)?;
    let state = handle.state.lock();
    Ok(current_request(&state, &handle.info))
  }

  pub fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, CoreError> {
    let handle = self.session(session_id)?;
    let state = handle.state.lock();
    let config = state.controller.config();
    Ok(SessionSnapshot {
      mode: config.mode,
      message_count: config.message_count,
      custom_start: config.custom_start,
      custom_end: config.custom_end,
      visible_partitions: state.selector.visible(),
      windows: state.controller.windows().to_vec(),
    })
  }

  /// Close a session, cancelling any pending debounced emission.
  pub fn close_topic(&self, session_id: &str) -> Result<(), CoreError> {
    let mut sessions = self.sessions.lock();
    let handle = sessions
      .get(session_id)
      .cloned()
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;
    handle.debounce.cancel();
    sessions.remove(session_id);
    Ok(())
  }

  /// Decode a fetched batch of wire messages into native models.
  pub fn decode_messages(&self, wire: &[WireMessage]) -> Result<Vec<MessageDetails>, CoreError> {
    decode::decode_messages(wire)
  }

  fn session(&self, session_id: &str) -> Result<Arc<SessionHandle>, CoreError> {
    self
      .sessions
      .lock()
      .get(session_id)
      .cloned()
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))
  }
}

/// Debounced emission path: recompute with whatever the latest count is and
/// notify, unless the session has been closed in the meantime. The listener
/// is never invoked while internal locks are held.
fn emit_from_weak(weak: &Weak<SessionHandle>) {
  let handle = match weak.upgrade() {
    Some(handle) => handle,
    None => return,
  };
  let request = {
    let mut state = handle.state.lock();
    state.controller.apply();
    current_request(&state, &handle.info)
  };
  tracing::debug!(session_id = %handle.info.session_id, "emitting debounced range update");
  (handle.listener)(request);
}

fn now_ms() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as i64
}
