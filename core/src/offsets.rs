use crate::{
  engine::CoreError,
  models::{OffsetMode, PartitionWindow},
};

/// The three inputs the window derivation depends on, as one explicit value.
///
/// Custom bounds are seeded lazily: on the first switch into
/// `OffsetMode::Custom` they take the range the previous mode had computed,
/// and afterwards keep whatever the user last entered.
#[derive(Debug, Clone)]
pub(crate) struct OffsetConfig {
  pub mode: OffsetMode,
  pub message_count: i64,
  pub custom_start: Option<i64>,
  pub custom_end: Option<i64>,
}

/// Derive the `(start, end)` pair for a configuration.
///
/// - `Latest`: the most recent `message_count` records, `(-count, -1)`.
/// - `Earliest`: the first `message_count` records, `(0, count - 1)`.
/// - `Custom`: the stored bounds verbatim. `start <= end` is deliberately not
///   checked; an inverted range is the platform's to reject.
pub(crate) fn derived_window(config: &OffsetConfig) -> (i64, i64) {
  match config.mode {
    OffsetMode::Latest => (-config.message_count, -1),
    OffsetMode::Earliest => (0, config.message_count - 1),
    OffsetMode::Custom => (
      config.custom_start.unwrap_or(-config.message_count),
      config.custom_end.unwrap_or(-1),
    ),
  }
}

/// Owns the offset windows of one session and keeps them consistent with the
/// configuration. Purely synchronous; debouncing and emission live with the
/// session that owns this controller.
pub(crate) struct OffsetRangeController {
  config: OffsetConfig,
  windows: Vec<PartitionWindow>,
}

impl OffsetRangeController {
  pub(crate) fn new(num_partitions: i32, mode: OffsetMode, message_count: i64) -> Self {
    let mut controller = Self {
      config: OffsetConfig {
        mode,
        message_count,
        custom_start: None,
        custom_end: None,
      },
      windows: (0..num_partitions.max(0))
        .map(|partition| PartitionWindow {
          partition,
          start_offset: 0,
          end_offset: 0,
        })
        .collect(),
    };
    controller.apply();
    controller
  }

  pub(crate) fn config(&self) -> &OffsetConfig {
    &self.config
  }

  pub(crate) fn windows(&self) -> &[PartitionWindow] {
    &self.windows
  }

  /// Switch the active mode and recompute every window.
  pub(crate) fn set_mode(&mut self, mode: OffsetMode) {
    if mode == OffsetMode::Custom {
      let (start, end) = derived_window(&self.config);
      self.config.custom_start.get_or_insert(start);
      self.config.custom_end.get_or_insert(end);
    }
    self.config.mode = mode;
    self.apply();
  }

  /// Store a new message count. The windows are left as-is; the owner
  /// recomputes via `apply` once the debounce quiet window elapses.
  pub(crate) fn set_message_count(&mut self, count: i64) -> Result<(), CoreError> {
    if count <= 0 {
      return Err(CoreError::InvalidMessageCount(count));
    }
    self.config.message_count = count;
    Ok(())
  }

  pub(crate) fn set_custom_start(&mut self, offset: i64) -> Result<(), CoreError> {
    self.check_custom_input(offset)?;
    self.config.custom_start = Some(offset);
    self.apply();
    Ok(())
  }

  pub(crate) fn set_custom_end(&mut self, offset: i64) -> Result<(), CoreError> {
    self.check_custom_input(offset)?;
    self.config.custom_end = Some(offset);
    self.apply();
    Ok(())
  }

  fn check_custom_input(&self, offset: i64) -> Result<(), CoreError> {
    if self.config.mode != OffsetMode::Custom {
      return Err(CoreError::NotCustomMode);
    }
    // Zero has always been refused as a custom bound even though 0 is a legal
    // absolute position; lifting that needs product sign-off.
    if offset == 0 {
      return Err(CoreError::InvalidCustomOffset(offset));
    }
    Ok(())
  }

  /// Recompute all windows from the current configuration.
  pub(crate) fn apply(&mut self) {
    let (start_offset, end_offset) = derived_window(&self.config);
    for window in &mut self.windows {
      window.start_offset = start_offset;
      window.end_offset = end_offset;
    }
  }
}
