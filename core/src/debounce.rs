use std::{
  sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
  },
  thread,
  time::Duration,
};

/// A single-slot cancellable timer: at most one pending callback at a time.
///
/// Each `schedule` replaces whatever was pending; a superseded or cancelled
/// sleeper wakes, sees a stale generation and exits without side effects.
/// Dropping the timer cancels the slot.
pub(crate) struct Debouncer {
  window: Duration,
  generation: Arc<AtomicU64>,
}

impl Debouncer {
  pub(crate) fn new(window: Duration) -> Self {
    Self {
      window,
      generation: Arc::new(AtomicU64::new(0)),
    }
  }

  pub(crate) fn schedule(&self, callback: impl FnOnce() + Send + 'static) {
    let scheduled = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
    let generation = self.generation.clone();
    let window = self.window;
    thread::spawn(move || {
      thread::sleep(window);
      if generation.load(Ordering::SeqCst) == scheduled {
        callback();
      }
    });
  }

  /// Invalidate any pending callback without scheduling a new one.
  pub(crate) fn cancel(&self) {
    self.generation.fetch_add(1, Ordering::SeqCst);
  }
}

impl Drop for Debouncer {
  fn drop(&mut self) {
    self.cancel();
  }
}
