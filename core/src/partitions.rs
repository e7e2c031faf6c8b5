use crate::engine::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
  All,
  One(i32),
}

/// Resolves which partitions of an open topic are visible.
///
/// Pure derived state over the fixed partition set; selection changes never
/// touch the offset windows and never trigger a fetch on their own.
pub(crate) struct PartitionSelector {
  partitions: Vec<i32>,
  selection: Selection,
}

impl PartitionSelector {
  pub(crate) fn new(num_partitions: i32) -> Self {
    Self {
      partitions: (0..num_partitions.max(0)).collect(),
      selection: Selection::All,
    }
  }

  pub(crate) fn select_all(&mut self) {
    self.selection = Selection::All;
  }

  /// Narrow visibility to one partition; unknown indices are rejected and the
  /// previous selection stays in place.
  pub(crate) fn select_one(&mut self, partition: i32) -> Result<(), CoreError> {
    if !self.partitions.contains(&partition) {
      return Err(CoreError::UnknownPartition(partition));
    }
    self.selection = Selection::One(partition);
    Ok(())
  }

  /// Visible partitions in ascending order.
  pub(crate) fn visible(&self) -> Vec<i32> {
    match self.selection {
      Selection::All => self.partitions.clone(),
      Selection::One(partition) => vec![partition],
    }
  }

  pub(crate) fn is_visible(&self, partition: i32) -> bool {
    match self.selection {
      Selection::All => self.partitions.contains(&partition),
      Selection::One(selected) => selected == partition,
    }
  }
}
