// core/src/assembly/stage.rs

//! Stages an order passes through while it is being assembled.

use crate::error::{OrderError, OrderResult};
use tracing::{event, Level};

/// `Received → Validated → StockChecked → Committed`, or from any non-terminal
/// stage to `Aborted`. Nothing durable exists before `Committed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStage {
  Received,
  Validated,
  StockChecked,
  Committed,
  Aborted,
}

impl AssemblyStage {
  pub fn is_terminal(self) -> bool {
    matches!(self, AssemblyStage::Committed | AssemblyStage::Aborted)
  }

  pub fn can_advance_to(self, next: AssemblyStage) -> bool {
    use AssemblyStage::*;
    matches!(
      (self, next),
      (Received, Validated) | (Validated, StockChecked) | (StockChecked, Committed)
    ) || (!self.is_terminal() && next == Aborted)
  }
}

/// Tracks one assembly attempt. Attempts are not retried; a new request starts over
/// at `Received`.
#[derive(Debug)]
pub(crate) struct StageTracker {
  stage: AssemblyStage,
}

impl StageTracker {
  pub(crate) fn new() -> Self {
    Self {
      stage: AssemblyStage::Received,
    }
  }

  pub(crate) fn stage(&self) -> AssemblyStage {
    self.stage
  }

  pub(crate) fn advance(&mut self, next: AssemblyStage) -> OrderResult<()> {
    if !self.stage.can_advance_to(next) {
      return Err(OrderError::Internal(format!(
        "illegal assembly transition {:?} -> {:?}",
        self.stage, next
      )));
    }
    event!(Level::DEBUG, from = ?self.stage, to = ?next, "Assembly stage advanced.");
    self.stage = next;
    Ok(())
  }

  /// Moves to `Aborted` unless the attempt already ended.
  pub(crate) fn abort(&mut self) {
    if !self.stage.is_terminal() {
      event!(Level::DEBUG, from = ?self.stage, "Assembly aborted.");
      self.stage = AssemblyStage::Aborted;
    }
  }
}
