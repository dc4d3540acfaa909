//! Consecutive deduplication.
//!
//! Two flavors share one state type:
//!
//! - [`DedupStage::streaming`] emits each input as soon as it differs from
//!   the previous one. It is order-dependent and refuses parallel runs.
//! - [`DedupStage::reconciling`] keeps the deduplicated run in its state and
//!   emits it at finish. Its combiner drops the right partition's first
//!   element when it equals the left partition's last, so a run split across
//!   a partition boundary collapses exactly as it would sequentially.

use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageError, StageResult};
use crate::signal::Signal;
use crate::stage::{Parallelism, Stage};
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
  Streaming,
  Reconciling,
}

/// A stage that drops inputs equal to the input right before them.
pub struct DedupStage<T> {
  mode: Mode,
  name: Option<String>,
  _input: PhantomData<fn(T)>,
}

/// Per-run state of a [`DedupStage`].
#[derive(Debug, Clone, PartialEq)]
pub struct DedupState<T> {
  last: Option<T>,
  kept: Vec<T>,
}

impl<T> DedupState<T> {
  /// The most recent distinct input.
  pub fn last(&self) -> Option<&T> {
    self.last.as_ref()
  }

  /// Inputs held back for emission at finish (reconciling mode only).
  pub fn kept(&self) -> &[T] {
    &self.kept
  }
}

impl<T> DedupStage<T> {
  /// Creates a dedup stage that emits eagerly.
  pub fn streaming() -> Self {
    Self {
      mode: Mode::Streaming,
      name: None,
      _input: PhantomData,
    }
  }

  /// Creates a dedup stage that emits at finish and can be merged across
  /// adjacent partitions.
  pub fn reconciling() -> Self {
    Self {
      mode: Mode::Reconciling,
      name: None,
      _input: PhantomData,
    }
  }

  /// Sets the name for this stage.
  pub fn with_name(mut self, name: String) -> Self {
    self.name = Some(name);
    self
  }
}

impl<T> Clone for DedupStage<T> {
  fn clone(&self) -> Self {
    Self {
      mode: self.mode,
      name: self.name.clone(),
      _input: PhantomData,
    }
  }
}

impl<T: PartialEq + Clone> Stage<T> for DedupStage<T> {
  type Output = T;
  type State = DedupState<T>;

  fn initialize(&self) -> DedupState<T> {
    DedupState {
      last: None,
      kept: Vec::new(),
    }
  }

  fn integrate(
    &self,
    state: &mut DedupState<T>,
    item: T,
    downstream: &mut dyn Downstream<T>,
  ) -> StageResult<Signal> {
    if state.last.as_ref() == Some(&item) {
      return Ok(Signal::Continue);
    }
    state.last = Some(item.clone());
    match self.mode {
      Mode::Streaming => Ok(downstream.push(item)),
      Mode::Reconciling => {
        state.kept.push(item);
        Ok(Signal::Continue)
      }
    }
  }

  fn finish(&self, state: DedupState<T>, downstream: &mut dyn Downstream<T>) -> StageResult<()> {
    for item in state.kept {
      if downstream.push(item).is_stop() {
        break;
      }
    }
    Ok(())
  }

  fn combine(&self, mut left: DedupState<T>, right: DedupState<T>) -> StageResult<DedupState<T>> {
    if self.mode == Mode::Streaming {
      return Err(StageError::CombineUnsupported(self.component_info().name));
    }
    let mut kept = right.kept.into_iter().peekable();
    if left.kept.last().is_some() && left.kept.last() == kept.peek() {
      kept.next();
    }
    left.kept.extend(kept);
    if right.last.is_some() {
      left.last = right.last;
    }
    Ok(left)
  }

  fn parallelism(&self) -> Parallelism {
    match self.mode {
      Mode::Streaming => Parallelism::Sequential,
      Mode::Reconciling => Parallelism::BoundaryReconciling,
    }
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "dedup")
  }
}
