//! Lazy, consumer-driven execution over an [`Iterator`].
//!
//! [`Gathered`] only pulls from its source when its own consumer asks for the
//! next output and nothing is left over from the previous pull. A stage that
//! emits several outputs for one input hands them out one by one before the
//! next pull.
//!
//! ```rust
//! use gatherweave::GatherExt;
//! use gatherweave::stages::LimitStage;
//!
//! let mut pulled = 0;
//! let firsts: Vec<u64> = (1..)
//!   .inspect(|_| pulled += 1)
//!   .gather(LimitStage::new(3))
//!   .map(Result::unwrap)
//!   .collect();
//! assert_eq!(firsts, vec![1, 2, 3]);
//! assert_eq!(pulled, 3);
//! ```

use crate::downstream::Buffer;
use crate::error::PipelineError;
use crate::execution::{Execution, RunState};
use crate::signal::Signal;
use crate::stage::Stage;
use std::fmt;
use std::iter::FusedIterator;

/// Iterator adapter running a stage over an inner iterator.
///
/// Yields `Ok(output)` for every output in order. If a stage fails, outputs
/// emitted before the failure are yielded first, then the error once, then
/// `None`.
pub struct Gathered<I, G>
where
  I: Iterator,
  G: Stage<I::Item>,
{
  source: I,
  execution: Execution<I::Item, G>,
  buffer: Buffer<G::Output>,
  pending_error: Option<PipelineError>,
  done: bool,
}

impl<I, G> Gathered<I, G>
where
  I: Iterator,
  G: Stage<I::Item>,
{
  /// Starts a run of `stage` over `source`. Nothing is pulled yet.
  pub fn new(source: I, stage: G) -> Self {
    Self {
      source,
      execution: Execution::new(stage),
      buffer: Buffer::new(),
      pending_error: None,
      done: false,
    }
  }

  /// Lifecycle state of the underlying run.
  pub fn run_state(&self) -> RunState {
    self.execution.run_state()
  }

  /// Elements pulled from the source so far.
  pub fn pulled(&self) -> u64 {
    self.execution.pulled()
  }

  fn complete(&mut self) {
    self.done = true;
    if let Err(error) = self.execution.complete(&mut self.buffer) {
      self.pending_error = Some(error);
    }
  }
}

impl<I, G> Iterator for Gathered<I, G>
where
  I: Iterator,
  G: Stage<I::Item>,
{
  type Item = Result<G::Output, PipelineError>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if let Some(item) = self.buffer.pop() {
        return Some(Ok(item));
      }
      if let Some(error) = self.pending_error.take() {
        self.done = true;
        return Some(Err(error));
      }
      if self.done {
        return None;
      }
      match self.source.next() {
        Some(item) => match self.execution.feed(item, &mut self.buffer) {
          Ok(Signal::Continue) => {}
          Ok(Signal::Stop) => self.complete(),
          Err(error) => {
            self.done = true;
            self.pending_error = Some(error);
          }
        },
        None => self.complete(),
      }
    }
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    if self.done && self.pending_error.is_none() {
      let buffered = self.buffer.len();
      (buffered, Some(buffered))
    } else {
      (self.buffer.len(), None)
    }
  }
}

impl<I, G> FusedIterator for Gathered<I, G>
where
  I: Iterator,
  G: Stage<I::Item>,
{
}

impl<I, G> fmt::Debug for Gathered<I, G>
where
  I: Iterator,
  G: Stage<I::Item>,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Gathered")
      .field("execution", &self.execution)
      .field("buffered", &self.buffer.len())
      .field("done", &self.done)
      .finish()
  }
}

/// Adds [`gather`](GatherExt::gather) to every iterator.
pub trait GatherExt: Iterator + Sized {
  /// Runs `stage` lazily over this iterator.
  fn gather<G>(self, stage: G) -> Gathered<Self, G>
  where
    G: Stage<Self::Item>,
  {
    Gathered::new(self, stage)
  }
}

impl<I: Iterator> GatherExt for I {}
