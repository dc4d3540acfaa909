//! # Async Stream Driver
//!
//! [`GatherStream`] runs a stage over a [`futures::Stream`]. The inner stream
//! is polled only when the consumer polls for an output and no output from an
//! earlier element is still waiting; a `Stop` ends polling of the inner
//! stream for good.
//!
//! The stage itself stays synchronous. Only pulling is async.
//!
//! ## Example
//!
//! ```rust
//! use futures::{StreamExt, stream};
//! use gatherweave::GatherStreamExt;
//! use gatherweave::stages::ChunkStage;
//!
//! # futures::executor::block_on(async {
//! let chunks: Vec<Vec<i32>> = stream::iter(1..=5)
//!   .gather_stream(ChunkStage::new(2))
//!   .map(Result::unwrap)
//!   .collect()
//!   .await;
//! assert_eq!(chunks, vec![vec![1, 2], vec![3, 4], vec![5]]);
//! # });
//! ```

use crate::downstream::Buffer;
use crate::error::PipelineError;
use crate::execution::{Execution, RunState};
use crate::signal::Signal;
use crate::stage::Stage;
use futures::stream::{FusedStream, Stream};
use futures::{ready, task::Context, task::Poll};
use pin_project::pin_project;
use std::pin::Pin;

/// Stream adapter running a stage over an inner stream.
///
/// Yields the same sequence as [`Gathered`](crate::iter::Gathered) would for
/// the same elements.
#[pin_project]
pub struct GatherStream<S, G>
where
  S: Stream,
  G: Stage<S::Item>,
{
  #[pin]
  source: S,
  execution: Execution<S::Item, G>,
  buffer: Buffer<G::Output>,
  pending_error: Option<PipelineError>,
  done: bool,
}

impl<S, G> GatherStream<S, G>
where
  S: Stream,
  G: Stage<S::Item>,
{
  /// Starts a run of `stage` over `source`. Nothing is polled yet.
  pub fn new(source: S, stage: G) -> Self {
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

  /// Elements pulled from the inner stream so far.
  pub fn pulled(&self) -> u64 {
    self.execution.pulled()
  }
}

impl<S, G> Stream for GatherStream<S, G>
where
  S: Stream,
  G: Stage<S::Item>,
{
  type Item = Result<G::Output, PipelineError>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let mut this = self.project();
    loop {
      if let Some(item) = this.buffer.pop() {
        return Poll::Ready(Some(Ok(item)));
      }
      if let Some(error) = this.pending_error.take() {
        *this.done = true;
        return Poll::Ready(Some(Err(error)));
      }
      if *this.done {
        return Poll::Ready(None);
      }

      let next = ready!(this.source.as_mut().poll_next(cx));
      let outcome = match next {
        Some(item) => match this.execution.feed(item, &mut *this.buffer) {
          Ok(Signal::Continue) => continue,
          Ok(Signal::Stop) => this.execution.complete(&mut *this.buffer),
          Err(error) => Err(error),
        },
        None => this.execution.complete(&mut *this.buffer),
      };
      *this.done = true;
      if let Err(error) = outcome {
        *this.pending_error = Some(error);
      }
    }
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    if self.done && self.pending_error.is_none() {
      (self.buffer.len(), Some(self.buffer.len()))
    } else {
      (self.buffer.len(), None)
    }
  }
}

impl<S, G> FusedStream for GatherStream<S, G>
where
  S: Stream,
  G: Stage<S::Item>,
{
  fn is_terminated(&self) -> bool {
    self.done && self.buffer.is_empty() && self.pending_error.is_none()
  }
}

/// Adds [`gather_stream`](GatherStreamExt::gather_stream) to every stream.
pub trait GatherStreamExt: Stream + Sized {
  /// Runs `stage` over this stream.
  fn gather_stream<G>(self, stage: G) -> GatherStream<Self, G>
  where
    G: Stage<Self::Item>,
  {
    GatherStream::new(self, stage)
  }
}

impl<S: Stream> GatherStreamExt for S {}
