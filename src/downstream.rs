//! # Boundaries
//!
//! The three interfaces elements cross on their way through a pipeline:
//!
//! - [`Source`]: pull-based producer of input elements. Every [`Iterator`] is one.
//! - [`Downstream`]: the emit handle a stage pushes its outputs into.
//! - [`Sink`]: push-based terminal consumer. Every `FnMut(R)` closure is one.

use crate::signal::Signal;
use std::collections::VecDeque;

/// A lazy, non-restartable sequence of input elements.
///
/// The engine calls [`pull`](Source::pull) once per element it needs and never
/// more than once for the same logical position. A source that wants a
/// timeout or external cancellation simply returns `None`, which the pipeline
/// treats as ordinary exhaustion.
pub trait Source<T> {
  /// Produces the next element, or `None` once the source is exhausted.
  fn pull(&mut self) -> Option<T>;
}

impl<I: Iterator> Source<I::Item> for I {
  fn pull(&mut self) -> Option<I::Item> {
    self.next()
  }
}

/// Terminal consumer of a pipeline's outputs.
pub trait Sink<R> {
  /// Accepts one output element.
  fn accept(&mut self, item: R);
}

impl<R, F: FnMut(R)> Sink<R> for F {
  fn accept(&mut self, item: R) {
    self(item)
  }
}

/// The emit handle passed to [`Stage::integrate`](crate::stage::Stage::integrate)
/// and [`Stage::finish`](crate::stage::Stage::finish).
///
/// Each pushed element is processed by the rest of the chain before `push`
/// returns. The returned [`Signal`] reports whether the receiving side wants
/// more: once a downstream stage has stopped, further pushes are dropped and
/// answer [`Signal::Stop`].
pub trait Downstream<R> {
  /// Delivers one element to the receiving side.
  fn push(&mut self, item: R) -> Signal;

  /// Whether the receiving side will drop anything pushed from now on.
  fn is_rejecting(&self) -> bool {
    false
  }
}

/// A closure downstream; it never rejects.
impl<R, F: FnMut(R)> Downstream<R> for F {
  fn push(&mut self, item: R) -> Signal {
    self(item);
    Signal::Continue
  }
}

/// Downstream that forwards to a [`Sink`] and counts deliveries.
pub(crate) struct SinkDownstream<'a, K> {
  sink: &'a mut K,
  delivered: u64,
}

impl<'a, K> SinkDownstream<'a, K> {
  pub(crate) fn new(sink: &'a mut K) -> Self {
    Self { sink, delivered: 0 }
  }

  pub(crate) fn delivered(&self) -> u64 {
    self.delivered
  }
}

impl<R, K: Sink<R>> Downstream<R> for SinkDownstream<'_, K> {
  fn push(&mut self, item: R) -> Signal {
    self.sink.accept(item);
    self.delivered += 1;
    Signal::Continue
  }
}

/// Downstream that queues outputs for a lazy driver to hand out one by one.
pub(crate) struct Buffer<R> {
  items: VecDeque<R>,
}

impl<R> Buffer<R> {
  pub(crate) fn new() -> Self {
    Self {
      items: VecDeque::new(),
    }
  }

  pub(crate) fn pop(&mut self) -> Option<R> {
    self.items.pop_front()
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub(crate) fn len(&self) -> usize {
    self.items.len()
  }

  pub(crate) fn into_vec(self) -> Vec<R> {
    self.items.into()
  }
}

impl<R> Downstream<R> for Buffer<R> {
  fn push(&mut self, item: R) -> Signal {
    self.items.push_back(item);
    Signal::Continue
  }
}
