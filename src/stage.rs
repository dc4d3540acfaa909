//! # Stage Trait
//!
//! This module defines the [`Stage`] trait: a stateful, composable processing
//! unit that sits between a source and a sink.
//!
//! ## Overview
//!
//! A stage is a description, not a running thing. It knows how to:
//!
//! - **initialize** a fresh state at the start of every run (or partition)
//! - **integrate** one input element into that state, pushing zero or more
//!   outputs downstream and answering [`Signal::Continue`] or [`Signal::Stop`]
//! - **combine** two partition states into one (parallel runs only)
//! - **finish** by flushing whatever partial result the state still holds
//!
//! State is an explicit owned value. It is handed to `integrate` by `&mut`
//! and to `combine`/`finish` by value, so the stage itself stays immutable
//! and can be run any number of times.
//!
//! ## Parallelism
//!
//! Every stage declares a [`Parallelism`] capability. Stages whose output
//! depends on the order of their input (chunking, consecutive dedup,
//! indexing) are [`Parallelism::Sequential`] unless their combiner reconciles
//! the boundary between adjacent partitions, in which case they declare
//! [`Parallelism::BoundaryReconciling`]. Parallel runs refuse any chain that
//! contains a sequential-only member.
//!
//! ## Example
//!
//! ```rust
//! use gatherweave::{Downstream, Signal, Stage, StageExt, StageResult};
//! use gatherweave::stages::FilterStage;
//!
//! struct Pairs;
//!
//! impl Stage<i32> for Pairs {
//!   type Output = (i32, i32);
//!   type State = Option<i32>;
//!
//!   fn initialize(&self) -> Option<i32> {
//!     None
//!   }
//!
//!   fn integrate(
//!     &self,
//!     state: &mut Option<i32>,
//!     item: i32,
//!     downstream: &mut dyn Downstream<(i32, i32)>,
//!   ) -> StageResult<Signal> {
//!     match state.take() {
//!       Some(first) => Ok(downstream.push((first, item))),
//!       None => {
//!         *state = Some(item);
//!         Ok(Signal::Continue)
//!       }
//!     }
//!   }
//! }
//!
//! let chain = FilterStage::new(|x: &i32| *x > 0).then(Pairs);
//! # let _ = chain;
//! ```

use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageError, StageResult};
use crate::signal::Signal;

/// Whether, and how, a stage's partition states may be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Parallelism {
  /// No combiner, or order-dependent semantics the combiner cannot repair.
  /// Parallel execution is refused.
  Sequential,
  /// The combiner merges partition states and the stage's semantics do not
  /// depend on input order.
  OrderIndependent,
  /// The stage is order-dependent, but its combiner reconciles the boundary
  /// between a left partition and the adjacent right partition.
  BoundaryReconciling,
}

impl Parallelism {
  /// Whether a stage with this capability may run over partitions.
  pub fn allows_parallel(self) -> bool {
    !matches!(self, Parallelism::Sequential)
  }

  /// The capability of two stages chained together: the weaker of the two.
  pub fn and(self, other: Parallelism) -> Parallelism {
    use Parallelism::*;
    match (self, other) {
      (Sequential, _) | (_, Sequential) => Sequential,
      (BoundaryReconciling, _) | (_, BoundaryReconciling) => BoundaryReconciling,
      (OrderIndependent, OrderIndependent) => OrderIndependent,
    }
  }
}

/// A stateful intermediate stage turning `T` inputs into [`Stage::Output`]s.
///
/// See the [module documentation](self) for the lifecycle.
pub trait Stage<T> {
  /// The element type pushed downstream.
  type Output;
  /// The private per-run state.
  type State;

  /// Produces the initial state. Called once per run, or once per partition.
  fn initialize(&self) -> Self::State;

  /// Processes one input element.
  ///
  /// Elements pushed before returning [`Signal::Stop`] are still delivered.
  /// Returning `Err` aborts the run: no further pulls and no finishers.
  fn integrate(
    &self,
    state: &mut Self::State,
    item: T,
    downstream: &mut dyn Downstream<Self::Output>,
  ) -> StageResult<Signal>;

  /// Flushes any partial result at end of input.
  ///
  /// Runs exactly once per run, including after this or another stage
  /// returned [`Signal::Stop`].
  fn finish(
    &self,
    state: Self::State,
    downstream: &mut dyn Downstream<Self::Output>,
  ) -> StageResult<()> {
    let _ = (state, downstream);
    Ok(())
  }

  /// Merges the states of two adjacent partitions, `left` preceding `right`.
  ///
  /// Must be associative. The default refuses.
  fn combine(&self, left: Self::State, right: Self::State) -> StageResult<Self::State> {
    let _ = (left, right);
    Err(StageError::CombineUnsupported(self.component_info().name))
  }

  /// The stage's merge capability.
  fn parallelism(&self) -> Parallelism {
    Parallelism::Sequential
  }

  /// Name and type used in errors and log fields.
  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(None, "stage")
  }
}

impl<T, G> Stage<T> for &G
where
  G: Stage<T> + ?Sized,
{
  type Output = G::Output;
  type State = G::State;

  fn initialize(&self) -> Self::State {
    (**self).initialize()
  }

  fn integrate(
    &self,
    state: &mut Self::State,
    item: T,
    downstream: &mut dyn Downstream<Self::Output>,
  ) -> StageResult<Signal> {
    (**self).integrate(state, item, downstream)
  }

  fn finish(
    &self,
    state: Self::State,
    downstream: &mut dyn Downstream<Self::Output>,
  ) -> StageResult<()> {
    (**self).finish(state, downstream)
  }

  fn combine(&self, left: Self::State, right: Self::State) -> StageResult<Self::State> {
    (**self).combine(left, right)
  }

  fn parallelism(&self) -> Parallelism {
    (**self).parallelism()
  }

  fn component_info(&self) -> ComponentInfo {
    (**self).component_info()
  }
}

/// Composition helpers available on every stage.
pub trait StageExt<T>: Stage<T> + Sized {
  /// Chains `next` after this stage: outputs of `self` become inputs of `next`.
  ///
  /// Composition is associative: `a.then(b).then(c)` and
  /// `a.then(b.then(c))` produce the same outputs and pull the source the
  /// same number of times.
  fn then<B>(self, next: B) -> crate::chain::Chain<Self, B>
  where
    B: Stage<Self::Output>,
  {
    crate::chain::Chain::new(self, next)
  }
}

impl<T, G: Stage<T>> StageExt<T> for G {}
