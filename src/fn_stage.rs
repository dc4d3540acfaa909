//! Closure-built stages.
//!
//! [`FnStage`] is the factory for ad-hoc stages: an initializer and an
//! integrator are mandatory, a finisher and a combiner are optional. Without
//! a combiner the stage is [`Parallelism::Sequential`]; without a finisher,
//! finishing does nothing.
//!
//! ```rust
//! use gatherweave::{FnStage, Pipeline, Signal};
//!
//! // Emits the running maximum whenever it changes.
//! let running_max = FnStage::<i32, i32, Option<i32>>::new(
//!   || None,
//!   |max, item, downstream| {
//!     if max.map_or(true, |m| item > m) {
//!       *max = Some(item);
//!       return Ok(downstream.push(item));
//!     }
//!     Ok(Signal::Continue)
//!   },
//! )
//! .with_name("running_max".to_string());
//!
//! let out = Pipeline::new(running_max)
//!   .collect(vec![3, 1, 4, 1, 5].into_iter())
//!   .unwrap();
//! assert_eq!(out, vec![3, 4, 5]);
//! ```

use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageError, StageResult};
use crate::signal::Signal;
use crate::stage::{Parallelism, Stage};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type Initializer<S> = Arc<dyn Fn() -> S + Send + Sync>;
type Integrator<T, R, S> =
  Arc<dyn Fn(&mut S, T, &mut dyn Downstream<R>) -> StageResult<Signal> + Send + Sync>;
type Finisher<R, S> = Arc<dyn Fn(S, &mut dyn Downstream<R>) -> StageResult<()> + Send + Sync>;
type Combiner<S> = Arc<dyn Fn(S, S) -> StageResult<S> + Send + Sync>;

/// A stage assembled from closures.
pub struct FnStage<T, R, S> {
  initializer: Initializer<S>,
  integrator: Integrator<T, R, S>,
  finisher: Option<Finisher<R, S>>,
  combiner: Option<Combiner<S>>,
  parallelism: Parallelism,
  name: Option<String>,
  _types: PhantomData<fn(T) -> R>,
}

impl<T, R, S> FnStage<T, R, S> {
  /// Creates a sequential stage from an initializer and an integrator.
  pub fn new<I, G>(initializer: I, integrator: G) -> Self
  where
    I: Fn() -> S + Send + Sync + 'static,
    G: Fn(&mut S, T, &mut dyn Downstream<R>) -> StageResult<Signal> + Send + Sync + 'static,
  {
    Self {
      initializer: Arc::new(initializer),
      integrator: Arc::new(integrator),
      finisher: None,
      combiner: None,
      parallelism: Parallelism::Sequential,
      name: None,
      _types: PhantomData,
    }
  }

  /// Sets the end-of-input flush.
  pub fn with_finisher<F>(mut self, finisher: F) -> Self
  where
    F: Fn(S, &mut dyn Downstream<R>) -> StageResult<()> + Send + Sync + 'static,
  {
    self.finisher = Some(Arc::new(finisher));
    self
  }

  /// Sets a combiner for a stage whose semantics do not depend on input order.
  ///
  /// Declares [`Parallelism::OrderIndependent`].
  pub fn with_combiner<C>(mut self, combiner: C) -> Self
  where
    C: Fn(S, S) -> StageResult<S> + Send + Sync + 'static,
  {
    self.combiner = Some(Arc::new(combiner));
    self.parallelism = Parallelism::OrderIndependent;
    self
  }

  /// Sets a combiner that repairs the boundary between a left partition and
  /// the adjacent right one, for stages whose semantics are order-dependent.
  ///
  /// Declares [`Parallelism::BoundaryReconciling`].
  pub fn with_reconciling_combiner<C>(mut self, combiner: C) -> Self
  where
    C: Fn(S, S) -> StageResult<S> + Send + Sync + 'static,
  {
    self.combiner = Some(Arc::new(combiner));
    self.parallelism = Parallelism::BoundaryReconciling;
    self
  }

  /// Sets the name for this stage.
  pub fn with_name(mut self, name: String) -> Self {
    self.name = Some(name);
    self
  }

  /// Returns the current name, if set.
  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }
}

impl<T, R, S> Clone for FnStage<T, R, S> {
  fn clone(&self) -> Self {
    Self {
      initializer: Arc::clone(&self.initializer),
      integrator: Arc::clone(&self.integrator),
      finisher: self.finisher.clone(),
      combiner: self.combiner.clone(),
      parallelism: self.parallelism,
      name: self.name.clone(),
      _types: PhantomData,
    }
  }
}

impl<T, R, S> fmt::Debug for FnStage<T, R, S> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FnStage")
      .field("name", &self.name)
      .field("parallelism", &self.parallelism)
      .field("has_finisher", &self.finisher.is_some())
      .field("has_combiner", &self.combiner.is_some())
      .finish()
  }
}

impl<T, R, S> Stage<T> for FnStage<T, R, S> {
  type Output = R;
  type State = S;

  fn initialize(&self) -> S {
    (self.initializer)()
  }

  fn integrate(
    &self,
    state: &mut S,
    item: T,
    downstream: &mut dyn Downstream<R>,
  ) -> StageResult<Signal> {
    (self.integrator)(state, item, downstream)
  }

  fn finish(&self, state: S, downstream: &mut dyn Downstream<R>) -> StageResult<()> {
    match &self.finisher {
      Some(finisher) => finisher(state, downstream),
      None => Ok(()),
    }
  }

  fn combine(&self, left: S, right: S) -> StageResult<S> {
    match &self.combiner {
      Some(combiner) => combiner(left, right),
      None => Err(StageError::CombineUnsupported(self.component_info().name)),
    }
  }

  fn parallelism(&self) -> Parallelism {
    self.parallelism
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name(), "fn_stage")
  }
}
