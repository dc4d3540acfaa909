use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageResult};
use crate::signal::Signal;
use crate::stage::{Parallelism, Stage};
use std::marker::PhantomData;

/// A stage that passes on only the inputs matching a predicate.
pub struct FilterStage<F, T> {
  predicate: F,
  name: Option<String>,
  _input: PhantomData<fn(T)>,
}

impl<F, T> FilterStage<F, T>
where
  F: Fn(&T) -> bool,
{
  /// Creates a new `FilterStage` with the given predicate.
  pub fn new(predicate: F) -> Self {
    Self {
      predicate,
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

impl<F: Clone, T> Clone for FilterStage<F, T> {
  fn clone(&self) -> Self {
    Self {
      predicate: self.predicate.clone(),
      name: self.name.clone(),
      _input: PhantomData,
    }
  }
}

impl<F, T> Stage<T> for FilterStage<F, T>
where
  F: Fn(&T) -> bool,
{
  type Output = T;
  type State = ();

  fn initialize(&self) {}

  fn integrate(&self, _state: &mut (), item: T, downstream: &mut dyn Downstream<T>) -> StageResult<Signal> {
    if (self.predicate)(&item) {
      Ok(downstream.push(item))
    } else {
      Ok(Signal::Continue)
    }
  }

  fn combine(&self, _left: (), _right: ()) -> StageResult<()> {
    Ok(())
  }

  fn parallelism(&self) -> Parallelism {
    Parallelism::OrderIndependent
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "filter")
  }
}
