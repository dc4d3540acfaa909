use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageResult};
use crate::signal::Signal;
use crate::stage::{Parallelism, Stage};
use std::marker::PhantomData;

/// A stage that applies a function to each input.
///
/// Stateless, so partition states merge trivially.
pub struct MapStage<F, T> {
  f: F,
  name: Option<String>,
  _input: PhantomData<fn(T)>,
}

impl<F, T, R> MapStage<F, T>
where
  F: Fn(T) -> R,
{
  /// Creates a new `MapStage` with the given function.
  pub fn new(f: F) -> Self {
    Self {
      f,
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

impl<F: Clone, T> Clone for MapStage<F, T> {
  fn clone(&self) -> Self {
    Self {
      f: self.f.clone(),
      name: self.name.clone(),
      _input: PhantomData,
    }
  }
}

impl<F, T, R> Stage<T> for MapStage<F, T>
where
  F: Fn(T) -> R,
{
  type Output = R;
  type State = ();

  fn initialize(&self) {}

  fn integrate(&self, _state: &mut (), item: T, downstream: &mut dyn Downstream<R>) -> StageResult<Signal> {
    Ok(downstream.push((self.f)(item)))
  }

  fn combine(&self, _left: (), _right: ()) -> StageResult<()> {
    Ok(())
  }

  fn parallelism(&self) -> Parallelism {
    Parallelism::OrderIndependent
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "map")
  }
}
