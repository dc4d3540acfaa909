use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageResult};
use crate::signal::Signal;
use crate::stage::{Parallelism, Stage};
use std::marker::PhantomData;

/// A stage that calls a side effect on each input and passes it on unchanged.
pub struct InspectStage<F, T> {
  f: F,
  name: Option<String>,
  _input: PhantomData<fn(T)>,
}

impl<F, T> InspectStage<F, T>
where
  F: Fn(&T),
{
  /// Creates a new `InspectStage` with the given side effect.
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

impl<F, T> Stage<T> for InspectStage<F, T>
where
  F: Fn(&T),
{
  type Output = T;
  type State = ();

  fn initialize(&self) {}

  fn integrate(&self, _state: &mut (), item: T, downstream: &mut dyn Downstream<T>) -> StageResult<Signal> {
    (self.f)(&item);
    Ok(downstream.push(item))
  }

  fn combine(&self, _left: (), _right: ()) -> StageResult<()> {
    Ok(())
  }

  fn parallelism(&self) -> Parallelism {
    Parallelism::OrderIndependent
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "inspect")
  }
}
