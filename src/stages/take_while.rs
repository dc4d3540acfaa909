use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageResult};
use crate::signal::Signal;
use crate::stage::Stage;
use std::marker::PhantomData;

/// A stage that passes on inputs while a predicate holds and stops at the
/// first input that fails it. That input is dropped.
pub struct TakeWhileStage<F, T> {
  predicate: F,
  name: Option<String>,
  _input: PhantomData<fn(T)>,
}

impl<F, T> TakeWhileStage<F, T>
where
  F: Fn(&T) -> bool,
{
  /// Creates a new `TakeWhileStage` with the given predicate.
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

impl<F, T> Stage<T> for TakeWhileStage<F, T>
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
      Ok(Signal::Stop)
    }
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "take_while")
  }
}
