use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageResult};
use crate::signal::Signal;
use crate::stage::{Parallelism, Stage};
use std::marker::PhantomData;

/// A stage that expands each input into zero or more outputs.
///
/// Expansion stops as soon as the downstream stops, so an infinite
/// expansion followed by a limit terminates.
pub struct FlatMapStage<F, T> {
  f: F,
  name: Option<String>,
  _input: PhantomData<fn(T)>,
}

impl<F, T, I> FlatMapStage<F, T>
where
  F: Fn(T) -> I,
  I: IntoIterator,
{
  /// Creates a new `FlatMapStage` with the given expansion.
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

impl<F, T, I> Stage<T> for FlatMapStage<F, T>
where
  F: Fn(T) -> I,
  I: IntoIterator,
{
  type Output = I::Item;
  type State = ();

  fn initialize(&self) {}

  fn integrate(
    &self,
    _state: &mut (),
    item: T,
    downstream: &mut dyn Downstream<I::Item>,
  ) -> StageResult<Signal> {
    for output in (self.f)(item) {
      if downstream.push(output).is_stop() {
        return Ok(Signal::Stop);
      }
    }
    Ok(Signal::Continue)
  }

  fn combine(&self, _left: (), _right: ()) -> StageResult<()> {
    Ok(())
  }

  fn parallelism(&self) -> Parallelism {
    Parallelism::OrderIndependent
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "flat_map")
  }
}
