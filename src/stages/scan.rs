use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageResult};
use crate::signal::Signal;
use crate::stage::Stage;
use std::marker::PhantomData;

/// A stage that emits every running accumulation.
///
/// `[1, 2, 3]` scanned with `+` from 0 yields `[1, 3, 6]`.
pub struct ScanStage<F, A, T> {
  initial: A,
  f: F,
  name: Option<String>,
  _input: PhantomData<fn(T)>,
}

impl<F, A, T> ScanStage<F, A, T>
where
  F: Fn(&A, T) -> A,
  A: Clone,
{
  /// Creates a new `ScanStage` starting every run from `initial`.
  pub fn new(initial: A, f: F) -> Self {
    Self {
      initial,
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

impl<F, A, T> Stage<T> for ScanStage<F, A, T>
where
  F: Fn(&A, T) -> A,
  A: Clone,
{
  type Output = A;
  type State = A;

  fn initialize(&self) -> A {
    self.initial.clone()
  }

  fn integrate(&self, acc: &mut A, item: T, downstream: &mut dyn Downstream<A>) -> StageResult<Signal> {
    *acc = (self.f)(acc, item);
    Ok(downstream.push(acc.clone()))
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "scan")
  }
}
