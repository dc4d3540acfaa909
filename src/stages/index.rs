use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageResult};
use crate::signal::Signal;
use crate::stage::Stage;
use std::marker::PhantomData;

/// A stage that pairs each input with its position in the run, from 0.
///
/// The counter lives in the run's state, so every run starts over at 0.
pub struct IndexStage<T> {
  name: Option<String>,
  _input: PhantomData<fn(T)>,
}

impl<T> Default for IndexStage<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> IndexStage<T> {
  /// Creates a new `IndexStage`.
  pub fn new() -> Self {
    Self {
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

impl<T> Clone for IndexStage<T> {
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      _input: PhantomData,
    }
  }
}

impl<T> Stage<T> for IndexStage<T> {
  type Output = (T, usize);
  type State = usize;

  fn initialize(&self) -> usize {
    0
  }

  fn integrate(
    &self,
    next: &mut usize,
    item: T,
    downstream: &mut dyn Downstream<(T, usize)>,
  ) -> StageResult<Signal> {
    let index = *next;
    *next += 1;
    Ok(downstream.push((item, index)))
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "index")
  }
}
