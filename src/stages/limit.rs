use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageResult};
use crate::signal::Signal;
use crate::stage::Stage;
use std::marker::PhantomData;

/// A stage that passes on the first `limit` inputs, then stops.
///
/// It answers `Stop` together with the last admitted input, so the source is
/// pulled exactly `limit` times. With a limit of zero the first input is
/// dropped and the stage stops right away.
pub struct LimitStage<T> {
  limit: usize,
  name: Option<String>,
  _input: PhantomData<fn(T)>,
}

impl<T> LimitStage<T> {
  /// Creates a new `LimitStage` admitting `limit` inputs.
  pub fn new(limit: usize) -> Self {
    Self {
      limit,
      name: None,
      _input: PhantomData,
    }
  }

  /// Sets the name for this stage.
  pub fn with_name(mut self, name: String) -> Self {
    self.name = Some(name);
    self
  }

  /// Returns the configured limit.
  pub fn limit(&self) -> usize {
    self.limit
  }
}

impl<T> Clone for LimitStage<T> {
  fn clone(&self) -> Self {
    Self {
      limit: self.limit,
      name: self.name.clone(),
      _input: PhantomData,
    }
  }
}

impl<T> Stage<T> for LimitStage<T> {
  type Output = T;
  /// Inputs admitted so far.
  type State = usize;

  fn initialize(&self) -> usize {
    0
  }

  fn integrate(&self, taken: &mut usize, item: T, downstream: &mut dyn Downstream<T>) -> StageResult<Signal> {
    if *taken >= self.limit {
      return Ok(Signal::Stop);
    }
    *taken += 1;
    let signal = downstream.push(item);
    Ok(signal.and(Signal::continue_if(*taken < self.limit)))
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "limit")
  }
}
