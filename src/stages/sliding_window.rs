use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageError, StageResult};
use crate::signal::Signal;
use crate::stage::Stage;
use std::collections::VecDeque;
use std::marker::PhantomData;

/// A stage that emits every window of `size` consecutive inputs.
///
/// `[1, 2, 3, 4]` with size 2 yields `[1, 2]`, `[2, 3]`, `[3, 4]`. If the
/// input is shorter than one window, the finisher emits the short window
/// instead; an empty input yields nothing.
pub struct SlidingWindowStage<T> {
  size: usize,
  name: Option<String>,
  _input: PhantomData<fn(T)>,
}

/// Per-run state of a [`SlidingWindowStage`]: the current window and
/// whether a full window was ever emitted.
pub struct WindowState<T> {
  window: VecDeque<T>,
  emitted: bool,
}

impl<T> SlidingWindowStage<T> {
  /// Creates a new `SlidingWindowStage` with the given window size.
  pub fn new(size: usize) -> Self {
    Self {
      size,
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

impl<T: Clone> Stage<T> for SlidingWindowStage<T> {
  type Output = Vec<T>;
  type State = WindowState<T>;

  fn initialize(&self) -> WindowState<T> {
    WindowState {
      window: VecDeque::with_capacity(self.size),
      emitted: false,
    }
  }

  fn integrate(
    &self,
    state: &mut WindowState<T>,
    item: T,
    downstream: &mut dyn Downstream<Vec<T>>,
  ) -> StageResult<Signal> {
    if self.size == 0 {
      return Err(StageError::InvalidArgument(
        "window size must be greater than zero".to_string(),
      ));
    }
    if state.window.len() == self.size {
      state.window.pop_front();
    }
    state.window.push_back(item);
    if state.window.len() < self.size {
      return Ok(Signal::Continue);
    }
    state.emitted = true;
    Ok(downstream.push(state.window.iter().cloned().collect()))
  }

  fn finish(&self, state: WindowState<T>, downstream: &mut dyn Downstream<Vec<T>>) -> StageResult<()> {
    if !state.emitted && !state.window.is_empty() {
      downstream.push(state.window.into());
    }
    Ok(())
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "sliding_window")
  }
}
