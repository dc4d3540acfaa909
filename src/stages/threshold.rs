use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageResult};
use crate::signal::Signal;
use crate::stage::Stage;
use num_traits::CheckedAdd;

/// A stage that passes inputs on while their running sum stays at or below
/// a threshold.
///
/// The input that would push the sum past the threshold is not emitted; the
/// stage answers `Stop` instead, so nothing after it is pulled. A sum that
/// overflows `T` counts as exceeding the threshold.
///
/// ```rust
/// use gatherweave::Pipeline;
/// use gatherweave::stages::ThresholdStage;
///
/// let mut pulled = 0;
/// let source = (1..=7).inspect(|_| pulled += 1);
/// let out = Pipeline::new(ThresholdStage::new(10)).collect(source).unwrap();
/// assert_eq!(out, vec![1, 2, 3, 4]);
/// assert_eq!(pulled, 5);
/// ```
#[derive(Debug, Clone)]
pub struct ThresholdStage<T> {
  threshold: T,
  name: Option<String>,
}

impl<T> ThresholdStage<T> {
  /// Creates a new `ThresholdStage` with the given inclusive bound.
  pub fn new(threshold: T) -> Self {
    Self {
      threshold,
      name: None,
    }
  }

  /// Sets the name for this stage.
  pub fn with_name(mut self, name: String) -> Self {
    self.name = Some(name);
    self
  }
}

impl<T> Stage<T> for ThresholdStage<T>
where
  T: Copy + Default + PartialOrd + CheckedAdd,
{
  type Output = T;
  type State = T;

  fn initialize(&self) -> T {
    T::default()
  }

  fn integrate(&self, sum: &mut T, item: T, downstream: &mut dyn Downstream<T>) -> StageResult<Signal> {
    let next = match sum.checked_add(&item) {
      Some(next) if next <= self.threshold => next,
      _ => return Ok(Signal::Stop),
    };
    *sum = next;
    Ok(downstream.push(item))
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "threshold")
  }
}
