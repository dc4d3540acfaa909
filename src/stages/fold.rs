use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageError, StageResult};
use crate::signal::Signal;
use crate::stage::{Parallelism, Stage};
use std::marker::PhantomData;
use std::sync::Arc;

type Merge<A> = Arc<dyn Fn(A, A) -> A + Send + Sync>;

/// A stage that folds all inputs into one value and emits it at finish.
///
/// An empty input still emits the initial value. With
/// [`with_merge`](FoldStage::with_merge) the fold is declared
/// order-independent and partial folds from different partitions are merged
/// with the given function, which must be associative and treat the initial
/// value as its identity.
pub struct FoldStage<F, A, T> {
  initial: A,
  f: F,
  merge: Option<Merge<A>>,
  name: Option<String>,
  _input: PhantomData<fn(T)>,
}

impl<F, A, T> FoldStage<F, A, T>
where
  F: Fn(A, T) -> A,
  A: Clone,
{
  /// Creates a new `FoldStage` starting every run from `initial`.
  pub fn new(initial: A, f: F) -> Self {
    Self {
      initial,
      f,
      merge: None,
      name: None,
      _input: PhantomData,
    }
  }

  /// Sets the function merging partial folds of adjacent partitions.
  pub fn with_merge<M>(mut self, merge: M) -> Self
  where
    M: Fn(A, A) -> A + Send + Sync + 'static,
  {
    self.merge = Some(Arc::new(merge));
    self
  }

  /// Sets the name for this stage.
  pub fn with_name(mut self, name: String) -> Self {
    self.name = Some(name);
    self
  }
}

impl<F, A, T> Stage<T> for FoldStage<F, A, T>
where
  F: Fn(A, T) -> A,
  A: Clone,
{
  type Output = A;
  /// `None` only while the integrator runs.
  type State = Option<A>;

  fn initialize(&self) -> Option<A> {
    Some(self.initial.clone())
  }

  fn integrate(&self, acc: &mut Option<A>, item: T, _downstream: &mut dyn Downstream<A>) -> StageResult<Signal> {
    let current = acc.take().unwrap_or_else(|| self.initial.clone());
    *acc = Some((self.f)(current, item));
    Ok(Signal::Continue)
  }

  fn finish(&self, acc: Option<A>, downstream: &mut dyn Downstream<A>) -> StageResult<()> {
    downstream.push(acc.unwrap_or_else(|| self.initial.clone()));
    Ok(())
  }

  fn combine(&self, left: Option<A>, right: Option<A>) -> StageResult<Option<A>> {
    let Some(merge) = &self.merge else {
      return Err(StageError::CombineUnsupported(self.component_info().name));
    };
    Ok(match (left, right) {
      (Some(left), Some(right)) => Some(merge(left, right)),
      (left, right) => left.or(right),
    })
  }

  fn parallelism(&self) -> Parallelism {
    if self.merge.is_some() {
      Parallelism::OrderIndependent
    } else {
      Parallelism::Sequential
    }
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "fold")
  }
}
