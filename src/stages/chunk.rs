//! Fixed-size chunking.

use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageError, StageResult};
use crate::signal::Signal;
use crate::stage::Stage;
use std::marker::PhantomData;

/// A stage that groups inputs into chunks of `size` elements.
///
/// Full chunks are emitted as soon as they fill up. A trailing partial chunk
/// is emitted by the finisher; an input that fills the last chunk exactly
/// leaves nothing behind, so no empty chunk is ever emitted.
///
/// A size of zero is rejected with [`StageError::InvalidArgument`] on the
/// first input.
pub struct ChunkStage<T> {
  size: usize,
  name: Option<String>,
  _input: PhantomData<fn(T)>,
}

impl<T> ChunkStage<T> {
  /// Creates a new `ChunkStage` with the given chunk size.
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

  /// Returns the chunk size.
  pub fn size(&self) -> usize {
    self.size
  }
}

impl<T> Clone for ChunkStage<T> {
  fn clone(&self) -> Self {
    Self {
      size: self.size,
      name: self.name.clone(),
      _input: PhantomData,
    }
  }
}

impl<T> Stage<T> for ChunkStage<T> {
  type Output = Vec<T>;
  type State = Vec<T>;

  fn initialize(&self) -> Vec<T> {
    Vec::with_capacity(self.size)
  }

  fn integrate(
    &self,
    chunk: &mut Vec<T>,
    item: T,
    downstream: &mut dyn Downstream<Vec<T>>,
  ) -> StageResult<Signal> {
    if self.size == 0 {
      return Err(StageError::InvalidArgument(
        "chunk size must be greater than zero".to_string(),
      ));
    }
    chunk.push(item);
    if chunk.len() < self.size {
      return Ok(Signal::Continue);
    }
    let full = std::mem::replace(chunk, Vec::with_capacity(self.size));
    Ok(downstream.push(full))
  }

  fn finish(&self, chunk: Vec<T>, downstream: &mut dyn Downstream<Vec<T>>) -> StageResult<()> {
    if !chunk.is_empty() {
      downstream.push(chunk);
    }
    Ok(())
  }

  fn component_info(&self) -> ComponentInfo {
    ComponentInfo::of::<Self>(self.name.as_deref(), "chunk")
  }
}
