//! # Pipeline
//!
//! A [`Pipeline`] is a composed stage plus its configuration. It drives a
//! pull-based [`Source`] through the stage chain into a push-based [`Sink`].
//!
//! ## Execution
//!
//! 1. Every stage initializes its state.
//! 2. The next element is pulled; exhaustion skips to step 5.
//! 3. The element goes through the chain depth first: each push of stage *k*
//!    is integrated by stage *k+1* before stage *k* continues.
//! 4. `Stop` from any stage skips to step 5 without pulling again.
//! 5. Every stage's finisher runs once, in chain order.
//!
//! ## Example
//!
//! ```rust
//! use gatherweave::Pipeline;
//! use gatherweave::stages::{ChunkStage, MapStage};
//!
//! let pipeline = Pipeline::new(MapStage::new(|x: i32| x * 10))
//!   .then(ChunkStage::new(2))
//!   .with_name("tens".to_string());
//!
//! let chunks = pipeline.collect(1..=5).unwrap();
//! assert_eq!(chunks, vec![vec![10, 20], vec![30, 40], vec![50]]);
//! ```

use crate::chain::Chain;
use crate::config::PipelineConfig;
use crate::downstream::{Sink, SinkDownstream, Source};
use crate::error::PipelineError;
use crate::execution::{Execution, RunReport};
use crate::iter::Gathered;
use crate::stage::{Parallelism, Stage};
use std::fmt;
use std::marker::PhantomData;
use tracing::debug_span;

/// A composed chain of stages from `T` to `G::Output`, ready to run.
pub struct Pipeline<T, G> {
  pub(crate) stage: G,
  pub(crate) config: PipelineConfig,
  _input: PhantomData<fn(T)>,
}

impl<T, G: Stage<T>> Pipeline<T, G> {
  /// Creates a pipeline running `stage`.
  pub fn new(stage: G) -> Self {
    Self {
      stage,
      config: PipelineConfig::default(),
      _input: PhantomData,
    }
  }

  /// Replaces the configuration.
  pub fn with_config(mut self, config: PipelineConfig) -> Self {
    self.config = config;
    self
  }

  /// Sets the name used in log spans.
  pub fn with_name(mut self, name: String) -> Self {
    self.config.name = Some(name);
    self
  }

  /// Returns the configuration.
  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  /// Returns the composed stage.
  pub fn stage(&self) -> &G {
    &self.stage
  }

  /// Consumes the pipeline, returning the composed stage.
  pub fn into_stage(self) -> G {
    self.stage
  }

  /// Merge capability of the whole chain.
  pub fn parallelism(&self) -> Parallelism {
    self.stage.parallelism()
  }

  /// Appends `next` to the chain.
  pub fn then<B>(self, next: B) -> Pipeline<T, Chain<G, B>>
  where
    B: Stage<G::Output>,
  {
    Pipeline {
      stage: Chain::new(self.stage, next),
      config: self.config,
      _input: PhantomData,
    }
  }

  /// Runs the chain over `source`, delivering every output to `sink`.
  ///
  /// On failure, elements already delivered stay delivered and the error is
  /// returned without running any further stage logic.
  pub fn run<Src, K>(&self, mut source: Src, mut sink: K) -> Result<RunReport, PipelineError>
  where
    Src: Source<T>,
    K: Sink<G::Output>,
  {
    let span = debug_span!(
      "pipeline",
      name = %self.config.name(),
      stage = %self.stage.component_info().name
    );
    let _enter = span.enter();

    let mut execution = Execution::<T, &G>::new(&self.stage);
    let mut downstream = SinkDownstream::new(&mut sink);
    while let Some(item) = source.pull() {
      if execution.feed(item, &mut downstream)?.is_stop() {
        break;
      }
    }
    execution.complete(&mut downstream)?;
    Ok(execution.report(downstream.delivered()))
  }

  /// Runs the chain over `source` and collects the outputs.
  pub fn collect<Src>(&self, source: Src) -> Result<Vec<G::Output>, PipelineError>
  where
    Src: Source<T>,
  {
    let mut out: Vec<G::Output> = Vec::new();
    self.run(source, |item: G::Output| out.push(item))?;
    Ok(out)
  }

  /// Lazily runs the chain over `source`; the returned iterator pulls from
  /// the source only when asked for its next output.
  pub fn iter<I>(&self, source: I) -> Gathered<I::IntoIter, &G>
  where
    I: IntoIterator<Item = T>,
  {
    Gathered::new(source.into_iter(), &self.stage)
  }

  /// Starts a manually driven run of the chain.
  pub fn execution(&self) -> Execution<T, &G> {
    Execution::new(&self.stage)
  }
}

impl<T, G: Clone> Clone for Pipeline<T, G> {
  fn clone(&self) -> Self {
    Self {
      stage: self.stage.clone(),
      config: self.config.clone(),
      _input: PhantomData,
    }
  }
}

impl<T, G: Stage<T>> fmt::Debug for Pipeline<T, G> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Pipeline")
      .field("config", &self.config)
      .field("stage", &self.stage.component_info())
      .finish()
  }
}
