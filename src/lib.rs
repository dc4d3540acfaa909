//! # Gatherweave
//!
//! Composable, stateful stream stages with short-circuiting and parallel
//! state merging.
//!
//! A [`Stage`] turns a sequence of inputs into a sequence of outputs while
//! carrying private state: it can emit zero, one or many outputs per input,
//! flush what it still holds when input ends, and tell everything upstream
//! to stop pulling. Stages chain into a [`Pipeline`] that pulls from a
//! [`Source`] and pushes into a [`Sink`].
//!
//! ## Key Features
//!
//! - **Stateful stages**: explicit per-run state, initialized fresh every run
//! - **Short-circuiting**: a `Stop` from any stage ends pulling from the source
//! - **Finishers always run**: partial results are flushed exactly once
//! - **Lazy drivers**: an [`Iterator`] adapter and a `futures` `Stream` adapter
//! - **Parallel merge**: partitions run on `rayon` and merge with `combine`
//!
//! ## Quick Start
//!
//! ```rust
//! use gatherweave::{Pipeline, StageExt};
//! use gatherweave::stages::{ChunkStage, FilterStage, LimitStage};
//!
//! let pipeline = Pipeline::new(
//!   FilterStage::new(|x: &u32| x % 3 == 0)
//!     .then(LimitStage::new(5))
//!     .then(ChunkStage::new(2)),
//! );
//!
//! // The source is infinite; the limit ends the run.
//! let chunks = pipeline.collect(1..).unwrap();
//! assert_eq!(chunks, vec![vec![3, 6], vec![9, 12], vec![15]]);
//! ```

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// Sequential composition of two stages.
pub mod chain;
/// Pipeline configuration.
pub mod config;
/// Source, sink and downstream boundaries.
pub mod downstream;
/// Stage and pipeline errors.
pub mod error;
/// Lifecycle of a single run.
pub mod execution;
/// Closure-built stages.
pub mod fn_stage;
/// Lazy iterator driver.
pub mod iter;
/// Parallel execution over partitions.
#[cfg(feature = "parallel")]
pub mod parallel;
/// Pipeline composition and execution.
pub mod pipeline;
/// Continue/stop signal.
pub mod signal;
/// The core stage trait.
pub mod stage;
/// Collection of built-in stages.
pub mod stages;
/// Async stream driver.
pub mod stream;

pub use chain::{Chain, ChainState};
pub use config::PipelineConfig;
pub use downstream::{Downstream, Sink, Source};
pub use error::{ComponentInfo, ErrorContext, Phase, PipelineError, StageError, StageResult};
pub use execution::{Execution, RunReport, RunState};
pub use fn_stage::FnStage;
pub use iter::{GatherExt, Gathered};
pub use pipeline::Pipeline;
pub use signal::Signal;
pub use stage::{Parallelism, Stage, StageExt};
pub use stream::{GatherStream, GatherStreamExt};

#[cfg(test)]
mod chain_test;
#[cfg(test)]
mod error_test;
#[cfg(test)]
mod stream_test;
