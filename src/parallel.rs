//! # Parallel Merge
//!
//! Runs a pipeline over several partitions of the input at once and merges
//! the per-partition states with [`Stage::combine`].
//!
//! ## Overview
//!
//! 1. The chain's [`Parallelism`](crate::stage::Parallelism) is checked; a
//!    chain with any sequential-only member is refused.
//! 2. Each partition runs the whole chain on a `rayon` worker with its own
//!    freshly initialized state. A `Stop` inside a partition only stops that
//!    partition's pulling.
//! 3. Outputs emitted while integrating are delivered to the sink in
//!    partition order.
//! 4. Partition states are combined left to right, then the merged state is
//!    finished exactly once.
//!
//! When [`PipelineConfig::max_threads`](crate::config::PipelineConfig) is set
//! the partitions run on a dedicated pool of that size, otherwise on the
//! global `rayon` pool.

use crate::downstream::{Buffer, Downstream, Sink, SinkDownstream, Source};
use crate::error::{Phase, PipelineError};
use crate::execution::{Execution, RunReport, RunState};
use crate::pipeline::Pipeline;
use crate::signal::Signal;
use crate::stage::Stage;
use rayon::prelude::*;
use tracing::{debug, debug_span};

/// What one partition leaves behind for the merge.
struct PartitionRun<S, R> {
  state: S,
  outputs: Vec<R>,
  pulled: u64,
  stopped_early: bool,
}

impl<T, G> Pipeline<T, G>
where
  G: Stage<T> + Sync,
  G::State: Send,
  G::Output: Send,
{
  /// Runs the chain over `partitions` in parallel, delivering every output to
  /// `sink` on the calling thread.
  ///
  /// Fails with [`PipelineError::NotParallelizable`] before pulling anything
  /// if the chain cannot be merged. If several partitions fail, the error of
  /// the first one in partition order is returned and nothing is delivered.
  pub fn run_parallel<P, K>(&self, partitions: Vec<P>, mut sink: K) -> Result<RunReport, PipelineError>
  where
    P: Source<T> + Send,
    K: Sink<G::Output>,
  {
    let parallelism = self.stage.parallelism();
    if !parallelism.allows_parallel() {
      return Err(PipelineError::NotParallelizable {
        component: self.stage.component_info(),
        parallelism,
      });
    }

    let span = debug_span!(
      "pipeline_parallel",
      name = %self.config.name(),
      stage = %self.stage.component_info().name,
      partitions = partitions.len()
    );
    let _enter = span.enter();

    let count = partitions.len();
    let runs = self.in_pool(move || {
      partitions
        .into_par_iter()
        .enumerate()
        .map(|(index, source)| self.run_partition(index, source))
        .collect::<Vec<_>>()
    })?;
    let runs = runs.into_iter().collect::<Result<Vec<_>, _>>()?;

    let pulled: u64 = runs.iter().map(|run| run.pulled).sum();
    let stopped_early = runs.iter().any(|run| run.stopped_early);
    let mut downstream = SinkDownstream::new(&mut sink);

    let mut merged = None;
    for run in runs {
      for item in run.outputs {
        downstream.push(item);
      }
      merged = Some(match merged {
        None => run.state,
        Some(left) => self
          .stage
          .combine(left, run.state)
          .map_err(|error| {
            PipelineError::stage(error, self.stage.component_info(), Phase::Combine, pulled)
          })?,
      });
    }
    let state = merged.unwrap_or_else(|| self.stage.initialize());

    debug!(pulled, stopped_early, "partitions merged, finishing");
    self
      .stage
      .finish(state, &mut downstream)
      .map_err(|error| {
        PipelineError::stage(error, self.stage.component_info(), Phase::Finish, pulled)
      })?;

    Ok(RunReport {
      state: RunState::Finished,
      pulled,
      delivered: downstream.delivered(),
      stopped_early,
      partitions: count,
    })
  }

  fn run_partition<P>(
    &self,
    index: usize,
    mut source: P,
  ) -> Result<PartitionRun<G::State, G::Output>, PipelineError>
  where
    P: Source<T>,
  {
    let mut execution = Execution::<T, &G>::new(&self.stage);
    let mut buffer = Buffer::new();
    while let Some(item) = source.pull() {
      if execution.feed(item, &mut buffer)? == Signal::Stop {
        break;
      }
    }
    debug!(
      partition = index,
      pulled = execution.pulled(),
      outputs = buffer.len(),
      "partition drained"
    );

    let run_state = execution.run_state();
    let (_, state, pulled, stopped_early) = execution.into_parts();
    let state = state.ok_or(PipelineError::Closed(run_state))?;
    Ok(PartitionRun {
      state,
      outputs: buffer.into_vec(),
      pulled,
      stopped_early,
    })
  }

  fn in_pool<F, R>(&self, op: F) -> Result<R, PipelineError>
  where
    F: FnOnce() -> R + Send,
    R: Send,
  {
    match self.config.max_threads {
      Some(threads) => {
        let pool = rayon::ThreadPoolBuilder::new()
          .num_threads(threads)
          .build()
          .map_err(|error| PipelineError::ThreadPool(error.to_string()))?;
        Ok(pool.install(op))
      }
      None => Ok(op()),
    }
  }
}
