//! # Execution
//!
//! One run of a stage: its state, its progress and its lifecycle.
//!
//! ```text
//! Initialized --first pull--> Running --Stop / exhaustion--> Stopped --finishers ok--> Finished
//!      |                         |                               |
//!      +-------------------------+-------------------------------+--error / panic--> Failed
//! ```
//!
//! An empty source goes straight from `Initialized` to `Stopped`. `Failed`
//! is terminal: a failed execution refuses further input and its state is
//! dropped without running the finisher.
//!
//! Every driver ([`Pipeline::run`](crate::pipeline::Pipeline::run), the
//! [`Gathered`](crate::iter::Gathered) iterator and the
//! [`GatherStream`](crate::stream::GatherStream)) pulls from its source itself
//! and feeds elements through an `Execution`, so the lifecycle rules live in
//! one place.

use crate::downstream::Downstream;
use crate::error::{Phase, PipelineError};
use crate::signal::Signal;
use crate::stage::Stage;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RunState {
  /// States are initialized; nothing pulled yet.
  Initialized,
  /// At least one element has been integrated.
  Running,
  /// No more input will be integrated; finishers are about to run.
  Stopped,
  /// All finishers ran without error.
  Finished,
  /// A stage failed or panicked. Terminal.
  Failed,
}

impl RunState {
  /// Whether the run still accepts input.
  pub fn is_open(self) -> bool {
    matches!(self, RunState::Initialized | RunState::Running)
  }

  /// Whether the run has ended, successfully or not.
  pub fn is_terminal(self) -> bool {
    matches!(self, RunState::Finished | RunState::Failed)
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      RunState::Initialized => "initialized",
      RunState::Running => "running",
      RunState::Stopped => "stopped",
      RunState::Finished => "finished",
      RunState::Failed => "failed",
    };
    f.write_str(name)
  }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
  /// Final lifecycle state; always [`RunState::Finished`] for a returned report.
  pub state: RunState,
  /// Elements pulled from the source, summed over partitions.
  pub pulled: u64,
  /// Elements delivered to the sink, including finisher output.
  pub delivered: u64,
  /// Whether input ended because a stage answered `Stop` rather than
  /// because the source ran dry. In parallel runs, true if any partition stopped.
  pub stopped_early: bool,
  /// Number of partitions; 1 for sequential runs.
  pub partitions: usize,
}

/// A single run of a stage, fed one element at a time.
pub struct Execution<T, G: Stage<T>> {
  stage: G,
  state: Option<G::State>,
  run_state: RunState,
  pulled: u64,
  stopped_early: bool,
  _input: PhantomData<fn(T)>,
}

impl<T, G: Stage<T>> Execution<T, G> {
  /// Starts a run: initializes the stage's state.
  pub fn new(stage: G) -> Self {
    let state = stage.initialize();
    Self {
      stage,
      state: Some(state),
      run_state: RunState::Initialized,
      pulled: 0,
      stopped_early: false,
      _input: PhantomData,
    }
  }

  /// The stage being run.
  pub fn stage(&self) -> &G {
    &self.stage
  }

  /// Current lifecycle state.
  pub fn run_state(&self) -> RunState {
    self.run_state
  }

  /// Elements fed so far.
  pub fn pulled(&self) -> u64 {
    self.pulled
  }

  /// Whether a stage answered `Stop`.
  pub fn stopped_early(&self) -> bool {
    self.stopped_early
  }

  /// Integrates one element.
  ///
  /// Returns the stage's signal. After `Stop`, the caller must not pull again
  /// and should call [`complete`](Self::complete). Feeding a closed execution
  /// returns [`PipelineError::Closed`].
  pub fn feed(
    &mut self,
    item: T,
    downstream: &mut dyn Downstream<G::Output>,
  ) -> Result<Signal, PipelineError> {
    if !self.run_state.is_open() {
      return Err(PipelineError::Closed(self.run_state));
    }
    let Some(state) = self.state.as_mut() else {
      return Err(PipelineError::Closed(self.run_state));
    };
    let mut run_state =
      scopeguard::guard_on_unwind(&mut self.run_state, |s| *s = RunState::Failed);
    **run_state = RunState::Running;
    self.pulled += 1;
    trace!(pulled = self.pulled, "integrating element");

    match self.stage.integrate(state, item, downstream) {
      Ok(Signal::Continue) => Ok(Signal::Continue),
      Ok(Signal::Stop) => {
        **run_state = RunState::Stopped;
        self.stopped_early = true;
        debug!(pulled = self.pulled, "stage requested stop");
        Ok(Signal::Stop)
      }
      Err(error) => {
        **run_state = RunState::Failed;
        self.state = None;
        Err(PipelineError::stage(
          error,
          self.stage.component_info(),
          Phase::Integrate,
          self.pulled,
        ))
      }
    }
  }

  /// Ends input and runs the finisher exactly once.
  pub fn complete(&mut self, downstream: &mut dyn Downstream<G::Output>) -> Result<(), PipelineError> {
    if self.run_state.is_terminal() {
      return Err(PipelineError::Closed(self.run_state));
    }
    let Some(state) = self.state.take() else {
      return Err(PipelineError::Closed(self.run_state));
    };
    let mut run_state =
      scopeguard::guard_on_unwind(&mut self.run_state, |s| *s = RunState::Failed);
    **run_state = RunState::Stopped;
    debug!(
      pulled = self.pulled,
      stopped_early = self.stopped_early,
      "input ended, finishing"
    );

    match self.stage.finish(state, downstream) {
      Ok(()) => {
        **run_state = RunState::Finished;
        Ok(())
      }
      Err(error) => {
        **run_state = RunState::Failed;
        Err(PipelineError::stage(
          error,
          self.stage.component_info(),
          Phase::Finish,
          self.pulled,
        ))
      }
    }
  }

  /// Marks the run failed and drops its state without running the finisher.
  /// For manual drivers whose own input failed.
  pub fn abort(&mut self) {
    self.run_state = RunState::Failed;
    self.state = None;
  }

  /// Builds the report of a finished run.
  pub(crate) fn report(&self, delivered: u64) -> RunReport {
    RunReport {
      state: self.run_state,
      pulled: self.pulled,
      delivered,
      stopped_early: self.stopped_early,
      partitions: 1,
    }
  }

  /// Takes the state out for merging, leaving the execution stopped.
  pub(crate) fn into_parts(self) -> (G, Option<G::State>, u64, bool) {
    (self.stage, self.state, self.pulled, self.stopped_early)
  }
}

impl<T, G: Stage<T>> fmt::Debug for Execution<T, G> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Execution")
      .field("component", &self.stage.component_info().name)
      .field("run_state", &self.run_state)
      .field("pulled", &self.pulled)
      .field("stopped_early", &self.stopped_early)
      .finish()
  }
}
