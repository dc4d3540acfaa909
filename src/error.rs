//! # Error Handling
//!
//! Errors raised by stage logic and by pipeline runs.
//!
//! ## Overview
//!
//! - **StageError**: what an integrator, combiner or finisher returns when it fails
//! - **PipelineError**: what the caller of a run sees, with context about where
//!   and when the failure happened
//! - **ErrorContext**: timestamp, failing component, phase and progress of the run
//! - **ComponentInfo**: name and type of a stage, used in errors and log fields
//!
//! Stage failures are always fatal to the run. There is no retry and no
//! suppression: the first error ends the run in [`RunState::Failed`] and is
//! returned as-is, wrapped with its context. Elements delivered to the sink
//! before the failure stay delivered.
//!
//! ## Example
//!
//! ```rust
//! use gatherweave::error::{ComponentInfo, StageError};
//!
//! let error = StageError::message("negative input")
//!   .attribute(ComponentInfo::new("validate".to_string(), "FnStage".to_string()));
//! assert_eq!(error.component().map(|c| c.name.as_str()), Some("validate"));
//! ```

use crate::execution::RunState;
use crate::stage::Parallelism;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Result type returned by stage operations.
pub type StageResult<T> = Result<T, StageError>;

/// Boxed error raised by user-supplied stage logic.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Failure raised while a stage integrates, combines or finishes.
#[derive(Debug, Error)]
pub enum StageError {
  /// An arbitrary error raised by stage logic.
  #[error(transparent)]
  Logic(#[from] BoxError),
  /// A plain message describing the failure.
  #[error("{0}")]
  Message(String),
  /// The stage was configured or fed with a value it cannot accept.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),
  /// `combine` was called on a stage that has no combiner.
  #[error("stage `{0}` does not support combining partition states")]
  CombineUnsupported(String),
  /// The error was raised by a named member of a composed stage.
  #[error("in {}: {source}", .component.name)]
  Attributed {
    /// The member that raised the error.
    component: ComponentInfo,
    /// The original error.
    #[source]
    source: Box<StageError>,
  },
}

impl StageError {
  /// Creates a [`StageError::Message`].
  pub fn message(message: impl Into<String>) -> Self {
    StageError::Message(message.into())
  }

  /// Wraps any error type raised by stage logic.
  pub fn logic<E>(error: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    StageError::Logic(Box::new(error))
  }

  /// Names the component that raised this error.
  ///
  /// The innermost attribution wins: an error that already names its
  /// component is returned unchanged, so a nested chain reports the leaf
  /// stage that actually failed.
  pub fn attribute(self, component: ComponentInfo) -> Self {
    match self {
      attributed @ StageError::Attributed { .. } => attributed,
      other => StageError::Attributed {
        component,
        source: Box::new(other),
      },
    }
  }

  /// The component this error was attributed to, if any.
  pub fn component(&self) -> Option<&ComponentInfo> {
    match self {
      StageError::Attributed { component, .. } => Some(component),
      _ => None,
    }
  }

  /// The error without its attribution wrapper.
  pub fn root(&self) -> &StageError {
    match self {
      StageError::Attributed { source, .. } => source.root(),
      other => other,
    }
  }
}

/// Identifying information about a stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentInfo {
  /// The name of the component.
  pub name: String,
  /// The type name of the component.
  pub type_name: String,
}

impl Default for ComponentInfo {
  fn default() -> Self {
    Self {
      name: "default".to_string(),
      type_name: "default".to_string(),
    }
  }
}

impl ComponentInfo {
  /// Creates a new `ComponentInfo` with the given name and type name.
  pub fn new(name: String, type_name: String) -> Self {
    Self { name, type_name }
  }

  /// Builds the info for `S`, using `name` or a default derived from the type.
  pub fn of<S: ?Sized>(name: Option<&str>, default_name: &str) -> Self {
    Self {
      name: name.unwrap_or(default_name).to_string(),
      type_name: std::any::type_name::<S>().to_string(),
    }
  }
}

impl fmt::Display for ComponentInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.name, self.type_name)
  }
}

/// The part of the stage contract that was executing when a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
  /// Processing one input element.
  Integrate,
  /// Merging two partition states.
  Combine,
  /// Flushing state at end of input.
  Finish,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Phase::Integrate => write!(f, "integrate"),
      Phase::Combine => write!(f, "combine"),
      Phase::Finish => write!(f, "finish"),
    }
  }
}

/// Context information about when and where a run failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
  /// The timestamp when the error occurred.
  pub timestamp: chrono::DateTime<chrono::Utc>,
  /// The stage that failed. For composed stages this is the innermost member.
  pub component: ComponentInfo,
  /// The phase of the stage contract that failed.
  pub phase: Phase,
  /// How many elements had been pulled from the source when the error occurred.
  pub pulled: u64,
}

impl ErrorContext {
  /// Creates a context stamped with the current time.
  pub fn new(component: ComponentInfo, phase: Phase, pulled: u64) -> Self {
    Self {
      timestamp: chrono::Utc::now(),
      component,
      phase,
      pulled,
    }
  }
}

/// An error that ended a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
  /// A stage failed; the run is in [`RunState::Failed`].
  #[error("stage {} failed during {}: {source}", .context.component.name, .context.phase)]
  Stage {
    /// Where and when the failure happened.
    context: ErrorContext,
    /// The error raised by the stage.
    #[source]
    source: StageError,
  },
  /// Parallel execution was requested for a stage that cannot be merged safely.
  #[error("stage {} cannot run in parallel (capability: {parallelism:?})", .component.name)]
  NotParallelizable {
    /// The composed stage that was rejected.
    component: ComponentInfo,
    /// Its declared capability.
    parallelism: Parallelism,
  },
  /// An execution was fed after it already stopped, finished or failed.
  #[error("execution is closed ({0:?})")]
  Closed(RunState),
  /// The worker pool for a parallel run could not be built.
  #[error("failed to build worker pool: {0}")]
  ThreadPool(String),
}

impl PipelineError {
  /// Builds a [`PipelineError::Stage`], naming the innermost failing component.
  ///
  /// `fallback` names the component when the error carries no attribution of
  /// its own.
  pub fn stage(source: StageError, fallback: ComponentInfo, phase: Phase, pulled: u64) -> Self {
    let component = source.component().cloned().unwrap_or(fallback);
    PipelineError::Stage {
      context: ErrorContext::new(component, phase, pulled),
      source,
    }
  }

  /// Returns the error context for stage failures.
  pub fn context(&self) -> Option<&ErrorContext> {
    match self {
      PipelineError::Stage { context, .. } => Some(context),
      _ => None,
    }
  }

  /// Returns the stage error for stage failures.
  pub fn stage_error(&self) -> Option<&StageError> {
    match self {
      PipelineError::Stage { source, .. } => Some(source),
      _ => None,
    }
  }
}
