//! # Error Handling Test Suite
//!
//! Tests for stage errors, pipeline errors and their context.
//!
//! ## Test Coverage
//!
//! - **StageError**: construction helpers, display, attribution and root access
//! - **PipelineError**: context, phase, display and source chain
//! - **ComponentInfo**: defaults, derived type names and display
//! - **Phase / ErrorContext**: display and timestamps

use crate::error::{ComponentInfo, ErrorContext, Phase, PipelineError, StageError};
use crate::execution::RunState;
use crate::stage::Parallelism;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
struct ParseFailure;

impl fmt::Display for ParseFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "could not parse record")
  }
}

impl Error for ParseFailure {}

fn info(name: &str) -> ComponentInfo {
  ComponentInfo::new(name.to_string(), "TestStage".to_string())
}

#[test]
fn test_stage_error_display() {
  assert_eq!(StageError::message("boom").to_string(), "boom");
  assert_eq!(
    StageError::InvalidArgument("size 0".to_string()).to_string(),
    "invalid argument: size 0"
  );
  assert_eq!(
    StageError::CombineUnsupported("chunk".to_string()).to_string(),
    "stage `chunk` does not support combining partition states"
  );
}

#[test]
fn test_logic_error_is_transparent() {
  let error = StageError::logic(ParseFailure);
  assert_eq!(error.to_string(), "could not parse record");
}

#[test]
fn test_boxed_error_converts() {
  let boxed: Box<dyn Error + Send + Sync> = Box::new(ParseFailure);
  let error: StageError = boxed.into();
  assert!(matches!(error, StageError::Logic(_)));
}

#[test]
fn test_attribution_innermost_wins() {
  let error = StageError::message("boom")
    .attribute(info("inner"))
    .attribute(info("outer"));
  assert_eq!(error.component(), Some(&info("inner")));
  assert_eq!(error.to_string(), "in inner: boom");
  assert!(matches!(error.root(), StageError::Message(m) if m == "boom"));
}

#[test]
fn test_attributed_error_has_source() {
  let error = StageError::message("boom").attribute(info("inner"));
  let source = error.source().map(|s| s.to_string());
  assert_eq!(source.as_deref(), Some("boom"));
}

#[test]
fn test_unattributed_error_has_no_component() {
  let error = StageError::message("boom");
  assert!(error.component().is_none());
  assert!(matches!(error.root(), StageError::Message(_)));
}

#[test]
fn test_pipeline_error_prefers_attributed_component() {
  let source = StageError::message("boom").attribute(info("leaf"));
  let error = PipelineError::stage(source, info("chain"), Phase::Integrate, 4);
  let context = error.context().unwrap();
  assert_eq!(context.component.name, "leaf");
  assert_eq!(context.phase, Phase::Integrate);
  assert_eq!(context.pulled, 4);
  assert_eq!(
    error.to_string(),
    "stage leaf failed during integrate: in leaf: boom"
  );
}

#[test]
fn test_pipeline_error_uses_fallback_component() {
  let error = PipelineError::stage(StageError::message("boom"), info("only"), Phase::Finish, 0);
  assert_eq!(error.context().unwrap().component.name, "only");
  assert!(error.stage_error().is_some());
  assert!(error.source().is_some());
}

#[test]
fn test_non_stage_errors_have_no_context() {
  let closed = PipelineError::Closed(RunState::Finished);
  assert!(closed.context().is_none());
  assert!(closed.stage_error().is_none());

  let refused = PipelineError::NotParallelizable {
    component: info("chunk"),
    parallelism: Parallelism::Sequential,
  };
  assert_eq!(
    refused.to_string(),
    "stage chunk cannot run in parallel (capability: Sequential)"
  );
}

#[test]
fn test_component_info() {
  let default = ComponentInfo::default();
  assert_eq!(default.name, "default");

  let derived = ComponentInfo::of::<ParseFailure>(None, "parser");
  assert_eq!(derived.name, "parser");
  assert!(derived.type_name.ends_with("ParseFailure"));

  let named = ComponentInfo::of::<ParseFailure>(Some("csv"), "parser");
  assert_eq!(named.name, "csv");
  assert_eq!(info("x").to_string(), "x (TestStage)");
}

#[test]
fn test_phase_display() {
  assert_eq!(Phase::Integrate.to_string(), "integrate");
  assert_eq!(Phase::Combine.to_string(), "combine");
  assert_eq!(Phase::Finish.to_string(), "finish");
}

#[test]
fn test_error_context_timestamp() {
  let before = chrono::Utc::now();
  let context = ErrorContext::new(info("x"), Phase::Combine, 2);
  assert!(context.timestamp >= before);
  assert_eq!(context.clone(), context);
}
