//! # Chain Test Suite
//!
//! Composition semantics of [`Chain`]: associativity, depth-first ordering,
//! short-circuiting, finisher ordering and error attribution.

use crate::chain::Chain;
use crate::downstream::Downstream;
use crate::error::{StageError, StageResult};
use crate::fn_stage::FnStage;
use crate::pipeline::Pipeline;
use crate::signal::Signal;
use crate::stage::{Parallelism, Stage, StageExt};
use crate::stages::{ChunkStage, DedupStage, FilterStage, IndexStage, LimitStage, MapStage};
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Emits every input twice.
fn twice() -> FnStage<i32, i32, ()> {
  FnStage::new(
    || (),
    |_, item: i32, downstream: &mut dyn Downstream<i32>| {
      if downstream.push(item).is_stop() {
        return Ok(Signal::Stop);
      }
      Ok(downstream.push(item))
    },
  )
}

#[test]
fn test_associativity_outputs_and_pulls() {
  let left = Pipeline::new(twice().then(LimitStage::new(5)).then(ChunkStage::new(2)));
  let right = Pipeline::new(twice().then(LimitStage::new(5).then(ChunkStage::new(2))));

  let left_pulls = Cell::new(0);
  let left_out = left
    .collect((1..).inspect(|_| left_pulls.set(left_pulls.get() + 1)))
    .unwrap();
  let right_pulls = Cell::new(0);
  let right_out = right
    .collect((1..).inspect(|_| right_pulls.set(right_pulls.get() + 1)))
    .unwrap();

  assert_eq!(left_out, vec![vec![1, 1], vec![2, 2], vec![3]]);
  assert_eq!(left_out, right_out);
  assert_eq!(left_pulls.get(), 3);
  assert_eq!(left_pulls.get(), right_pulls.get());
}

/// Pushes each input, then ten times the input, logging around each push.
struct Emitter<'a> {
  log: &'a RefCell<Vec<String>>,
}

impl Stage<i32> for Emitter<'_> {
  type Output = i32;
  type State = ();

  fn initialize(&self) {}

  fn integrate(&self, _state: &mut (), item: i32, downstream: &mut dyn Downstream<i32>) -> StageResult<Signal> {
    self.log.borrow_mut().push(format!("a:{item}"));
    downstream.push(item);
    self.log.borrow_mut().push(format!("a:{item}'"));
    Ok(downstream.push(item * 10))
  }
}

/// Logs and forwards every input.
struct Recorder<'a> {
  log: &'a RefCell<Vec<String>>,
}

impl Stage<i32> for Recorder<'_> {
  type Output = i32;
  type State = ();

  fn initialize(&self) {}

  fn integrate(&self, _state: &mut (), item: i32, downstream: &mut dyn Downstream<i32>) -> StageResult<Signal> {
    self.log.borrow_mut().push(format!("b:{item}"));
    Ok(downstream.push(item))
  }
}

#[test]
fn test_depth_first_ordering() {
  let log = RefCell::new(Vec::new());
  let pipeline = Pipeline::new(Emitter { log: &log }.then(Recorder { log: &log }));
  let out = pipeline.collect(vec![1, 2].into_iter()).unwrap();
  assert_eq!(out, vec![1, 10, 2, 20]);
  assert_eq!(
    *log.borrow(),
    vec!["a:1", "b:1", "a:1'", "b:10", "a:2", "b:2", "a:2'", "b:20"]
  );
}

#[test]
fn test_stop_from_downstream_rejects_further_pushes() {
  let attempts = Cell::new(0);
  let upstream = Chain::new(twice(), LimitStage::new(1));
  let mut state = upstream.initialize();
  let mut out = Vec::new();
  let signal = upstream
    .integrate(&mut state, 7, &mut |x: i32| {
      attempts.set(attempts.get() + 1);
      out.push(x);
    })
    .unwrap();
  assert_eq!(signal, Signal::Stop);
  assert_eq!(out, vec![7]);
  assert_eq!(attempts.get(), 1);
  assert!(state.is_downstream_stopped());

  // A stopped chain refuses input without calling its members.
  let mut late = Vec::new();
  let signal = upstream
    .integrate(&mut state, 8, &mut |x: i32| late.push(x))
    .unwrap();
  assert_eq!(signal, Signal::Stop);
  assert!(late.is_empty());
}

#[test]
fn test_finishers_run_in_chain_order() {
  // Chunks of 2, then index the chunks: the trailing chunk flushed by the
  // first finisher is indexed by the second stage before it finishes.
  let pipeline = Pipeline::new(ChunkStage::new(2).then(IndexStage::new()));
  let out = pipeline.collect(1..=3).unwrap();
  assert_eq!(out, vec![(vec![1, 2], 0), (vec![3], 1)]);
}

#[test]
fn test_upstream_flush_dropped_after_downstream_stop() {
  let finished = Arc::new(AtomicUsize::new(0));
  let finished_in_stage = Arc::clone(&finished);
  let counting = FnStage::new(
    || 0,
    |seen: &mut i32, item: i32, downstream: &mut dyn Downstream<i32>| {
      *seen += 1;
      Ok(downstream.push(item))
    },
  )
  .with_finisher(move |seen, downstream| {
    finished_in_stage.fetch_add(1, Ordering::SeqCst);
    downstream.push(-seen);
    Ok(())
  });

  let pipeline = Pipeline::new(counting.then(LimitStage::new(2)));
  let mut out = Vec::new();
  let report = pipeline.run(1.., |x: i32| out.push(x)).unwrap();
  assert_eq!(out, vec![1, 2]);
  assert_eq!(report.pulled, 2);
  assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[test]
fn test_downstream_error_is_attributed_to_downstream() {
  let failing = FnStage::new(
    || (),
    |_, item: i32, _downstream: &mut dyn Downstream<i32>| {
      if item > 2 {
        Err(StageError::message("too big"))
      } else {
        Ok(Signal::Continue)
      }
    },
  )
  .with_name("guard".to_string());
  let chain = MapStage::new(|x: i32| x + 1).with_name("inc".to_string()).then(failing);
  let mut state = chain.initialize();
  let mut sink = |_: i32| {};
  assert!(chain.integrate(&mut state, 1, &mut sink).is_ok());
  let error = chain.integrate(&mut state, 2, &mut sink).unwrap_err();
  assert_eq!(error.component().map(|c| c.name.as_str()), Some("guard"));
}

#[test]
fn test_upstream_error_is_attributed_to_upstream() {
  let failing = FnStage::new(
    || (),
    |_, _item: i32, _downstream: &mut dyn Downstream<i32>| Err(StageError::message("nope")),
  )
  .with_name("source_guard".to_string());
  let chain = failing.then(IndexStage::new());
  let mut state = chain.initialize();
  let error = chain
    .integrate(&mut state, 1, &mut |_: (i32, usize)| {})
    .unwrap_err();
  assert_eq!(error.component().map(|c| c.name.as_str()), Some("source_guard"));
}

#[test]
fn test_parallelism_is_weakest_member() {
  let independent = MapStage::new(|x: i32| x).then(FilterStage::new(|x: &i32| *x > 0));
  assert_eq!(independent.parallelism(), Parallelism::OrderIndependent);

  let reconciling = MapStage::new(|x: i32| x).then(DedupStage::reconciling());
  assert_eq!(reconciling.parallelism(), Parallelism::BoundaryReconciling);

  let sequential = reconciling.then(IndexStage::new());
  assert_eq!(sequential.parallelism(), Parallelism::Sequential);
}

#[test]
fn test_component_info_names_members() {
  let chain = MapStage::new(|x: i32| x)
    .with_name("first".to_string())
    .then(LimitStage::new(1).with_name("second".to_string()));
  let info = chain.component_info();
  assert_eq!(info.name, "first -> second");
  assert_eq!(info.type_name, "Chain");
}
