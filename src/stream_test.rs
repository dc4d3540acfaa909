//! # Stream Driver Test Suite
//!
//! [`GatherStream`] must yield what the synchronous drivers yield and poll
//! its inner stream lazily.

use crate::downstream::Downstream;
use crate::error::StageError;
use crate::execution::RunState;
use crate::fn_stage::FnStage;
use crate::stage::StageExt;
use crate::stages::{ChunkStage, DedupStage, LimitStage, MapStage, ThresholdStage};
use crate::stream::{GatherStream, GatherStreamExt};
use futures::stream::{self, FusedStream};
use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[tokio::test]
async fn test_stream_chunks() {
  let chunks: Vec<Vec<i32>> = stream::iter(1..=7)
    .gather_stream(ChunkStage::new(3))
    .map(Result::unwrap)
    .collect()
    .await;
  assert_eq!(chunks, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
}

#[tokio::test]
async fn test_stream_dedup() {
  let out: Vec<i32> = stream::iter(vec![1, 1, 2, 2, 2, 3, 3, 1, 4])
    .gather_stream(DedupStage::streaming())
    .map(Result::unwrap)
    .collect()
    .await;
  assert_eq!(out, vec![1, 2, 3, 1, 4]);
}

#[tokio::test]
async fn test_stream_stops_polling_after_stop() {
  let polled = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&polled);
  let source = stream::iter(1..).inspect(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });

  let out: Vec<u64> = source
    .gather_stream(ThresholdStage::new(10u64))
    .map(Result::unwrap)
    .collect()
    .await;
  assert_eq!(out, vec![1, 2, 3, 4]);
  assert_eq!(polled.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_stream_is_lazy() {
  let polled = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&polled);
  let source = stream::iter(0..100).inspect(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });
  let mut gathered = GatherStream::new(source, MapStage::new(|x: i32| x * 2).then(LimitStage::new(3)));

  assert_eq!(gathered.run_state(), RunState::Initialized);
  assert_eq!(gathered.next().await.unwrap().unwrap(), 0);
  assert_eq!(polled.load(Ordering::SeqCst), 1);
  assert_eq!(gathered.next().await.unwrap().unwrap(), 2);
  assert_eq!(gathered.next().await.unwrap().unwrap(), 4);
  assert!(gathered.next().await.is_none());
  assert!(gathered.is_terminated());
  assert_eq!(gathered.pulled(), 3);
  assert_eq!(gathered.run_state(), RunState::Finished);
  assert_eq!(polled.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_stream_error_after_outputs() {
  let stage = FnStage::new(
    || (),
    |_, item: i32, downstream: &mut dyn Downstream<i32>| {
      if item == 3 {
        return Err(StageError::message("three"));
      }
      Ok(downstream.push(item))
    },
  );
  let results: Vec<_> = stream::iter(1..10).gather_stream(stage).collect().await;
  assert_eq!(results.len(), 3);
  assert!(results[0].is_ok());
  assert!(results[1].is_ok());
  assert!(results[2].is_err());
}
