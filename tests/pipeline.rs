use gatherweave::stages::{ChunkStage, DedupStage, FilterStage, IndexStage, LimitStage, MapStage};
use gatherweave::{
  Downstream, FnStage, GatherExt, Pipeline, PipelineConfig, RunState, Signal, StageExt,
};
use proptest::prelude::*;
use std::cell::Cell;
use std::sync::Once;

static TRACING: Once = Once::new();

fn init_tracing() {
  TRACING.call_once(|| {
    let _ = tracing_subscriber::fmt()
      .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
      .with_test_writer()
      .try_init();
  });
}

/// Emits a sentence's words, stopping once a word equals `stop_word`.
fn words_until(stop_word: &'static str) -> FnStage<String, String, ()> {
  FnStage::new(
    || (),
    move |_, line: String, downstream: &mut dyn Downstream<String>| {
      for word in line.split_whitespace() {
        if word == stop_word {
          return Ok(Signal::Stop);
        }
        if downstream.push(word.to_string()).is_stop() {
          return Ok(Signal::Stop);
        }
      }
      Ok(Signal::Continue)
    },
  )
  .with_name("words".to_string())
}

#[test]
fn test_word_pipeline_end_to_end() {
  init_tracing();
  let lines = vec![
    "the quick brown fox".to_string(),
    "the lazy dog".to_string(),
    "END of input".to_string(),
    "never read".to_string(),
  ];
  let pulled = Cell::new(0);
  let pipeline = Pipeline::new(words_until("END"))
    .then(MapStage::new(|w: String| w.len()))
    .then(ChunkStage::new(3))
    .with_name("word_lengths".to_string());

  let mut out = Vec::new();
  let report = pipeline
    .run(
      lines.into_iter().inspect(|_| pulled.set(pulled.get() + 1)),
      |chunk: Vec<usize>| out.push(chunk),
    )
    .unwrap();

  assert_eq!(out, vec![vec![3, 5, 5], vec![3, 3, 4], vec![3]]);
  assert_eq!(pulled.get(), 3);
  assert_eq!(report.state, RunState::Finished);
  assert!(report.stopped_early);
  assert_eq!(report.delivered, 3);
}

#[test]
fn test_gather_on_iterator() {
  init_tracing();
  let indexed: Vec<(char, usize)> = "aabbbc"
    .chars()
    .gather(DedupStage::<char>::streaming().then(IndexStage::new()))
    .collect::<Result<_, _>>()
    .unwrap();
  assert_eq!(indexed, vec![('a', 0), ('b', 1), ('c', 2)]);
}

#[test]
fn test_config_from_json() {
  let config: PipelineConfig =
    serde_json::from_str(r#"{ "name": "ingest", "max_threads": 4 }"#).unwrap();
  assert_eq!(config.name(), "ingest");
  assert_eq!(config.max_threads, Some(4));

  let defaults: PipelineConfig = serde_json::from_str("{}").unwrap();
  assert_eq!(defaults, PipelineConfig::default());
  assert_eq!(defaults.name(), "pipeline");

  let pipeline = Pipeline::new(LimitStage::<u8>::new(1)).with_config(config.clone());
  assert_eq!(pipeline.config(), &config);
}

#[cfg(feature = "parallel")]
fn owned_lines(items: &[&str]) -> std::vec::IntoIter<String> {
  items
    .iter()
    .map(|line| line.to_string())
    .collect::<Vec<_>>()
    .into_iter()
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_line_count() {
  init_tracing();
  let counter = FnStage::new(
    || 0usize,
    |count: &mut usize, _line: String, _downstream: &mut dyn Downstream<usize>| {
      *count += 1;
      Ok(Signal::Continue)
    },
  )
  .with_finisher(|count, downstream| {
    downstream.push(count);
    Ok(())
  })
  .with_combiner(|left, right| Ok(left + right));

  let pipeline = Pipeline::new(FilterStage::new(|line: &String| !line.is_empty()).then(counter));
  let partitions = vec![owned_lines(&["a", "", "b"]), owned_lines(&["c"]), owned_lines(&["", ""])];
  let mut out = Vec::new();
  let report = pipeline.run_parallel(partitions, |n: usize| out.push(n)).unwrap();
  assert_eq!(out, vec![3]);
  assert_eq!(report.partitions, 3);
  assert_eq!(report.pulled, 6);
}

/// Passes inputs on and stops after the `limit`-th one.
fn stop_after(limit: usize) -> FnStage<u8, u8, usize> {
  FnStage::new(
    || 0usize,
    move |seen: &mut usize, item: u8, downstream: &mut dyn Downstream<u8>| {
      *seen += 1;
      let signal = downstream.push(item);
      Ok(signal.and(Signal::continue_if(*seen < limit)))
    },
  )
}

fn run_chunked<G>(stage: G, input: &[u8]) -> (Vec<Vec<u8>>, usize)
where
  G: gatherweave::Stage<u8, Output = Vec<u8>>,
{
  let pulls = Cell::new(0);
  let out = Pipeline::new(stage)
    .collect(input.iter().copied().inspect(|_| pulls.set(pulls.get() + 1)))
    .unwrap();
  (out, pulls.get())
}

fn run_counting<G>(stage: G, input: &[u8]) -> (Vec<u8>, usize)
where
  G: gatherweave::Stage<u8, Output = u8>,
{
  let pulls = Cell::new(0);
  let out = Pipeline::new(stage)
    .collect(input.iter().copied().inspect(|_| pulls.set(pulls.get() + 1)))
    .unwrap();
  (out, pulls.get())
}

proptest! {
  #[test]
  fn prop_composition_is_associative(
    input in proptest::collection::vec(0u8..8, 0..64),
    limit in 0usize..40,
    modulus in 1u8..4,
  ) {
    let a = || FilterStage::new(move |x: &u8| x % modulus == 0);
    let b = || DedupStage::<u8>::streaming();
    let c = || LimitStage::<u8>::new(limit);

    let left = run_counting(a().then(b()).then(c()), &input);
    let right = run_counting(a().then(b().then(c())), &input);
    prop_assert_eq!(left, right);
  }

  #[test]
  fn prop_finisher_flush_is_associative_after_stop(
    input in proptest::collection::vec(0u8..8, 0..64),
    stop in 1usize..40,
    size in 1usize..5,
  ) {
    let a = || MapStage::new(|x: u8| x + 1);
    let b = || stop_after(stop);
    let c = || ChunkStage::<u8>::new(size);

    let left = run_chunked(a().then(b()).then(c()), &input);
    let right = run_chunked(a().then(b().then(c())), &input);
    let flattened: Vec<u8> = left.0.iter().flatten().copied().collect();
    prop_assert_eq!(flattened.len(), stop.min(input.len()));
    prop_assert_eq!(left, right);
  }

  #[test]
  fn prop_limit_never_pulls_past_limit(
    input in proptest::collection::vec(any::<u8>(), 0..64),
    limit in 1usize..16,
  ) {
    let (out, pulls) = run_counting(LimitStage::new(limit), &input);
    prop_assert_eq!(out.len(), limit.min(input.len()));
    if input.len() >= limit {
      prop_assert_eq!(pulls, limit);
    } else {
      prop_assert_eq!(pulls, input.len());
    }
  }
}
