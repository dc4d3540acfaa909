//! Pipeline configuration.
//!
//! `PipelineConfig` derives `serde` traits so it can be embedded in whatever
//! configuration format the host application already loads.

use serde::{Deserialize, Serialize};

/// Configuration for a [`Pipeline`](crate::pipeline::Pipeline).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// Optional name for identifying this pipeline in logs.
  pub name: Option<String>,
  /// Worker threads for parallel runs. `None` uses the global pool.
  pub max_threads: Option<usize>,
}

impl PipelineConfig {
  /// Sets the name for this pipeline configuration.
  pub fn with_name(mut self, name: String) -> Self {
    self.name = Some(name);
    self
  }

  /// Sets the number of worker threads for parallel runs.
  pub fn with_max_threads(mut self, max_threads: usize) -> Self {
    self.max_threads = Some(max_threads);
    self
  }

  /// Returns the configured name, or `"pipeline"`.
  pub fn name(&self) -> &str {
    self.name.as_deref().unwrap_or("pipeline")
  }
}
