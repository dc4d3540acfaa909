//! # Built-in Stages
//!
//! Ready-made stages for common stream shapes. Every stage has a
//! `with_name` builder; the name shows up in error context and log fields.
//!
//! | Stage | Emits | Parallelism |
//! |---|---|---|
//! | [`MapStage`] | one output per input | order-independent |
//! | [`FilterStage`] | matching inputs | order-independent |
//! | [`FlatMapStage`] | zero or more outputs per input | order-independent |
//! | [`InspectStage`] | inputs unchanged, after a side effect | order-independent |
//! | [`LimitStage`] | the first *n* inputs, then stops | sequential |
//! | [`TakeWhileStage`] | inputs while a predicate holds, then stops | sequential |
//! | [`ChunkStage`] | fixed-size chunks, trailing partial chunk at finish | sequential |
//! | [`SlidingWindowStage`] | overlapping windows | sequential |
//! | [`DedupStage`] | inputs without consecutive duplicates | sequential or boundary-reconciling |
//! | [`IndexStage`] | `(item, index)` pairs | sequential |
//! | [`ScanStage`] | every running accumulation | sequential |
//! | [`FoldStage`] | the final accumulation, at finish | sequential or order-independent |
//! | [`ThresholdStage`] | inputs until their running sum exceeds a bound | sequential |

mod chunk;
mod dedup;
mod filter;
mod flat_map;
mod fold;
mod index;
mod inspect;
mod limit;
mod map;
mod scan;
mod sliding_window;
mod take_while;
mod threshold;

pub use chunk::ChunkStage;
pub use dedup::{DedupStage, DedupState};
pub use filter::FilterStage;
pub use flat_map::FlatMapStage;
pub use fold::FoldStage;
pub use index::IndexStage;
pub use inspect::InspectStage;
pub use limit::LimitStage;
pub use map::MapStage;
pub use scan::ScanStage;
pub use sliding_window::{SlidingWindowStage, WindowState};
pub use take_while::TakeWhileStage;
pub use threshold::ThresholdStage;
