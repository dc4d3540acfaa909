//! # Signal
//!
//! The outcome of handing one element to a stage: keep pulling, or stop.

/// Whether a stage wants more input after processing an element.
///
/// Returned by every [`Stage::integrate`](crate::stage::Stage::integrate) call
/// and by [`Downstream::push`](crate::downstream::Downstream::push). Once a
/// stage answers `Stop`, nothing at or above it in the chain receives further
/// input and the source is not pulled again.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum Signal {
  /// Request the next element.
  #[default]
  Continue,
  /// Request termination of the pull loop.
  Stop,
}

impl Signal {
  /// Returns `true` for [`Signal::Continue`].
  pub fn is_continue(self) -> bool {
    matches!(self, Signal::Continue)
  }

  /// Returns `true` for [`Signal::Stop`].
  pub fn is_stop(self) -> bool {
    matches!(self, Signal::Stop)
  }

  /// `Stop` if either side is `Stop`.
  pub fn and(self, other: Signal) -> Signal {
    if self.is_stop() || other.is_stop() {
      Signal::Stop
    } else {
      Signal::Continue
    }
  }

  /// `Continue` when `keep_going` is true, `Stop` otherwise.
  pub fn continue_if(keep_going: bool) -> Signal {
    if keep_going {
      Signal::Continue
    } else {
      Signal::Stop
    }
  }
}
