//! Sequential composition of two stages.
//!
//! [`Chain<A, B>`] is itself a [`Stage`]: its state is the pair of member
//! states plus a flag recording whether `B` has stopped. Every element `A`
//! pushes is handed to `B` immediately, depth first, so one output of `A` is
//! fully processed by `B` and everything after it before `A` pushes the next.
//!
//! Once `B` answers [`Signal::Stop`], the chain drops anything else `A`
//! pushes (the push answers `Stop`) and itself answers `Stop` when `A`
//! returns. Pushes `B` already made in that same call still went through.
//! Both finishers always run, `A`'s first, its output integrated by `B`
//! unless `B` has stopped.

use crate::downstream::Downstream;
use crate::error::{ComponentInfo, StageError, StageResult};
use crate::signal::Signal;
use crate::stage::{Parallelism, Stage};
use std::marker::PhantomData;

/// Two stages run back to back. Build one with
/// [`StageExt::then`](crate::stage::StageExt::then).
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
  upstream: A,
  downstream: B,
}

impl<A, B> Chain<A, B> {
  /// Chains `downstream` after `upstream`.
  pub fn new(upstream: A, downstream: B) -> Self {
    Self {
      upstream,
      downstream,
    }
  }

  /// The first stage.
  pub fn upstream(&self) -> &A {
    &self.upstream
  }

  /// The second stage.
  pub fn downstream(&self) -> &B {
    &self.downstream
  }

  /// Splits the chain back into its members.
  pub fn into_parts(self) -> (A, B) {
    (self.upstream, self.downstream)
  }
}

/// State of a [`Chain`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChainState<SA, SB> {
  upstream: SA,
  downstream: SB,
  downstream_stopped: bool,
}

impl<SA, SB> ChainState<SA, SB> {
  /// State of the first stage.
  pub fn upstream(&self) -> &SA {
    &self.upstream
  }

  /// State of the second stage.
  pub fn downstream(&self) -> &SB {
    &self.downstream
  }

  /// Whether the second stage has answered `Stop`.
  pub fn is_downstream_stopped(&self) -> bool {
    self.downstream_stopped
  }
}

/// The downstream handed to `A`: integrates each push into `B`.
struct Relay<'a, 'd, U, B: Stage<U>> {
  stage: &'a B,
  state: &'a mut B::State,
  stopped: &'a mut bool,
  outer: &'a mut (dyn Downstream<B::Output> + 'd),
  error: Option<StageError>,
  _input: PhantomData<fn(U)>,
}

impl<U, B: Stage<U>> Downstream<U> for Relay<'_, '_, U, B> {
  fn push(&mut self, item: U) -> Signal {
    if self.is_rejecting() {
      return Signal::Stop;
    }
    match self.stage.integrate(self.state, item, &mut *self.outer) {
      Ok(Signal::Continue) => Signal::Continue,
      Ok(Signal::Stop) => {
        *self.stopped = true;
        Signal::Stop
      }
      Err(error) => {
        self.error = Some(error.attribute(self.stage.component_info()));
        Signal::Stop
      }
    }
  }

  fn is_rejecting(&self) -> bool {
    *self.stopped || self.error.is_some() || self.outer.is_rejecting()
  }
}

impl<T, A, B> Stage<T> for Chain<A, B>
where
  A: Stage<T>,
  B: Stage<A::Output>,
{
  type Output = B::Output;
  type State = ChainState<A::State, B::State>;

  fn initialize(&self) -> Self::State {
    ChainState {
      upstream: self.upstream.initialize(),
      downstream: self.downstream.initialize(),
      downstream_stopped: false,
    }
  }

  fn integrate(
    &self,
    state: &mut Self::State,
    item: T,
    downstream: &mut dyn Downstream<Self::Output>,
  ) -> StageResult<Signal> {
    if state.downstream_stopped {
      return Ok(Signal::Stop);
    }
    let ChainState {
      upstream: upstream_state,
      downstream: downstream_state,
      downstream_stopped,
    } = state;
    let mut relay = Relay {
      stage: &self.downstream,
      state: &mut *downstream_state,
      stopped: &mut *downstream_stopped,
      outer: downstream,
      error: None,
      _input: PhantomData,
    };
    let signal = self.upstream.integrate(upstream_state, item, &mut relay);
    if let Some(error) = relay.error.take() {
      return Err(error);
    }
    let signal = signal.map_err(|e| e.attribute(self.upstream.component_info()))?;
    if *downstream_stopped {
      Ok(Signal::Stop)
    } else {
      Ok(signal)
    }
  }

  fn finish(
    &self,
    state: Self::State,
    downstream: &mut dyn Downstream<Self::Output>,
  ) -> StageResult<()> {
    let ChainState {
      upstream: upstream_state,
      downstream: mut downstream_state,
      mut downstream_stopped,
    } = state;
    let mut relay = Relay {
      stage: &self.downstream,
      state: &mut downstream_state,
      stopped: &mut downstream_stopped,
      outer: &mut *downstream,
      error: None,
      _input: PhantomData,
    };
    let flushed = self.upstream.finish(upstream_state, &mut relay);
    if let Some(error) = relay.error.take() {
      return Err(error);
    }
    flushed.map_err(|e| e.attribute(self.upstream.component_info()))?;
    self
      .downstream
      .finish(downstream_state, downstream)
      .map_err(|e| e.attribute(self.downstream.component_info()))
  }

  fn combine(&self, left: Self::State, right: Self::State) -> StageResult<Self::State> {
    let upstream = self
      .upstream
      .combine(left.upstream, right.upstream)
      .map_err(|e| e.attribute(self.upstream.component_info()))?;
    let downstream = self
      .downstream
      .combine(left.downstream, right.downstream)
      .map_err(|e| e.attribute(self.downstream.component_info()))?;
    Ok(ChainState {
      upstream,
      downstream,
      downstream_stopped: left.downstream_stopped || right.downstream_stopped,
    })
  }

  fn parallelism(&self) -> Parallelism {
    self.upstream.parallelism().and(self.downstream.parallelism())
  }

  fn component_info(&self) -> ComponentInfo {
    let upstream = self.upstream.component_info();
    let downstream = self.downstream.component_info();
    ComponentInfo::new(
      format!("{} -> {}", upstream.name, downstream.name),
      "Chain".to_string(),
    )
  }
}
