/*!
# Metropolis–Hastings Chain

This module implements a single Metropolis–Hastings Markov chain that works with any
target distribution `D` and proposal distribution `Q` implementing the traits
[`Target`] and [`Proposal`]. The chain owns both capabilities and its current
position; the random source is borrowed for the duration of each [`step`](MetropolisHastings::step).

## Overview

- **Lazy initialization**: the first successful step asks the proposal for a starting
  sample and scores it. If either fails the chain stays uninitialized and the next step
  tries again.
- **Transitions**: every later step draws a candidate and the Hastings ratio, scores the
  candidate, and accepts with probability `min(1, ratio * exp(lp_candidate - lp_current))`.
- **Rejection is not an error**: an unsupported candidate or a lost coin flip leaves the
  chain unchanged and still returns `Ok(())`. Whether the last step moved the chain is
  reported by [`is_new_state`](MetropolisHastings::is_new_state).

## Example Usage

```rust
use rand::rngs::SmallRng;
use rand::SeedableRng;
use simpling::distributions::{RandomWalk, Triangular};
use simpling::metropolis_hastings::MetropolisHastings;

let target = Triangular::new(2.0);
let proposal = RandomWalk::new(0.0, 1.0, 0.5).unwrap();
let mut chain = MetropolisHastings::new(target, proposal);
let mut rng = SmallRng::seed_from_u64(42);

while !chain.is_initialized() {
    // A starting point outside (-2, 2) is reported as an error; just retry.
    let _ = chain.step(&mut rng);
}
for _ in 0..1_000 {
    chain.step(&mut rng).unwrap();
}
assert!(chain.current_sample().abs() < 2.0);
```
*/

use log::{debug, trace};
use rand::Rng;

use crate::distributions::{Proposal, Target};
use crate::error::{StepError, Unsupported};

/// The chain's position: a sample and its cached log-density, always replaced together.
#[derive(Debug, Clone, PartialEq)]
struct Position<T> {
    sample: T,
    log_prob: f64,
}

/**
A single Metropolis–Hastings Markov chain.

# Type Parameters
- `T`: The sample type.
- `D`: The target distribution type. Must implement [`Target<T>`].
- `Q`: The proposal distribution type. Must implement [`Proposal<T>`].

The chain is not synchronized. Independent chains need independent instances and, for
statistical independence, independent random sources.
*/
#[derive(Debug, Clone)]
pub struct MetropolisHastings<T, D, Q> {
    target: D,
    proposal: Q,
    position: Option<Position<T>>,
    is_new_state: bool,
}

impl<T, D, Q> MetropolisHastings<T, D, Q>
where
    D: Target<T>,
    Q: Proposal<T>,
{
    /// Creates an uninitialized chain. Nothing is evaluated until the first [`step`](Self::step).
    pub fn new(target: D, proposal: Q) -> Self {
        Self {
            target,
            proposal,
            position: None,
            is_new_state: false,
        }
    }

    /**
    Performs one iteration of the Metropolis–Hastings algorithm.

    The first successful call only initializes the chain. Every later call proposes a
    candidate and either accepts it or keeps the current sample.

    # Errors

    - [`StepError::InitialSample`] or [`StepError::UnsupportedInitialSample`] when the chain
      could not be initialized; it stays uninitialized.
    - [`StepError::Candidate`] when the proposal could not produce a candidate; the current
      sample and its log-density are unchanged.

    The result never says whether a candidate was accepted; use [`is_new_state`](Self::is_new_state).

    # Panics

    Panics if the proposal returns a negative or NaN ratio, or if the target scores a
    sample as NaN.
    */
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), StepError> {
        let current = match &self.position {
            Some(position) => position,
            None => return self.initialize(rng),
        };

        self.is_new_state = false;

        let (candidate, ratio) = self
            .proposal
            .generate(&current.sample, rng)
            .map_err(|err| {
                debug!("candidate generation failed: {err}");
                StepError::Candidate(err)
            })?;
        assert!(
            ratio >= 0.0,
            "proposal returned an invalid Hastings ratio {ratio}"
        );

        let candidate_lp = match self.target.unnorm_log_prob(&candidate) {
            Ok(lp) => checked_log_prob(lp),
            Err(Unsupported) => {
                trace!("rejected unsupported candidate");
                return Ok(());
            }
        };

        let accept_prob = ratio * (candidate_lp - current.log_prob).exp();
        if accept_prob >= 1.0 || rng.gen::<f64>() < accept_prob {
            trace!("accepted candidate, log_prob {candidate_lp} (p = {accept_prob})");
            self.position = Some(Position {
                sample: candidate,
                log_prob: candidate_lp,
            });
            self.is_new_state = true;
        } else {
            trace!("rejected candidate (p = {accept_prob})");
        }
        Ok(())
    }

    fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), StepError> {
        let sample = self.proposal.initialize(rng).map_err(|err| {
            debug!("initial sample generation failed: {err}");
            StepError::InitialSample(err)
        })?;
        let log_prob = self
            .target
            .unnorm_log_prob(&sample)
            .map(checked_log_prob)
            .map_err(|_| {
                debug!("initial sample lies outside the target's support");
                StepError::UnsupportedInitialSample
            })?;
        debug!("chain initialized, log_prob {log_prob}");
        self.position = Some(Position { sample, log_prob });
        self.is_new_state = true;
        Ok(())
    }
}

// The cached log-density must stay comparable.
fn checked_log_prob(lp: f64) -> f64 {
    assert!(!lp.is_nan(), "target returned a NaN log-density");
    lp
}

impl<T, D, Q> MetropolisHastings<T, D, Q> {
    pub fn is_initialized(&self) -> bool {
        self.position.is_some()
    }

    /// Whether the most recent successful step produced a new sample: the initial one, or
    /// an accepted candidate.
    pub fn is_new_state(&self) -> bool {
        self.is_new_state
    }

    /// The current sample.
    ///
    /// # Panics
    ///
    /// Panics if the chain has not been initialized yet.
    pub fn current_sample(&self) -> &T {
        &self.expect_position().sample
    }

    /// The cached target log-density of [`current_sample`](Self::current_sample).
    ///
    /// # Panics
    ///
    /// Panics if the chain has not been initialized yet.
    pub fn current_log_prob(&self) -> f64 {
        self.expect_position().log_prob
    }

    pub fn try_current_sample(&self) -> Option<&T> {
        self.position.as_ref().map(|p| &p.sample)
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn proposal(&self) -> &Q {
        &self.proposal
    }

    /// Mutable access to the proposal, e.g. to change its step size between runs.
    pub fn proposal_mut(&mut self) -> &mut Q {
        &mut self.proposal
    }

    /// Consumes the chain, returning the target, the proposal and the current sample if any.
    pub fn into_parts(self) -> (D, Q, Option<T>) {
        (
            self.target,
            self.proposal,
            self.position.map(|p| p.sample),
        )
    }

    fn expect_position(&self) -> &Position<T> {
        match &self.position {
            Some(position) => position,
            None => panic!("chain state read before the chain was initialized"),
        }
    }
}
