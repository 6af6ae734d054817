//! Helpers for driving a single chain: initialization with retries, burn-in and
//! collecting a trace of samples.

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use rand::Rng;

use crate::distributions::{Proposal, Target};
use crate::error::StepError;
use crate::metropolis_hastings::MetropolisHastings;

pub trait MarkovChain {
    type Sample;

    /// Does one iteration of the chain.
    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), StepError>;

    /// The current sample. Panics if the chain is uninitialized.
    fn current_sample(&self) -> &Self::Sample;

    fn is_initialized(&self) -> bool;

    /// Whether the last step produced a new sample.
    fn is_new_state(&self) -> bool;
}

impl<T, D, Q> MarkovChain for MetropolisHastings<T, D, Q>
where
    D: Target<T>,
    Q: Proposal<T>,
{
    type Sample = T;

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), StepError> {
        MetropolisHastings::step(self, rng)
    }

    fn current_sample(&self) -> &T {
        MetropolisHastings::current_sample(self)
    }

    fn is_initialized(&self) -> bool {
        MetropolisHastings::is_initialized(self)
    }

    fn is_new_state(&self) -> bool {
        MetropolisHastings::is_new_state(self)
    }
}

/// Initialization attempts allowed by [`RunConfig::default`] and [`burn_in`].
pub const DEFAULT_MAX_INIT_ATTEMPTS: usize = 1_000;

/// Settings for [`run_chain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of transitions after initialization.
    pub n_steps: usize,
    /// Number of leading transitions dropped from the trace (burn-in).
    pub discard: usize,
    /// Upper bound on initialization attempts.
    pub max_init_attempts: usize,
    /// Show an indicatif progress bar.
    pub progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            n_steps: 1_000,
            discard: 0,
            max_init_attempts: DEFAULT_MAX_INIT_ATTEMPTS,
            progress: false,
        }
    }
}

impl RunConfig {
    pub fn new(n_steps: usize) -> Self {
        Self {
            n_steps,
            ..Self::default()
        }
    }

    pub fn set_discard(mut self, discard: usize) -> Self {
        self.discard = discard;
        self
    }

    pub fn set_max_init_attempts(mut self, attempts: usize) -> Self {
        self.max_init_attempts = attempts;
        self
    }

    pub fn set_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }
}

/// Samples collected by [`run_chain`].
#[derive(Debug, Clone, PartialEq)]
pub struct Trace<T> {
    /// Current sample after each kept transition.
    pub samples: Vec<T>,
    /// Accepted candidates over all transitions, burn-in included.
    pub n_accepted: usize,
    /// Transitions performed, burn-in included.
    pub n_transitions: usize,
    /// Steps spent initializing the chain (0 if it was already initialized).
    pub init_attempts: usize,
}

impl<T> Trace<T> {
    pub fn acceptance_rate(&self) -> f64 {
        if self.n_transitions == 0 {
            return 0.0;
        }
        self.n_accepted as f64 / self.n_transitions as f64
    }
}

/**
Steps `chain` until it is initialized, at most `max_attempts` times.

Returns the number of steps taken, `0` if the chain was already initialized. Errors other
than initialization errors are returned immediately; if every attempt fails, the last
initialization error is returned.

# Panics

Panics if `max_attempts` is zero and the chain is not initialized yet.
*/
pub fn initialize_chain<M, R>(
    chain: &mut M,
    rng: &mut R,
    max_attempts: usize,
) -> Result<usize, StepError>
where
    M: MarkovChain,
    R: Rng + ?Sized,
{
    if chain.is_initialized() {
        return Ok(0);
    }
    assert!(
        max_attempts > 0,
        "initializing a chain needs at least one attempt"
    );

    let mut attempts = 0;
    let mut last_err = None;
    while !chain.is_initialized() {
        if attempts == max_attempts {
            warn!("chain not initialized after {attempts} attempts");
            return Err(last_err.unwrap_or(StepError::UnsupportedInitialSample));
        }
        attempts += 1;
        match chain.step(rng) {
            Ok(()) => {}
            Err(err) if err.is_initialization() => last_err = Some(err),
            Err(err) => return Err(err),
        }
    }
    debug!("chain initialized after {attempts} attempt(s)");
    Ok(attempts)
}

/// Initializes `chain` if needed (at most [`DEFAULT_MAX_INIT_ATTEMPTS`] tries), then performs
/// `n_steps` transitions without recording anything. Returns the initialization attempts.
pub fn burn_in<M, R>(chain: &mut M, rng: &mut R, n_steps: usize) -> Result<usize, StepError>
where
    M: MarkovChain,
    R: Rng + ?Sized,
{
    let init_attempts = initialize_chain(chain, rng, DEFAULT_MAX_INIT_ATTEMPTS)?;
    for _ in 0..n_steps {
        chain.step(rng)?;
    }
    Ok(init_attempts)
}

/**
Initializes `chain` if needed, then performs `config.n_steps` transitions, keeping the
samples after the first `config.discard` ones.

A candidate generation failure aborts the run and is returned as is; retrying is up to
the caller.
*/
pub fn run_chain<M, R>(
    chain: &mut M,
    rng: &mut R,
    config: &RunConfig,
) -> Result<Trace<M::Sample>, StepError>
where
    M: MarkovChain,
    M::Sample: Clone,
    R: Rng + ?Sized,
{
    let pb = if config.progress {
        progress_bar(config.n_steps)
    } else {
        ProgressBar::hidden()
    };
    let trace = run_chain_with_progress(chain, rng, config, &pb)?;
    pb.finish_with_message("Done!");
    Ok(trace)
}

pub fn run_chain_with_progress<M, R>(
    chain: &mut M,
    rng: &mut R,
    config: &RunConfig,
    pb: &ProgressBar,
) -> Result<Trace<M::Sample>, StepError>
where
    M: MarkovChain,
    M::Sample: Clone,
    R: Rng + ?Sized,
{
    let init_attempts = initialize_chain(chain, rng, config.max_init_attempts)?;

    let keep = config.n_steps.saturating_sub(config.discard);
    let mut samples = Vec::with_capacity(keep);
    let mut n_accepted = 0;

    pb.set_length(config.n_steps as u64);

    for i in 0..config.n_steps {
        chain.step(rng)?;
        if chain.is_new_state() {
            n_accepted += 1;
        }
        if i >= config.discard {
            samples.push(chain.current_sample().clone());
        }

        // Update progress bar
        pb.inc(1);
    }

    debug!(
        "collected {} samples, acceptance rate {:.3}",
        samples.len(),
        n_accepted as f64 / config.n_steps.max(1) as f64
    );

    Ok(Trace {
        samples,
        n_accepted,
        n_transitions: config.n_steps,
        init_attempts,
    })
}

/// A progress bar styled for chain runs.
pub fn progress_bar(n_steps: usize) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    let pb = ProgressBar::new(n_steps as u64);
    pb.set_style(style);
    pb
}
