//! Diagnostics for eyeballing a sampler: acceptance-rate tracking and histograms.

use ndarray::prelude::*;
use num_traits::ToPrimitive;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("histogram needs at least one bin")]
    NoBins,
    #[error("invalid histogram range [{lo}, {hi})")]
    InvalidRange { lo: f64, hi: f64 },
    #[error("acceptance window must be positive")]
    EmptyWindow,
}

/// Tracks the fraction of steps that produced a new sample, overall and over a sliding window.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptanceTracker {
    n: u64,
    n_accepted: u64,
    window: usize,
    accept_queue: VecDeque<bool>,
    n_window_accepted: usize,
}

impl Default for AcceptanceTracker {
    fn default() -> Self {
        Self {
            n: 0,
            n_accepted: 0,
            window: 100,
            accept_queue: VecDeque::new(),
            n_window_accepted: 0,
        }
    }
}

impl AcceptanceTracker {
    pub fn new(window: usize) -> Result<Self, StatsError> {
        if window == 0 {
            return Err(StatsError::EmptyWindow);
        }
        Ok(Self {
            window,
            accept_queue: VecDeque::with_capacity(window + 1),
            ..Self::default()
        })
    }

    /// Records one step; pass the chain's `is_new_state()`.
    pub fn step(&mut self, accepted: bool) {
        self.n += 1;
        if accepted {
            self.n_accepted += 1;
            self.n_window_accepted += 1;
        }
        self.accept_queue.push_back(accepted);
        if self.accept_queue.len() > self.window && self.accept_queue.pop_front() == Some(true) {
            self.n_window_accepted -= 1;
        }
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    /// Acceptance rate over every recorded step.
    pub fn rate(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        self.n_accepted as f64 / self.n as f64
    }

    /// Acceptance rate over the last `window` steps.
    pub fn window_rate(&self) -> f64 {
        if self.accept_queue.is_empty() {
            return 0.0;
        }
        self.n_window_accepted as f64 / self.accept_queue.len() as f64
    }
}

/// Equal-width histogram over `[lo, hi)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    lo: f64,
    hi: f64,
    counts: Array1<u64>,
    below: u64,
    above: u64,
    invalid: u64,
}

impl Histogram {
    pub fn new(lo: f64, hi: f64, n_bins: usize) -> Result<Self, StatsError> {
        if n_bins == 0 {
            return Err(StatsError::NoBins);
        }
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(StatsError::InvalidRange { lo, hi });
        }
        Ok(Self {
            lo,
            hi,
            counts: Array1::zeros(n_bins),
            below: 0,
            above: 0,
            invalid: 0,
        })
    }

    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        (self.hi - self.lo) / self.n_bins() as f64
    }

    /// Adds a value. Values outside the range are only counted as below/above; NaN and
    /// values with no `f64` representation are counted as invalid.
    pub fn add<V: ToPrimitive>(&mut self, value: V) {
        let x = match value.to_f64() {
            Some(x) if !x.is_nan() => x,
            _ => {
                self.invalid += 1;
                return;
            }
        };
        if x < self.lo {
            self.below += 1;
        } else if x >= self.hi {
            self.above += 1;
        } else {
            let bin = ((x - self.lo) / self.bin_width()) as usize;
            // rounding can land exactly on n_bins for x just below hi
            let bin = bin.min(self.n_bins() - 1);
            self.counts[bin] += 1;
        }
    }

    pub fn extend<V: ToPrimitive, I: IntoIterator<Item = V>>(&mut self, values: I) {
        for v in values {
            self.add(v);
        }
    }

    pub fn counts(&self) -> ArrayView1<'_, u64> {
        self.counts.view()
    }

    pub fn below(&self) -> u64 {
        self.below
    }

    pub fn above(&self) -> u64 {
        self.above
    }

    pub fn invalid(&self) -> u64 {
        self.invalid
    }

    /// Number of values that fell inside the range.
    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    pub fn bin_centers(&self) -> Array1<f64> {
        let w = self.bin_width();
        Array1::from_iter((0..self.n_bins()).map(|i| self.lo + (i as f64 + 0.5) * w))
    }

    /// Counts normalized so that the histogram integrates to one over the range.
    pub fn densities(&self) -> Array1<f64> {
        let total = self.total();
        if total == 0 {
            return Array1::zeros(self.n_bins());
        }
        let norm = total as f64 * self.bin_width();
        self.counts.mapv(|c| c as f64 / norm)
    }

    /// Renders one line per bin, with bars scaled so the fullest bin is `width` characters.
    pub fn render_ascii(&self, width: usize) -> String {
        let max = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let mut out = String::new();
        for (center, &count) in self.bin_centers().iter().zip(self.counts.iter()) {
            let len = (count as f64 / max as f64 * width as f64).round() as usize;
            out.push_str(&format!("{center:>8.3} | {} {count}\n", "#".repeat(len)));
        }
        out
    }
}
