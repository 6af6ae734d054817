/*!
Capability traits consumed by the chain driver, together with a handful of concrete
targets and proposals used by the demo, the tests and the benchmarks.

A [`Target`] scores a sample with the logarithm of its unnormalized density. It is
*fallible*: outside the density's support it returns [`Unsupported`] instead of
`-inf`, which the driver treats as a guaranteed rejection.

A [`Proposal`] produces the starting sample and, given the current sample, a candidate
together with the Hastings ratio `q(previous | candidate) / q(candidate | previous)`.

# Examples

```rust
use rand::rngs::SmallRng;
use rand::SeedableRng;
use simpling::distributions::{Proposal, RandomWalk, Target, Triangular};

let target = Triangular::new(2.0);
assert!(target.unnorm_log_prob(&0.0).is_ok());
assert!(target.unnorm_log_prob(&2.5).is_err());

let mut rng = SmallRng::seed_from_u64(42);
let mut proposal = RandomWalk::new(0.0, 1.0, 0.5).unwrap();
let x0 = proposal.initialize(&mut rng).unwrap();
let (candidate, ratio) = proposal.generate(&x0, &mut rng).unwrap();
assert_eq!(ratio, 1.0);
assert!(candidate.is_finite());
```
*/

use ndarray::{arr1, arr2, Array1, Array2};
use rand::Rng;
use rand_distr::{Distribution, Exp1, Normal};

use crate::error::{GenerationFailure, Unsupported};

/// A target density known up to a normalizing constant.
///
/// Implementations must be pure: scoring the same sample twice yields the same value.
pub trait Target<T> {
    /// Returns `ln p(x)` for the unnormalized density `p`, or [`Unsupported`] where `p(x) = 0`.
    fn unnorm_log_prob(&self, x: &T) -> Result<f64, Unsupported>;
}

/// A proposal mechanism for Metropolis–Hastings.
pub trait Proposal<T> {
    /// Produces the chain's starting sample.
    ///
    /// The sample may lie outside the target's support; the driver then reports an
    /// initialization error and retries on the next step.
    fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<T, GenerationFailure>;

    /// Produces a candidate from `previous` and the ratio
    /// `q(previous | candidate) / q(candidate | previous)`.
    ///
    /// The ratio must be non-negative; symmetric proposals return exactly `1.0`.
    fn generate<R: Rng + ?Sized>(
        &mut self,
        previous: &T,
        rng: &mut R,
    ) -> Result<(T, f64), GenerationFailure>;
}

/// The ^-shaped density `radius - |x|` on `(-radius, radius)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangular {
    pub radius: f64,
}

impl Triangular {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Target<f64> for Triangular {
    fn unnorm_log_prob(&self, x: &f64) -> Result<f64, Unsupported> {
        let height = self.radius - x.abs();
        // `!(h > 0)` also rejects NaN
        if !(height > 0.0) {
            return Err(Unsupported);
        }
        Ok(height.ln())
    }
}

/**
A Gaussian random walk on `f64`.

The starting sample is drawn from `Normal(init_mean, init_std)`; candidates are
`previous + Normal(0, step_std)`. The walk is symmetric, so the Hastings ratio is `1.0`.
*/
#[derive(Debug, Clone, Copy)]
pub struct RandomWalk {
    init: Normal<f64>,
    step: Normal<f64>,
}

impl RandomWalk {
    /// Fails when either standard deviation is negative or not finite.
    pub fn new(init_mean: f64, init_std: f64, step_std: f64) -> Result<Self, GenerationFailure> {
        Ok(Self {
            init: normal(init_mean, init_std)?,
            step: normal(0.0, step_std)?,
        })
    }

    pub fn step_std(&self) -> f64 {
        self.step.std_dev()
    }
}

impl Proposal<f64> for RandomWalk {
    fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<f64, GenerationFailure> {
        finite(self.init.sample(rng))
    }

    fn generate<R: Rng + ?Sized>(
        &mut self,
        previous: &f64,
        rng: &mut R,
    ) -> Result<(f64, f64), GenerationFailure> {
        let candidate = finite(previous + self.step.sample(rng))?;
        Ok((candidate, 1.0))
    }
}

/// `Normal::new` only rejects a non-finite `std`; a negative one is an error here too.
fn normal(mean: f64, std: f64) -> Result<Normal<f64>, GenerationFailure> {
    if !(std >= 0.0) {
        return Err(GenerationFailure::InvalidDistribution(format!(
            "standard deviation must be non-negative, got {std}"
        )));
    }
    Ok(Normal::new(mean, std)?)
}

fn finite(x: f64) -> Result<f64, GenerationFailure> {
    if x.is_finite() {
        Ok(x)
    } else {
        Err(GenerationFailure::Numerical(format!(
            "generated non-finite value {x}"
        )))
    }
}

/**
A 2D Gaussian distribution parameterized by a mean vector and a 2×2 covariance matrix.

It is supported everywhere, so it never returns [`Unsupported`].

# Examples

```rust
use ndarray::{arr1, arr2};
use simpling::distributions::{Gaussian2D, Target};

let gauss = Gaussian2D {
    mean: arr1(&[0.0, 0.0]),
    cov: arr2(&[[1.0, 0.0], [0.0, 1.0]]),
};
let lp = gauss.unnorm_log_prob(&vec![1.0, 0.0]).unwrap();
assert!((lp + 0.5).abs() < 1e-12);
```
*/
#[derive(Debug, Clone, PartialEq)]
pub struct Gaussian2D {
    pub mean: Array1<f64>,
    pub cov: Array2<f64>,
}

impl Gaussian2D {
    fn inv_cov(&self) -> Array2<f64> {
        let (a, b, c, d) = (
            self.cov[[0, 0]],
            self.cov[[0, 1]],
            self.cov[[1, 0]],
            self.cov[[1, 1]],
        );
        let det = a * d - b * c;
        arr2(&[[d, -b], [-c, a]]) / det
    }
}

impl Target<Vec<f64>> for Gaussian2D {
    fn unnorm_log_prob(&self, x: &Vec<f64>) -> Result<f64, Unsupported> {
        assert_eq!(x.len(), 2, "Gaussian2D expects two-dimensional samples");
        let diff = arr1(x) - &self.mean;
        Ok(-0.5 * diff.dot(&self.inv_cov().dot(&diff)))
    }
}

/**
An isotropic Gaussian random walk on `Vec<f64>`.

Every coordinate receives independent `Normal(0, std)` noise. The chain starts at a
fixed `initial_state`.
*/
#[derive(Debug, Clone)]
pub struct IsotropicGaussian {
    noise: Normal<f64>,
    pub initial_state: Vec<f64>,
}

impl IsotropicGaussian {
    /// Fails when `std` is negative or not finite.
    pub fn new(std: f64, initial_state: Vec<f64>) -> Result<Self, GenerationFailure> {
        Ok(Self {
            noise: normal(0.0, std)?,
            initial_state,
        })
    }
}

impl Proposal<Vec<f64>> for IsotropicGaussian {
    fn initialize<R: Rng + ?Sized>(&mut self, _rng: &mut R) -> Result<Vec<f64>, GenerationFailure> {
        Ok(self.initial_state.clone())
    }

    fn generate<R: Rng + ?Sized>(
        &mut self,
        previous: &Vec<f64>,
        rng: &mut R,
    ) -> Result<(Vec<f64>, f64), GenerationFailure> {
        let candidate = previous
            .iter()
            .map(|x| finite(x + self.noise.sample(rng)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((candidate, 1.0))
    }
}

/// The exponential density `exp(-rate * x)` on `x > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    pub rate: f64,
}

impl Target<f64> for Exponential {
    fn unnorm_log_prob(&self, x: &f64) -> Result<f64, Unsupported> {
        if !(*x > 0.0) || !x.is_finite() {
            return Err(Unsupported);
        }
        Ok(-self.rate * x)
    }
}

/**
A multiplicative log-normal walk on the positive reals: `candidate = previous * exp(z)`
with `z ~ Normal(0, log_std)`.

The walk is asymmetric; its Hastings ratio is `candidate / previous`. If no
`initial_state` is given the chain starts from an `Exp(1)` draw.
*/
#[derive(Debug, Clone, Copy)]
pub struct LogNormalWalk {
    log_step: Normal<f64>,
    pub initial_state: Option<f64>,
}

impl LogNormalWalk {
    pub fn new(log_std: f64) -> Result<Self, GenerationFailure> {
        Ok(Self {
            log_step: normal(0.0, log_std)?,
            initial_state: None,
        })
    }

    pub fn set_initial_state(mut self, x: f64) -> Self {
        self.initial_state = Some(x);
        self
    }
}

impl Proposal<f64> for LogNormalWalk {
    fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<f64, GenerationFailure> {
        match self.initial_state {
            Some(x) => Ok(x),
            None => Ok(Exp1.sample(rng)),
        }
    }

    fn generate<R: Rng + ?Sized>(
        &mut self,
        previous: &f64,
        rng: &mut R,
    ) -> Result<(f64, f64), GenerationFailure> {
        if !(*previous > 0.0) || !previous.is_finite() {
            return Err(GenerationFailure::Numerical(format!(
                "log-normal walk requires a positive state, got {previous}"
            )));
        }
        let candidate = finite(previous * self.log_step.sample(rng).exp())?;
        if candidate == 0.0 {
            return Err(GenerationFailure::Numerical(
                "log-normal walk underflowed to zero".to_string(),
            ));
        }
        Ok((candidate, candidate / previous))
    }
}

/// A Poisson(λ) distribution over `k = 0, 1, 2, ...`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poisson {
    pub lambda: f64,
}

impl Target<u64> for Poisson {
    fn unnorm_log_prob(&self, k: &u64) -> Result<f64, Unsupported> {
        let kf = *k as f64;
        Ok(-self.lambda + kf * self.lambda.ln() - ln_factorial(*k))
    }
}

fn ln_factorial(k: u64) -> f64 {
    (2..=k).map(|i| (i as f64).ln()).sum()
}

/**
A random walk on the non-negative integers.

From `0` it always proposes `1`; otherwise it proposes `x + 1` or `x - 1` with equal
probability. The boundary makes the walk asymmetric:

- `0 -> 1`: ratio `q(0 | 1) / q(1 | 0) = 0.5`
- `1 -> 0`: ratio `q(1 | 0) / q(0 | 1) = 2`
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NonnegativeWalk {
    pub initial_state: u64,
}

impl Proposal<u64> for NonnegativeWalk {
    fn initialize<R: Rng + ?Sized>(&mut self, _rng: &mut R) -> Result<u64, GenerationFailure> {
        Ok(self.initial_state)
    }

    fn generate<R: Rng + ?Sized>(
        &mut self,
        previous: &u64,
        rng: &mut R,
    ) -> Result<(u64, f64), GenerationFailure> {
        let x = *previous;
        if x == 0 {
            return Ok((1, 0.5));
        }
        if rng.gen_bool(0.5) {
            let next = x.checked_add(1).ok_or_else(|| {
                GenerationFailure::Numerical("non-negative walk overflowed".to_string())
            })?;
            Ok((next, 1.0))
        } else if x == 1 {
            Ok((0, 2.0))
        } else {
            Ok((x - 1, 1.0))
        }
    }
}
