/*!
# simpling

A generic Metropolis–Hastings Markov chain. Callers supply a [`Target`](distributions::Target)
(the unnormalized log-density), a [`Proposal`](distributions::Proposal) (starting sample and
candidate generation) and a random source, then drive the chain one step at a time.

```rust
use rand::rngs::SmallRng;
use rand::SeedableRng;
use simpling::core::{run_chain, RunConfig};
use simpling::distributions::{RandomWalk, Triangular};
use simpling::metropolis_hastings::MetropolisHastings;

let mut chain = MetropolisHastings::new(
    Triangular::new(2.0),
    RandomWalk::new(0.0, 100.0, 0.5).unwrap(),
);
let mut rng = SmallRng::seed_from_u64(42);
let trace = run_chain(&mut chain, &mut rng, &RunConfig::new(2_000).set_discard(500)).unwrap();
assert_eq!(trace.samples.len(), 1_500);
assert!(trace.samples.iter().all(|x| x.abs() < 2.0));
```
*/

pub mod core;
pub mod distributions;
pub mod error;
pub mod io;
pub mod metropolis_hastings;
pub mod stats;

pub use error::{GenerationFailure, StepError, Unsupported};
pub use metropolis_hastings::MetropolisHastings;
