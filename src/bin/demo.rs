//! Samples the ^-shaped density `2 - |x|` on `(-2, 2)` with a Gaussian random walk and prints
//! a histogram of the chain, which should look like a triangle peaked at zero.
//!
//! Set `RUST_LOG=debug` to see initialization attempts.

use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use simpling::core::{run_chain, RunConfig};
use simpling::distributions::{RandomWalk, Triangular};
use simpling::metropolis_hastings::MetropolisHastings;
use simpling::stats::Histogram;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    const RADIUS: f64 = 2.0;
    const BURNIN: usize = 100_000;
    const ITERATIONS: usize = 1_000_000;
    const N_BINS: usize = 20;
    const SEED: u64 = 42;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Start far outside the support on purpose: most initial draws are rejected.
    let target = Triangular::new(RADIUS);
    let proposal = RandomWalk::new(0.0, 100.0, 0.5)?;
    let mut chain = MetropolisHastings::new(target, proposal);
    let mut rng = SmallRng::seed_from_u64(SEED);

    let config = RunConfig::new(BURNIN + ITERATIONS)
        .set_discard(BURNIN)
        .set_progress(true);
    let trace = run_chain(&mut chain, &mut rng, &config)?;
    info!("chain initialized after {} attempt(s)", trace.init_attempts);

    let mut hist = Histogram::new(-RADIUS, RADIUS, N_BINS)?;
    hist.extend(trace.samples.iter().copied());

    println!("Generated {} samples", trace.samples.len());
    println!("Acceptance rate: {:.3}", trace.acceptance_rate());
    println!("{}", hist.render_ascii(60));

    #[cfg(feature = "csv")]
    {
        simpling::io::csv::save_csv(&trace.samples, "samples.csv")?;
        simpling::io::csv::save_histogram_csv(&hist, "histogram.csv")?;
        println!("Saved samples.csv and histogram.csv");
    }

    Ok(())
}
