//! Tests sampling the bounded ^-shaped density `ln(2 - |x|)` on `(-2, 2)` with a
//! Gaussian random walk.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use simpling::core::{burn_in, initialize_chain, run_chain, RunConfig};
use simpling::distributions::{RandomWalk, Target, Triangular};
use simpling::metropolis_hastings::MetropolisHastings;
use simpling::stats::{AcceptanceTracker, Histogram};

const RADIUS: f64 = 2.0;
const SEED: u64 = 42;

fn triangle_chain() -> MetropolisHastings<f64, Triangular, RandomWalk> {
    let target = Triangular::new(RADIUS);
    let proposal = RandomWalk::new(0.0, 100.0, 0.5).expect("valid random walk");
    MetropolisHastings::new(target, proposal)
}

#[test]
fn test_long_burn_in_stays_in_support() {
    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut chain = triangle_chain();
    initialize_chain(&mut chain, &mut rng, 100_000).unwrap();
    burn_in(&mut chain, &mut rng, 1_000_000).unwrap();

    assert!(chain.is_initialized());
    let x = *chain.current_sample();
    assert!(-RADIUS < x && x < RADIUS, "sample {x} left the support");
}

#[test]
fn test_histogram_is_triangular() {
    const N_BINS: usize = 20;
    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut chain = triangle_chain();
    let config = RunConfig::new(1_050_000).set_discard(50_000);
    let trace = run_chain(&mut chain, &mut rng, &config).unwrap();

    let mut hist = Histogram::new(-RADIUS, RADIUS, N_BINS).unwrap();
    hist.extend(trace.samples.iter().copied());
    assert_eq!(hist.below() + hist.above() + hist.invalid(), 0);
    assert_eq!(hist.total(), 1_000_000);

    // normalized density of the triangle is (radius - |x|) / radius^2
    let densities = hist.densities();
    for (center, density) in hist.bin_centers().iter().zip(densities.iter()) {
        let expected = (RADIUS - center.abs()) / (RADIUS * RADIUS);
        assert!(
            (density - expected).abs() < 0.03,
            "bin at {center}: density {density}, expected {expected}"
        );
    }

    // the two central bins hold the peak
    let counts = hist.counts();
    let peak = counts.iter().copied().max().unwrap();
    assert!(counts[N_BINS / 2 - 1] == peak || counts[N_BINS / 2] == peak);
}

#[test]
fn test_acceptance_rate_in_reference_range() {
    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut chain = triangle_chain();
    initialize_chain(&mut chain, &mut rng, 100_000).unwrap();
    burn_in(&mut chain, &mut rng, 10_000).unwrap();

    let mut tracker = AcceptanceTracker::default();
    for _ in 0..200_000 {
        chain.step(&mut rng).unwrap();
        tracker.step(chain.is_new_state());
    }
    let rate = tracker.rate();
    assert!((0.5..=0.9).contains(&rate), "acceptance rate {rate}");
}

#[test]
fn test_cached_log_prob_consistent() {
    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut chain = triangle_chain();
    initialize_chain(&mut chain, &mut rng, 100_000).unwrap();
    for _ in 0..10_000 {
        chain.step(&mut rng).unwrap();
        let rescored = chain
            .target()
            .unnorm_log_prob(chain.current_sample())
            .expect("current sample must be supported");
        assert_eq!(rescored.to_bits(), chain.current_log_prob().to_bits());
    }
}

#[test]
fn test_same_seed_same_samples() {
    let run = |seed: u64| {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut chain = triangle_chain();
        run_chain(&mut chain, &mut rng, &RunConfig::new(10_000))
            .unwrap()
            .samples
    };
    assert_eq!(run(SEED), run(SEED));
}
