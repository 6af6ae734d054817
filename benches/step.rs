use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::{arr1, arr2};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use simpling::core::initialize_chain;
use simpling::distributions::{Gaussian2D, IsotropicGaussian, RandomWalk, Triangular};
use simpling::metropolis_hastings::MetropolisHastings;

fn bench_triangle(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut chain = MetropolisHastings::new(
        Triangular::new(2.0),
        RandomWalk::new(0.0, 1.0, 0.5).unwrap(),
    );
    initialize_chain(&mut chain, &mut rng, 1_000).unwrap();
    c.bench_function("triangle step", |b| {
        b.iter(|| {
            chain.step(&mut rng).unwrap();
            black_box(chain.current_sample());
        })
    });
}

fn bench_gaussian_2d(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(42);
    let target = Gaussian2D {
        mean: arr1(&[0.0, 0.0]),
        cov: arr2(&[[4.0, 2.0], [2.0, 3.0]]),
    };
    let proposal = IsotropicGaussian::new(1.0, vec![0.0, 0.0]).unwrap();
    let mut chain = MetropolisHastings::new(target, proposal);
    initialize_chain(&mut chain, &mut rng, 1).unwrap();
    c.bench_function("gaussian 2d step", |b| {
        b.iter(|| {
            chain.step(&mut rng).unwrap();
            black_box(chain.current_sample());
        })
    });
}

criterion_group!(benches, bench_triangle, bench_gaussian_2d);
criterion_main!(benches);
