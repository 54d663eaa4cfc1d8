use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use toy_rns_fhe::{
    PolyDistribution, Representation, RnsBasis, RnsPoly,
    math::generate_primes,
    rings::{RescaleConstants, ScaleRoundConstants},
};

const DEGREE: usize = 2048;

fn random_poly(basis: &Arc<RnsBasis<DEGREE>>, rng: &mut ChaCha20Rng) -> RnsPoly<DEGREE> {
    RnsPoly::sample(
        PolyDistribution::Uniform,
        basis.clone(),
        Representation::Evaluation,
        rng,
    )
}

fn bench_ntt(c: &mut Criterion) {
    let mut group = c.benchmark_group("ntt");
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    for limbs in [1usize, 3, 6] {
        let basis = Arc::new(RnsBasis::new(generate_primes(50, limbs, DEGREE as u64)).unwrap());
        let poly = random_poly(&basis, &mut rng);
        group.bench_with_input(BenchmarkId::new("round_trip", limbs), &poly, |b, poly| {
            b.iter(|| {
                let mut p = black_box(poly.clone());
                p.to_coefficient();
                p.to_evaluation();
                p
            })
        });
    }
    group.finish();
}

fn bench_mul(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::seed_from_u64(2);
    let basis = Arc::new(RnsBasis::new(generate_primes(50, 4, DEGREE as u64)).unwrap());
    let a = random_poly(&basis, &mut rng);
    let b_poly = random_poly(&basis, &mut rng);
    c.bench_function("pointwise_mul_4_limbs", |b| {
        b.iter(|| {
            let mut p = black_box(a.clone());
            p.try_mul_assign(&b_poly).unwrap();
            p
        })
    });
}

fn bench_rescale(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let moduli = generate_primes(50, 4, DEGREE as u64);
    let basis = Arc::new(RnsBasis::new(moduli.clone()).unwrap());
    let constants = RescaleConstants::new(&moduli);
    let poly = random_poly(&basis, &mut rng);
    c.bench_function("drop_last_limb_and_rescale", |b| {
        b.iter(|| {
            let mut p = black_box(poly.clone());
            p.drop_last_limb_and_rescale(&constants).unwrap();
            p
        })
    });
}

fn bench_scale_and_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("scale_and_round");
    let mut rng = ChaCha20Rng::seed_from_u64(4);
    let moduli = generate_primes(50, 3, DEGREE as u64);
    let basis = Arc::new(RnsBasis::new(moduli.clone()).unwrap());
    let mut poly = random_poly(&basis, &mut rng);
    poly.to_coefficient();

    let families = [
        ("decomposition", ScaleRoundConstants::Decomposition(
            toy_rns_fhe::rings::DecompositionTables::new(&moduli, 65537),
        )),
        ("gamma", ScaleRoundConstants::GammaCorrection(
            toy_rns_fhe::rings::GammaTables::new(&moduli, 65537),
        )),
    ];
    for (name, constants) in &families {
        group.bench_function(*name, |b| {
            b.iter(|| black_box(&poly).scale_and_round(constants).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ntt, bench_mul, bench_rescale, bench_scale_and_round);
criterion_main!(benches);
