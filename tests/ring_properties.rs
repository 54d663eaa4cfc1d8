use std::sync::Arc;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::ToPrimitive;
use proptest::prelude::*;
use toy_rns_fhe::{
    Representation, RnsBasis, RnsPoly,
    math::generate_primes,
    rings::RescaleConstants,
};

const DEGREE: usize = 16;

fn basis() -> Arc<RnsBasis<DEGREE>> {
    Arc::new(RnsBasis::new(generate_primes(30, 3, DEGREE as u64)).unwrap())
}

fn small_coeffs() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-1000i64..1000, DEGREE)
}

fn schoolbook(a: &[i64], b: &[i64]) -> Vec<i64> {
    let mut out = vec![0i64; DEGREE];
    for i in 0..DEGREE {
        for j in 0..DEGREE {
            let term = a[i] * b[j];
            if i + j < DEGREE {
                out[i + j] += term;
            } else {
                out[i + j - DEGREE] -= term;
            }
        }
    }
    out
}

fn centered(poly: &RnsPoly<DEGREE>) -> Vec<i64> {
    poly.to_centered_coeffs()
        .iter()
        .map(|c| c.to_i64().unwrap())
        .collect()
}

proptest! {
    #[test]
    fn ntt_multiplication_matches_schoolbook(a in small_coeffs(), b in small_coeffs()) {
        let basis = basis();
        let mut pa = RnsPoly::from_coeffs(&a, basis.clone());
        let mut pb = RnsPoly::from_coeffs(&b, basis);
        pa.to_evaluation();
        pb.to_evaluation();
        pa.try_mul_assign(&pb).unwrap();
        prop_assert_eq!(centered(&pa), schoolbook(&a, &b));
    }

    #[test]
    fn mode_round_trip_is_identity(a in small_coeffs()) {
        let original = RnsPoly::from_coeffs(&a, basis());
        let mut poly = original.clone();
        poly.to_evaluation();
        let once = poly.clone();
        poly.to_evaluation();
        prop_assert_eq!(&poly, &once);
        poly.to_coefficient();
        prop_assert_eq!(poly, original);
    }

    #[test]
    fn addition_commutes_in_both_modes(a in small_coeffs(), b in small_coeffs(), eval in any::<bool>()) {
        let basis = basis();
        let mut pa = RnsPoly::from_coeffs(&a, basis.clone());
        let mut pb = RnsPoly::from_coeffs(&b, basis);
        if eval {
            pa.to_evaluation();
            pb.to_evaluation();
        }
        let mut left = pa.clone();
        left.try_add_assign(&pb).unwrap();
        let mut right = pb;
        right.try_add_assign(&pa).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn drop_and_rescale_rounds_to_nearest(values in prop::collection::vec(any::<i64>(), DEGREE)) {
        let basis = basis();
        let moduli = basis.moduli().to_vec();
        let q_last = moduli[2] as i128;
        // Keep |x| below the two-limb product so the quotient stays centered.
        let bound = (moduli[0] as i128 * moduli[1] as i128 / 4) * q_last;
        let xs: Vec<i128> = values.iter().map(|&v| ((v as i128) << 24) % bound).collect();

        let q = BigInt::from(basis.modulus_product().clone());
        let big: Vec<BigUint> = xs
            .iter()
            .map(|&x| BigInt::from(x).mod_floor(&q).to_biguint().unwrap())
            .collect();
        let mut poly = RnsPoly::from_biguint_coeffs(&big, basis.clone());
        poly.to_evaluation();
        poly.drop_last_limb_and_rescale(&RescaleConstants::new(&moduli)).unwrap();
        prop_assert_eq!(poly.representation(), Representation::Evaluation);

        let expected: Vec<i64> = xs
            .iter()
            .map(|&x| (x + q_last / 2).div_euclid(q_last) as i64)
            .collect();
        prop_assert_eq!(centered(&poly), expected);
    }
}
