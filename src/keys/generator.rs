use std::marker::PhantomData;

use rand::Rng;
use tracing::{debug, instrument};

use super::{KeyPair, KeyTag, PublicKey, SecretKey};
use crate::{
    crypto::FheResult,
    params::RlweParams,
    rings::{PolyDistribution, Representation, RnsPoly},
};

/// Generates key pairs for any parameter set implementing [`RlweParams`].
pub struct KeyGenerator<'a, P, const DEGREE: usize>
where
    P: RlweParams<DEGREE>,
{
    params: &'a P,
    _degree: PhantomData<[u64; DEGREE]>,
}

impl<'a, P, const DEGREE: usize> KeyGenerator<'a, P, DEGREE>
where
    P: RlweParams<DEGREE>,
{
    pub fn new(params: &'a P) -> Self {
        Self {
            params,
            _degree: PhantomData,
        }
    }

    /// Samples `s` and `(b, a)` over the public-key limb set, then truncates
    /// `s` to the secret-key limb set.
    #[instrument(skip_all, fields(degree = DEGREE))]
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> FheResult<KeyPair<DEGREE>> {
        let params = self.params;
        let pk_basis = params.public_key_basis();
        let distribution = params
            .secret_key_distribution()
            .poly_distribution::<DEGREE>(params.error_std_dev())?;

        let mut s = RnsPoly::sample(distribution, pk_basis.clone(), Representation::Evaluation, rng);
        let a = RnsPoly::sample(
            PolyDistribution::Uniform,
            pk_basis.clone(),
            Representation::Evaluation,
            rng,
        );
        let mut b = RnsPoly::sample(
            params.error_distribution(),
            pk_basis.clone(),
            Representation::Evaluation,
            rng,
        );
        b.scalar_mul_assign(params.noise_scale());
        let mut a_s = a.clone();
        a_s.try_mul_assign(&s)?;
        b.try_sub_assign(&a_s)?;

        let sk_basis = params.secret_key_basis();
        if pk_basis.limb_count() > sk_basis.limb_count() {
            s.truncate_to(sk_basis)?;
        }
        debug!(
            public_key_limbs = pk_basis.limb_count(),
            secret_key_limbs = s.limb_count(),
            distribution = %params.secret_key_distribution(),
            "generated key pair"
        );

        let key_tag = KeyTag::random(rng);
        Ok(KeyPair {
            secret_key: SecretKey { s, key_tag },
            public_key: PublicKey { b, a, key_tag },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        math::generate_primes,
        params::{BfvParams, SecretKeyDistribution},
    };
    use num_bigint::BigInt;
    use num_traits::{Signed, ToPrimitive};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn public_key_is_small_rlwe_sample() {
        let params = BfvParams::<32>::builder()
            .moduli(generate_primes(40, 2, 32))
            .plaintext_modulus(65537)
            .build()
            .unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let keys = KeyGenerator::new(&params).generate(&mut rng).unwrap();

        // b + a * s = e
        let mut noise = keys.public_key.a().clone();
        noise.try_mul_assign(keys.secret_key.poly()).unwrap();
        noise.try_add_assign(keys.public_key.b()).unwrap();
        for c in noise.to_centered_coeffs() {
            assert!(c.abs() < BigInt::from(40));
        }
        assert_eq!(keys.secret_key.key_tag(), keys.public_key.key_tag());
    }

    #[test]
    fn secret_key_is_truncated_to_chain() {
        let primes = generate_primes(40, 3, 32);
        let params = BfvParams::<32>::builder()
            .moduli(primes[..2].to_vec())
            .plaintext_modulus(65537)
            .public_key_extension(vec![primes[2]])
            .secret_key_distribution(SecretKeyDistribution::SparseTernary { hamming_weight: 8 })
            .build()
            .unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let keys = KeyGenerator::new(&params).generate(&mut rng).unwrap();

        assert_eq!(keys.public_key.b().limb_count(), 3);
        assert_eq!(keys.secret_key.poly().limb_count(), 2);
        let coeffs = keys.secret_key.poly().to_centered_coeffs();
        let weight = coeffs
            .iter()
            .filter(|c| c.to_i64().unwrap() != 0)
            .count();
        assert_eq!(weight, 8);
    }
}
