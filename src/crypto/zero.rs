//! Encryption of zero, shared by every encryption entry point.

use std::sync::Arc;

use rand::Rng;
use tracing::trace;

use crate::{
    crypto::FheResult,
    keys::{KeyTag, PublicKey, SecretKey},
    params::{RlweParams, SecretKeyDistribution},
    rings::{PolyDistribution, Representation, RnsBasis, RnsPoly},
};

/// A key that can produce fresh encryptions of zero.
pub trait EncryptionKey<const DEGREE: usize> {
    fn key_tag(&self) -> KeyTag;

    /// Returns `(b0, a0)` in evaluation form over `target`, such that
    /// `b0 + a0 * s` is small. `target` must be a prefix of the key's limbs.
    fn encrypt_zero<P, R>(
        &self,
        params: &P,
        target: &Arc<RnsBasis<DEGREE>>,
        rng: &mut R,
    ) -> FheResult<(RnsPoly<DEGREE>, RnsPoly<DEGREE>)>
    where
        P: RlweParams<DEGREE>,
        R: Rng + ?Sized;
}

fn sample_error<P, R, const DEGREE: usize>(
    params: &P,
    target: &Arc<RnsBasis<DEGREE>>,
    rng: &mut R,
) -> RnsPoly<DEGREE>
where
    P: RlweParams<DEGREE>,
    R: Rng + ?Sized,
{
    let mut e = RnsPoly::sample(
        params.error_distribution(),
        target.clone(),
        Representation::Evaluation,
        rng,
    );
    e.scalar_mul_assign(params.noise_scale());
    e
}

impl<const DEGREE: usize> EncryptionKey<DEGREE> for SecretKey<DEGREE> {
    fn key_tag(&self) -> KeyTag {
        self.key_tag
    }

    /// `(noise_scale * e - a * s, a)` with uniform `a`.
    fn encrypt_zero<P, R>(
        &self,
        params: &P,
        target: &Arc<RnsBasis<DEGREE>>,
        rng: &mut R,
    ) -> FheResult<(RnsPoly<DEGREE>, RnsPoly<DEGREE>)>
    where
        P: RlweParams<DEGREE>,
        R: Rng + ?Sized,
    {
        let s = self.poly_over(target)?;
        let a = RnsPoly::sample(
            PolyDistribution::Uniform,
            target.clone(),
            Representation::Evaluation,
            rng,
        );
        let mut b = sample_error(params, target, rng);
        let mut a_s = a.clone();
        a_s.try_mul_assign(&s)?;
        b.try_sub_assign(&a_s)?;
        trace!(limbs = target.limb_count(), "secret-key encryption of zero");
        Ok((b, a))
    }
}

impl<const DEGREE: usize> EncryptionKey<DEGREE> for PublicKey<DEGREE> {
    fn key_tag(&self) -> KeyTag {
        self.key_tag
    }

    /// `(b * u + noise_scale * e0, a * u + noise_scale * e1)` with an
    /// ephemeral small `u`.
    fn encrypt_zero<P, R>(
        &self,
        params: &P,
        target: &Arc<RnsBasis<DEGREE>>,
        rng: &mut R,
    ) -> FheResult<(RnsPoly<DEGREE>, RnsPoly<DEGREE>)>
    where
        P: RlweParams<DEGREE>,
        R: Rng + ?Sized,
    {
        let (mut b, mut a) = self.elements_over(target)?;
        let u_distribution = match params.secret_key_distribution() {
            SecretKeyDistribution::Gaussian => params.error_distribution(),
            _ => PolyDistribution::UniformTernary,
        };
        let u = RnsPoly::sample(u_distribution, target.clone(), Representation::Evaluation, rng);
        let e0 = sample_error(params, target, rng);
        let e1 = sample_error(params, target, rng);

        b.try_mul_assign(&u)?;
        b.try_add_assign(&e0)?;
        a.try_mul_assign(&u)?;
        a.try_add_assign(&e1)?;
        trace!(limbs = target.limb_count(), "public-key encryption of zero");
        Ok((b, a))
    }
}

/// Free-function form of [`EncryptionKey::encrypt_zero`].
pub fn encryption_of_zero<K, P, R, const DEGREE: usize>(
    key: &K,
    params: &P,
    target: &Arc<RnsBasis<DEGREE>>,
    rng: &mut R,
) -> FheResult<(RnsPoly<DEGREE>, RnsPoly<DEGREE>)>
where
    K: EncryptionKey<DEGREE>,
    P: RlweParams<DEGREE>,
    R: Rng + ?Sized,
{
    key.encrypt_zero(params, target, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{keys::KeyGenerator, math::generate_primes, params::BfvParams};
    use num_bigint::BigInt;
    use num_traits::Signed;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn max_abs(b: &RnsPoly<32>, a: &RnsPoly<32>, s: &RnsPoly<32>) -> BigInt {
        let mut phase = a.clone();
        phase.try_mul_assign(s).unwrap();
        phase.try_add_assign(b).unwrap();
        phase
            .to_centered_coeffs()
            .into_iter()
            .map(|c| c.abs())
            .max()
            .unwrap()
    }

    #[test]
    fn both_keys_encrypt_zero_to_small_phase() {
        let params = BfvParams::<32>::builder()
            .moduli(generate_primes(45, 3, 32))
            .plaintext_modulus(65537)
            .build()
            .unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let keys = KeyGenerator::new(&params).generate(&mut rng).unwrap();
        let target = params.basis_at_level(1).unwrap();
        let s = keys.secret_key.poly_over(target).unwrap();

        let (b, a) = encryption_of_zero(&keys.secret_key, &params, target, &mut rng).unwrap();
        assert_eq!(b.limb_count(), 2);
        assert!(max_abs(&b, &a, &s) < BigInt::from(40));

        let (b, a) = encryption_of_zero(&keys.public_key, &params, target, &mut rng).unwrap();
        assert_eq!(a.representation(), Representation::Evaluation);
        // e*u + e0 + e1*s stays far below the modulus.
        assert!(max_abs(&b, &a, &s) < BigInt::from(1 << 12));
    }
}
