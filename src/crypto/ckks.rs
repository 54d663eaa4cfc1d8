//! Approximate-arithmetic encryption on the same RNS substrate.
//!
//! Plaintexts are already scaled by `2^scale_bits` by the encoder, so
//! encryption just masks them with an encryption of zero and decryption
//! returns the centered phase `c0 + c1 * s` as real numbers.

use num_traits::ToPrimitive;
use rand::Rng;
use tracing::instrument;

use super::{
    errors::{FheError, FheResult},
    types::{Ciphertext, DecryptStatus, Plaintext},
    zero::EncryptionKey,
};
use crate::{
    keys::SecretKey,
    params::{CkksParams, RlweParams},
};

#[instrument(skip_all, fields(degree = DEGREE, limbs = plaintext.limb_count()))]
pub fn encrypt<K, R, const DEGREE: usize>(
    plaintext: &Plaintext<DEGREE>,
    key: &K,
    params: &CkksParams<DEGREE>,
    rng: &mut R,
) -> FheResult<Ciphertext<DEGREE>>
where
    K: EncryptionKey<DEGREE>,
    R: Rng + ?Sized,
{
    let chain_limbs = params.chain_length();
    let plaintext_limbs = plaintext.limb_count();
    let target = chain_limbs
        .checked_sub(plaintext_limbs)
        .and_then(|level| params.basis_at_level(level))
        .filter(|basis| basis.same_limbs(plaintext.poly.basis()))
        .ok_or(FheError::IncompatibleEncodingLevel {
            plaintext_limbs,
            chain_limbs,
        })?;

    let (mut c0, c1) = key.encrypt_zero(params, target, rng)?;
    let mut message = plaintext.poly.clone();
    message.to_evaluation();
    c0.try_add_assign(&message)?;
    Ciphertext::fresh(c0, c1, key.key_tag(), plaintext.length)
}

/// Returns the centered coefficients of `c0 + c1 * s`, still scaled by the
/// encoding factor.
#[instrument(skip_all, fields(degree = DEGREE, limbs = ciphertext.limb_count()))]
pub fn decrypt<const DEGREE: usize>(
    ciphertext: &Ciphertext<DEGREE>,
    secret_key: &SecretKey<DEGREE>,
    params: &CkksParams<DEGREE>,
) -> FheResult<(Vec<f64>, DecryptStatus)> {
    let max = params.max_slots();
    if ciphertext.length() > max {
        return Err(FheError::DecryptionLengthMismatch {
            requested: ciphertext.length(),
            max,
        });
    }
    if ciphertext.key_tag() != secret_key.key_tag() {
        return Err(FheError::KeyTagMismatch);
    }
    let s = secret_key.poly_over(ciphertext.c0().basis())?;
    let mut phase = ciphertext.c1().clone();
    phase.try_mul_assign(&s)?;
    phase.try_add_assign(ciphertext.c0())?;

    let coeffs = phase
        .to_centered_coeffs()
        .iter()
        .map(|c| c.to_f64().unwrap_or(f64::NAN))
        .collect();
    Ok((
        coeffs,
        DecryptStatus {
            message_length: ciphertext.length(),
        },
    ))
}
