//! BFV encryption, decryption and ciphertext compression over RNS limbs.

use num_bigint::BigUint;
use rand::Rng;
use tracing::{debug, instrument};

use super::{
    errors::{FheError, FheResult},
    types::{Ciphertext, DecryptStatus, PlainPoly, Plaintext},
    zero::EncryptionKey,
};
use crate::{
    keys::SecretKey,
    math::modular::{center, mul_div_round, reduce_signed},
    params::{BfvParams, EncryptionMode, RlweParams},
    rings::{RescaleConstants, RnsPoly, ScaleRoundConstants},
};

/// Encrypts `plaintext` under a secret or public key.
///
/// A plaintext encoded over the first `k` chain primes is encrypted at level
/// `L - k`. With the extended technique the message is lifted over the chain
/// plus auxiliary primes and rounded back down to the chain afterwards.
#[instrument(skip_all, fields(degree = DEGREE, limbs = plaintext.limb_count()))]
pub fn encrypt<K, R, const DEGREE: usize>(
    plaintext: &Plaintext<DEGREE>,
    key: &K,
    params: &BfvParams<DEGREE>,
    rng: &mut R,
) -> FheResult<Ciphertext<DEGREE>>
where
    K: EncryptionKey<DEGREE>,
    R: Rng + ?Sized,
{
    let chain_limbs = params.chain_length();
    let plaintext_limbs = plaintext.limb_count();
    let incompatible = || FheError::IncompatibleEncodingLevel {
        plaintext_limbs,
        chain_limbs,
    };
    let level = params.level_of(plaintext_limbs).ok_or_else(incompatible)?;
    let level_basis = params.basis_at_level(level).ok_or_else(incompatible)?;
    if !plaintext.poly.basis().same_limbs(level_basis) {
        return Err(incompatible());
    }
    let t = params.plaintext_modulus();

    let (mut scaled, target) = match params.mode() {
        EncryptionMode::Standard => {
            let mut scaled = plaintext.poly.clone();
            scaled.to_coefficient();
            let neg_q_mod_t = params.neg_q_mod_t(level).ok_or_else(incompatible)?;
            scaled.times_q_over_t(t, params.t_inv_mod_q(), neg_q_mod_t)?;
            (scaled, level_basis.clone())
        }
        EncryptionMode::Extended {
            qr_basis,
            t_inv_mod_qr,
            neg_qr_mod_t,
            ..
        } => {
            if level != 0 {
                return Err(incompatible());
            }
            debug!(aux_limbs = qr_basis.limb_count() - chain_limbs, "extended encryption");
            let message: Vec<BigUint> = plaintext
                .poly
                .crt_interpolate()
                .into_iter()
                .map(|c| c % t)
                .collect();
            let mut scaled = RnsPoly::from_biguint_coeffs(&message, qr_basis.clone());
            scaled.times_q_over_t(t, t_inv_mod_qr, *neg_qr_mod_t)?;
            (scaled, qr_basis.clone())
        }
    };

    let (mut b0, mut a0) = key.encrypt_zero(params, &target, rng)?;
    scaled.to_evaluation();
    b0.try_add_assign(&scaled)?;

    if let EncryptionMode::Extended { aux_rescale, .. } = params.mode() {
        for constants in aux_rescale {
            b0.drop_last_limb_and_rescale(constants)?;
            a0.drop_last_limb_and_rescale(constants)?;
        }
    }

    Ciphertext::fresh(b0, a0, key.key_tag(), plaintext.length)
}

/// Decrypts with the length recorded on the ciphertext.
pub fn decrypt<const DEGREE: usize>(
    ciphertext: &Ciphertext<DEGREE>,
    secret_key: &SecretKey<DEGREE>,
    params: &BfvParams<DEGREE>,
) -> FheResult<(PlainPoly, DecryptStatus)> {
    decrypt_with_length(ciphertext, secret_key, params, None)
}

/// Decrypts `ciphertext`, annotating the result with `length` meaningful
/// coefficients (the ciphertext's own length when `None`).
///
/// Full-chain ciphertexts are scaled down with the configured
/// scale-and-round family. Ciphertexts with fewer limbs are first rescaled
/// one prime at a time down to a single limb, then rounded from `q_0` to `t`.
#[instrument(skip_all, fields(degree = DEGREE, limbs = ciphertext.limb_count()))]
pub fn decrypt_with_length<const DEGREE: usize>(
    ciphertext: &Ciphertext<DEGREE>,
    secret_key: &SecretKey<DEGREE>,
    params: &BfvParams<DEGREE>,
    length: Option<usize>,
) -> FheResult<(PlainPoly, DecryptStatus)> {
    let max = params.max_slots();
    let length = length.unwrap_or(ciphertext.length());
    if length > max {
        return Err(FheError::DecryptionLengthMismatch {
            requested: length,
            max,
        });
    }
    if ciphertext.key_tag() != secret_key.key_tag() {
        return Err(FheError::KeyTagMismatch);
    }

    let chain_limbs = params.chain_length();
    let limbs = ciphertext.limb_count();
    let level = params
        .level_of(limbs)
        .ok_or(FheError::IncompatibleEncodingLevel {
            plaintext_limbs: limbs,
            chain_limbs,
        })?;

    let s = secret_key.poly_over(ciphertext.c0().basis())?;
    let mut raw = ciphertext.c1().clone();
    raw.try_mul_assign(&s)?;
    raw.try_add_assign(ciphertext.c0())?;

    let t = params.plaintext_modulus();
    let coeffs = if level == 0 {
        raw.to_coefficient();
        let family = match params.scale_round() {
            ScaleRoundConstants::Decomposition(_) => "decomposition",
            ScaleRoundConstants::GammaCorrection(_) => "gamma-correction",
        };
        debug!(family, "scale-and-round decryption");
        raw.scale_and_round(params.scale_round())?
    } else {
        debug!(level, "compressed decryption");
        for step in 0..limbs - 1 {
            let constants = rescale_constants(params, level + step)?;
            raw.drop_last_limb_and_rescale(constants)?;
        }
        raw.to_coefficient();
        let q0 = raw.basis().moduli()[0];
        raw.limbs()[0]
            .iter()
            .map(|&x| reduce_signed(mul_div_round(center(x, q0), t, q0), t))
            .collect()
    };

    Ok((
        PlainPoly::new(coeffs, t, length),
        DecryptStatus {
            message_length: length,
        },
    ))
}

fn rescale_constants<const DEGREE: usize>(
    params: &BfvParams<DEGREE>,
    level: usize,
) -> FheResult<&RescaleConstants> {
    params
        .rescale_constants(level)
        .ok_or_else(|| FheError::invalid(format!("no rescale constants for level {level}")))
}

/// Rescales a ciphertext down to `towers_left` limbs, one prime at a time.
#[instrument(skip_all, fields(from = ciphertext.limb_count(), to = towers_left))]
pub fn compress<const DEGREE: usize>(
    ciphertext: &Ciphertext<DEGREE>,
    params: &BfvParams<DEGREE>,
    towers_left: usize,
) -> FheResult<Ciphertext<DEGREE>> {
    let limbs = ciphertext.limb_count();
    if towers_left == 0 || towers_left > limbs {
        return Err(FheError::invalid(format!(
            "cannot compress a {limbs}-limb ciphertext to {towers_left} limbs"
        )));
    }
    let level = params
        .level_of(limbs)
        .ok_or_else(|| FheError::invalid("ciphertext has more limbs than the chain"))?;

    let (mut c0, mut c1) = (ciphertext.c0().clone(), ciphertext.c1().clone());
    for step in 0..limbs - towers_left {
        let constants = rescale_constants(params, level + step)?;
        c0.drop_last_limb_and_rescale(constants)?;
        c1.drop_last_limb_and_rescale(constants)?;
    }
    ciphertext.with_elements(c0, c1)
}
