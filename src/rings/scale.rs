//! Precomputed constants for moving values between moduli without
//! materializing big integers.
//!
//! Two operations live here:
//! - [`RescaleConstants`]: one step of "drop the last limb and divide by it"
//!   (see [`RnsPoly::drop_last_limb_and_rescale`]).
//! - [`ScaleRoundConstants`]: `round(t * x / Q) mod t` from the residues of
//!   `x mod Q`, used by decryption. Two interchangeable constant families
//!   compute the same value.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};

use super::{
    errors::{RingError, RingResult},
    poly::{Representation, RnsPoly},
};
use crate::math::modular::{add_mod, center, mod_inverse, mul_mod, reduce_signed};

/// Gamma used by the gamma-correction family.
pub const GAMMA: u64 = 1 << 26;

fn to_u64(value: &BigUint) -> u64 {
    value.to_u64().unwrap_or(0)
}

fn product_of(moduli: &[u64]) -> BigUint {
    moduli
        .iter()
        .fold(BigUint::one(), |acc, &m| acc * BigUint::from(m))
}

/// `(Q / q_i)^-1 mod q_i` for every limb.
fn q_tilde(moduli: &[u64], product: &BigUint) -> Vec<u64> {
    moduli
        .iter()
        .map(|&q| {
            let q_hat = to_u64(&((product / q) % q));
            mod_inverse(q_hat, q)
        })
        .collect()
}

// ─── Drop-and-rescale ─────────────────────────────────────────────────────────

/// Constants for dividing by the last limb prime `q_l` of a limb set and
/// rounding to nearest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescaleConstants {
    dropped_modulus: u64,
    /// `floor(q_l / 2) mod q_i` for each remaining limb.
    pub(crate) rounding_correction: Vec<u64>,
    /// `q_l^-1 mod q_i` for each remaining limb.
    pub(crate) inverse: Vec<u64>,
}

impl RescaleConstants {
    /// Builds the constants for dropping the last entry of `moduli`.
    ///
    /// # Panics
    /// Panics if `moduli` has fewer than two entries or they are not pairwise
    /// coprime.
    pub fn new(moduli: &[u64]) -> Self {
        assert!(
            moduli.len() >= 2,
            "RescaleConstants::new: need at least two limbs"
        );
        let (&dropped_modulus, remaining) = moduli
            .split_last()
            .expect("RescaleConstants::new: non-empty moduli");
        let half = dropped_modulus >> 1;
        Self {
            dropped_modulus,
            rounding_correction: remaining.iter().map(|&q| half % q).collect(),
            inverse: remaining
                .iter()
                .map(|&q| mod_inverse(dropped_modulus % q, q))
                .collect(),
        }
    }

    pub fn dropped_modulus(&self) -> u64 {
        self.dropped_modulus
    }

    pub fn remaining_limbs(&self) -> usize {
        self.inverse.len()
    }
}

// ─── Scale-and-round ──────────────────────────────────────────────────────────

/// Decomposition family.
///
/// Writes `t * x / Q = sum_i x_i * t * q~_i / q_i (mod t)` and splits every
/// residue as `x_i = hi * 2^h + lo`, `h = ceil(bits(q_i) / 2)`. Each of the
/// two rational weights `t * q~_i / q_i` and `2^h * t * q~_i / q_i` is stored
/// as an integer part mod `t` and a 64-bit fixed-point fraction, so every
/// partial product stays below `2^96`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompositionTables {
    moduli: Vec<u64>,
    plaintext_modulus: u64,
    split_bits: Vec<u32>,
    lo_int: Vec<u64>,
    lo_frac: Vec<u64>,
    hi_int: Vec<u64>,
    hi_frac: Vec<u64>,
}

impl DecompositionTables {
    pub fn new(moduli: &[u64], plaintext_modulus: u64) -> Self {
        let product = product_of(moduli);
        let t = BigUint::from(plaintext_modulus);
        let mut tables = Self {
            moduli: moduli.to_vec(),
            plaintext_modulus,
            split_bits: Vec::with_capacity(moduli.len()),
            lo_int: Vec::with_capacity(moduli.len()),
            lo_frac: Vec::with_capacity(moduli.len()),
            hi_int: Vec::with_capacity(moduli.len()),
            hi_frac: Vec::with_capacity(moduli.len()),
        };

        for (&q, tilde) in moduli.iter().zip(q_tilde(moduli, &product)) {
            let bits = 64 - q.leading_zeros();
            let h = bits.div_ceil(2);
            let q_big = BigUint::from(q);
            let weight = &t * tilde;
            let split = |numerator: BigUint| -> (u64, u64) {
                let int = to_u64(&((&numerator / &q_big) % &t));
                let frac = to_u64(&(((&numerator % &q_big) << 64u32) / &q_big));
                (int, frac)
            };
            let (lo_int, lo_frac) = split(weight.clone());
            let (hi_int, hi_frac) = split(weight << h);
            tables.split_bits.push(h);
            tables.lo_int.push(lo_int);
            tables.lo_frac.push(lo_frac);
            tables.hi_int.push(hi_int);
            tables.hi_frac.push(hi_frac);
        }
        tables
    }

    fn scale_coefficient(&self, residues: impl Iterator<Item = u64>) -> u64 {
        let t = self.plaintext_modulus;
        let mut int_sum = 0u64;
        let mut frac_sum = 0u128;
        for (i, x) in residues.enumerate() {
            let h = self.split_bits[i];
            let hi = x >> h;
            let lo = x & ((1u64 << h) - 1);
            int_sum = add_mod(int_sum, mul_mod(hi % t, self.hi_int[i], t), t);
            int_sum = add_mod(int_sum, mul_mod(lo % t, self.lo_int[i], t), t);
            frac_sum += hi as u128 * self.hi_frac[i] as u128;
            frac_sum += lo as u128 * self.lo_frac[i] as u128;
        }
        let rounded = ((frac_sum + (1u128 << 63)) >> 64) % t as u128;
        add_mod(int_sum, rounded as u64, t)
    }
}

/// Gamma-correction family.
///
/// Computes `s = sum_i [x_i * gamma * t * q~_i]_{q_i} * (Q / q_i) * (-Q^-1)`
/// modulo `t * gamma`. Then `s mod t = gamma * round(t x / Q) + e` and
/// `s mod gamma = e` for a small `e`, which the centered `gamma` residue
/// recovers and removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaTables {
    moduli: Vec<u64>,
    plaintext_modulus: u64,
    t_gamma: u64,
    /// `gamma * t * q~_i mod q_i`.
    gamma_t_q_tilde: Vec<u64>,
    /// `(Q / q_i) * (-Q^-1) mod (t * gamma)`.
    neg_q_inv_q_hat: Vec<u64>,
    gamma_inv_mod_t: u64,
}

impl GammaTables {
    /// # Panics
    /// Panics if `t` is even or `t * GAMMA` does not fit below `2^63`;
    /// parameter validation rejects both.
    pub fn new(moduli: &[u64], plaintext_modulus: u64) -> Self {
        let t = plaintext_modulus;
        let t_gamma = t
            .checked_mul(GAMMA)
            .filter(|&v| v < 1 << 63)
            .expect("GammaTables::new: t * gamma must stay below 2^63");
        let product = product_of(moduli);
        let neg_q_inv = {
            let q_mod = to_u64(&(&product % t_gamma));
            t_gamma - mod_inverse(q_mod, t_gamma)
        };
        let gamma_t_q_tilde = moduli
            .iter()
            .zip(q_tilde(moduli, &product))
            .map(|(&q, tilde)| mul_mod(mul_mod(GAMMA % q, t % q, q), tilde, q))
            .collect();
        let neg_q_inv_q_hat = moduli
            .iter()
            .map(|&q| {
                let q_hat = to_u64(&((&product / q) % t_gamma));
                mul_mod(q_hat, neg_q_inv, t_gamma)
            })
            .collect();
        Self {
            moduli: moduli.to_vec(),
            plaintext_modulus: t,
            t_gamma,
            gamma_t_q_tilde,
            neg_q_inv_q_hat,
            gamma_inv_mod_t: mod_inverse(GAMMA % t, t),
        }
    }

    fn scale_coefficient(&self, residues: impl Iterator<Item = u64>) -> u64 {
        let t = self.plaintext_modulus;
        let tg = self.t_gamma;
        let mut s = 0u64;
        for (i, x) in residues.enumerate() {
            let y = mul_mod(x, self.gamma_t_q_tilde[i], self.moduli[i]);
            s = add_mod(s, mul_mod(y, self.neg_q_inv_q_hat[i], tg), tg);
        }
        let error = center(s % GAMMA, GAMMA);
        let shifted = reduce_signed((s % t) as i128 - error as i128, t);
        mul_mod(shifted, self.gamma_inv_mod_t, t)
    }
}

/// The constant family selected once when parameters are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleRoundConstants {
    Decomposition(DecompositionTables),
    GammaCorrection(GammaTables),
}

impl ScaleRoundConstants {
    pub fn moduli(&self) -> &[u64] {
        match self {
            Self::Decomposition(tables) => &tables.moduli,
            Self::GammaCorrection(tables) => &tables.moduli,
        }
    }

    pub fn plaintext_modulus(&self) -> u64 {
        match self {
            Self::Decomposition(tables) => tables.plaintext_modulus,
            Self::GammaCorrection(tables) => tables.plaintext_modulus,
        }
    }
}

impl<const DEGREE: usize> RnsPoly<DEGREE> {
    /// Computes `round(t * x / Q) mod t` for every coefficient, where `x` is
    /// the value in `[0, Q)` held by the limbs.
    ///
    /// Requires coefficient mode and constants built for this limb set.
    pub fn scale_and_round(&self, constants: &ScaleRoundConstants) -> RingResult<Vec<u64>> {
        if self.representation() != Representation::Coefficient {
            return Err(RingError::ModeMismatch {
                expected: Representation::Coefficient,
                actual: self.representation(),
            });
        }
        if self.basis().moduli() != constants.moduli() {
            return Err(RingError::ConstantsMismatch);
        }
        let limbs = self.limbs();
        let out = (0..DEGREE)
            .map(|j| {
                let column = limbs.iter().map(|limb| limb[j]);
                match constants {
                    ScaleRoundConstants::Decomposition(tables) => tables.scale_coefficient(column),
                    ScaleRoundConstants::GammaCorrection(tables) => {
                        tables.scale_coefficient(column)
                    }
                }
            })
            .collect();
        Ok(out)
    }
}
