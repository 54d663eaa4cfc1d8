//! Word-sized modular arithmetic shared by the RNS engine and the parameter
//! tables. Every modulus handled here is below `2^63`, so sums of two reduced
//! values never overflow a `u64` and products are widened to `u128`.

use num_integer::{ExtendedGcd, Integer};

#[inline]
pub fn add_mod(a: u64, b: u64, q: u64) -> u64 {
    let s = a + b;
    if s >= q { s - q } else { s }
}

#[inline]
pub fn sub_mod(a: u64, b: u64, q: u64) -> u64 {
    if a >= b { a - b } else { a + q - b }
}

#[inline]
pub fn mul_mod(a: u64, b: u64, q: u64) -> u64 {
    ((a as u128 * b as u128) % q as u128) as u64
}

#[inline]
pub fn neg_mod(a: u64, q: u64) -> u64 {
    if a == 0 { 0 } else { q - a }
}

/// Computes `base^exponent mod modulus` via binary exponentiation.
pub fn mod_pow(mut base: u64, mut exponent: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let mut result = 1u64;
    base %= modulus;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = mul_mod(result, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exponent >>= 1;
    }
    result
}

/// Returns `value^-1 mod modulus`, or `None` when the two are not coprime.
pub fn try_mod_inverse(value: u64, modulus: u64) -> Option<u64> {
    let m = modulus as i128;
    let ExtendedGcd { gcd, x, .. } = ((value % modulus) as i128).extended_gcd(&m);
    if gcd != 1 {
        return None;
    }
    Some(x.mod_floor(&m) as u64)
}

/// Returns `value^-1 mod modulus`.
///
/// # Panics
/// Panics if `value` and `modulus` are not coprime. Parameter validation
/// guarantees coprimality for every inverse the engine precomputes.
pub fn mod_inverse(value: u64, modulus: u64) -> u64 {
    try_mod_inverse(value, modulus)
        .unwrap_or_else(|| panic!("mod_inverse: {value} is not invertible mod {modulus}"))
}

/// Lifts a residue in `[0, q)` to the centered range `(-q/2, q/2]`.
#[inline]
pub fn center(x: u64, q: u64) -> i64 {
    if x > q / 2 {
        -((q - x) as i64)
    } else {
        x as i64
    }
}

/// Reduces a signed integer into `[0, q)`.
#[inline]
pub fn reduce_signed(x: i128, q: u64) -> u64 {
    x.rem_euclid(q as i128) as u64
}

/// `round(x * numerator / denominator)` for a signed `x`, ties away from zero.
#[inline]
pub fn mul_div_round(x: i64, numerator: u64, denominator: u64) -> i128 {
    let product = x as i128 * numerator as i128;
    let d = denominator as i128;
    if product >= 0 {
        (2 * product + d) / (2 * d)
    } else {
        -((-2 * product + d) / (2 * d))
    }
}
