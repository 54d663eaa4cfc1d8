//! Prime utilities for assembling NTT-friendly modulus chains.
//!
//! Primality is decided with Miller-Rabin over a fixed base set that is
//! deterministic for every `u64`.
//! Reference: https://en.wikipedia.org/wiki/Miller%E2%80%93Rabin_primality_test

use super::modular::{mod_pow, mul_mod};

// Deterministic for all n < 318,665,857,834,031,151,167,461.
// Source: https://miller-rabin.appspot.com/
const MILLER_RABIN_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Returns `(odd_part, power_of_two)` such that `n = odd_part * 2^power_of_two`.
fn decompose(n: u64) -> (u64, u32) {
    assert!(n > 0, "decompose: n must be positive");
    let r = n.trailing_zeros();
    (n >> r, r)
}

/// Returns `true` if `n` is prime using deterministic Miller-Rabin on `u64`.
pub fn is_prime(n: u64) -> bool {
    match n {
        0 | 1 => return false,
        2 | 3 => return true,
        _ if n & 1 == 0 => return false,
        _ => {}
    }

    let (d, r) = decompose(n - 1);
    'bases: for &a in MILLER_RABIN_BASES.iter() {
        if a >= n {
            continue;
        }
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..r {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'bases;
            }
        }
        return false;
    }
    true
}

/// Returns `true` when `p` is prime and `p = 1 (mod 2n)`, i.e. `Z_p` holds a
/// primitive `2n`-th root of unity for the negacyclic NTT over `x^n + 1`.
#[inline]
pub fn is_ntt_friendly_prime(p: u64, n: u64) -> bool {
    match n.checked_mul(2) {
        Some(order) if n > 0 => is_prime(p) && p % order == 1,
        _ => false,
    }
}

/// Returns the largest NTT-friendly prime `p` such that `p < bound`.
///
/// The search only visits candidates `p = 1 (mod 2n)`.
pub fn get_first_prime_down(bound: u64, n: u64) -> Option<u64> {
    assert!(n > 0, "get_first_prime_down: n must be positive");
    if bound <= 2 {
        return None;
    }
    let step = n
        .checked_mul(2)
        .expect("get_first_prime_down: 2 * n must fit in u64");

    let start = bound - 1;
    let mut candidate = start.checked_sub((start + step - 1) % step)?;
    loop {
        if candidate <= 2 {
            return None;
        }
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate = candidate.checked_sub(step)?;
    }
}

/// Generates `count` distinct NTT-friendly primes of exactly `bit_size` bits,
/// walking downward from `2^bit_size`.
///
/// ```
/// use toy_rns_fhe::math::{generate_primes, is_ntt_friendly_prime};
///
/// let primes = generate_primes(40, 3, 1024);
/// assert_eq!(primes.len(), 3);
/// for p in primes {
///     assert!(is_ntt_friendly_prime(p, 1024));
/// }
/// ```
///
/// # Panics
/// Panics if `bit_size` is outside `4..=62` or not enough primes exist.
pub fn generate_primes(bit_size: u32, count: usize, degree: u64) -> Vec<u64> {
    assert!(
        (4..=62).contains(&bit_size),
        "generate_primes: bit_size must be in 4..=62"
    );
    let lower_bound = 1u64 << (bit_size - 1);
    let mut primes = Vec::with_capacity(count);
    let mut cursor = 1u64 << bit_size;

    while primes.len() < count {
        match get_first_prime_down(cursor, degree) {
            Some(prime) if prime >= lower_bound => {
                primes.push(prime);
                cursor = prime;
            }
            _ => break,
        }
    }

    assert!(
        primes.len() == count,
        "generate_primes: unable to find {count} NTT primes of {bit_size} bits for degree {degree}"
    );
    primes
}
