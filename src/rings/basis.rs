use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

use super::errors::{RingError, RingResult};
use crate::math::{
    is_ntt_friendly_prime,
    modular::{mod_inverse, mod_pow, mul_mod},
};

/// Twiddle tables for the negacyclic NTT modulo one prime.
///
/// The forward transform evaluates `a(X)` at `psi^(2k+1)` for `k = 0..N`:
/// coefficients are twisted by `psi^i`, then a cyclic transform with
/// `omega = psi^2` runs over them.
#[derive(Debug, Clone)]
pub struct NttTable<const DEGREE: usize> {
    pub modulus: u64,
    pub n_inv: u64,
    pub(super) psi_powers: Vec<u64>,
    /// `n^-1 * psi^-i`, folding the inverse scaling into the untwist.
    pub(super) psi_inv_powers_scaled: Vec<u64>,
    pub(super) omega_powers: Vec<u64>,
    pub(super) omega_inv_powers: Vec<u64>,
}

impl<const DEGREE: usize> NttTable<DEGREE> {
    pub fn new(modulus: u64) -> RingResult<Self> {
        if !DEGREE.is_power_of_two() || DEGREE < 2 {
            return Err(RingError::InvalidDegree { degree: DEGREE });
        }
        if modulus >= 1 << 62 || !is_ntt_friendly_prime(modulus, DEGREE as u64) {
            return Err(RingError::NonNttFriendlyModulus {
                modulus,
                degree: DEGREE,
            });
        }

        let psi = find_primitive_root(modulus, 2 * DEGREE);
        let psi_inv = mod_inverse(psi, modulus);
        let omega = mul_mod(psi, psi, modulus);
        let omega_inv = mul_mod(psi_inv, psi_inv, modulus);
        let n_inv = mod_inverse(DEGREE as u64, modulus);

        let psi_powers = powers(psi, DEGREE, modulus);
        let psi_inv_powers_scaled = powers(psi_inv, DEGREE, modulus)
            .into_iter()
            .map(|p| mul_mod(p, n_inv, modulus))
            .collect();

        Ok(Self {
            modulus,
            n_inv,
            psi_powers,
            psi_inv_powers_scaled,
            omega_powers: powers(omega, DEGREE / 2, modulus),
            omega_inv_powers: powers(omega_inv, DEGREE / 2, modulus),
        })
    }
}

fn powers(base: u64, count: usize, modulus: u64) -> Vec<u64> {
    let mut out = Vec::with_capacity(count);
    let mut acc = 1u64;
    for _ in 0..count {
        out.push(acc);
        acc = mul_mod(acc, base, modulus);
    }
    out
}

/// Finds a primitive `order`-th root of unity, `order` a power of two.
///
/// # Panics
/// Cannot panic when `modulus` is an NTT-friendly prime for `order / 2`,
/// since such primes are guaranteed to have the required root.
fn find_primitive_root(modulus: u64, order: usize) -> u64 {
    let exponent = (modulus - 1) / order as u64;
    for candidate in 2..modulus {
        let root = mod_pow(candidate, exponent, modulus);
        // For a power-of-two order, primitivity reduces to root^(order/2) = -1.
        if mod_pow(root, (order / 2) as u64, modulus) == modulus - 1 {
            return root;
        }
    }
    panic!("find_primitive_root: no root found for modulus {modulus}, order {order}");
}

/// Chinese-remainder reconstruction data for one limb set.
#[derive(Debug, Clone)]
struct CrtData {
    product: BigUint,
    /// `(Q / q_i) * [(Q / q_i)^-1]_{q_i}` for each limb.
    factors: Vec<BigUint>,
}

impl CrtData {
    fn new(moduli: &[u64]) -> Self {
        let product = moduli
            .iter()
            .fold(BigUint::one(), |acc, &m| acc * BigUint::from(m));
        let factors = moduli
            .iter()
            .map(|&m| {
                let q_hat = &product / BigUint::from(m);
                let q_hat_mod = (&q_hat % BigUint::from(m))
                    .to_u64_digits()
                    .first()
                    .copied()
                    .unwrap_or(0);
                q_hat * BigUint::from(mod_inverse(q_hat_mod, m))
            })
            .collect();
        Self { product, factors }
    }
}

/// RNS basis: an ordered set of distinct NTT-friendly primes ("limbs") with
/// their NTT tables and CRT reconstruction data.
///
/// Invariant: `moduli.len() == ntt_tables.len()` and
/// `ntt_tables[i].modulus == moduli[i]` for all `i`.
#[derive(Debug, Clone)]
pub struct RnsBasis<const DEGREE: usize> {
    moduli: Vec<u64>,
    ntt_tables: Vec<NttTable<DEGREE>>,
    crt: CrtData,
}

impl<const DEGREE: usize> RnsBasis<DEGREE> {
    pub fn new(moduli: Vec<u64>) -> RingResult<Self> {
        if moduli.is_empty() {
            return Err(RingError::EmptyBasis);
        }
        for (i, &m) in moduli.iter().enumerate() {
            if moduli[..i].contains(&m) {
                return Err(RingError::DuplicateModulus { modulus: m });
            }
        }
        let ntt_tables = moduli
            .iter()
            .map(|&m| NttTable::new(m))
            .collect::<RingResult<Vec<_>>>()?;
        Ok(Self::from_parts(moduli, ntt_tables))
    }

    fn from_parts(moduli: Vec<u64>, ntt_tables: Vec<NttTable<DEGREE>>) -> Self {
        let crt = CrtData::new(&moduli);
        Self {
            moduli,
            ntt_tables,
            crt,
        }
    }

    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    pub fn ntt_table(&self, limb: usize) -> &NttTable<DEGREE> {
        &self.ntt_tables[limb]
    }

    pub fn limb_count(&self) -> usize {
        self.moduli.len()
    }

    /// Product of all limb moduli.
    pub fn modulus_product(&self) -> &BigUint {
        &self.crt.product
    }

    /// Returns a new basis with the last `drop_count` limbs removed.
    pub fn drop_last(&self, drop_count: usize) -> RingResult<Self> {
        let limb_count = self.limb_count();
        if drop_count >= limb_count {
            return Err(RingError::InvalidLimbDrop {
                drop_count,
                limb_count,
            });
        }
        let keep = limb_count - drop_count;
        Ok(Self::from_parts(
            self.moduli[..keep].to_vec(),
            self.ntt_tables[..keep].to_vec(),
        ))
    }

    /// Returns a new basis with `extra` moduli appended after the current ones.
    pub fn extend(&self, extra: &[u64]) -> RingResult<Self> {
        let mut moduli = self.moduli.clone();
        let mut ntt_tables = self.ntt_tables.clone();
        for &m in extra {
            if moduli.contains(&m) {
                return Err(RingError::DuplicateModulus { modulus: m });
            }
            ntt_tables.push(NttTable::new(m)?);
            moduli.push(m);
        }
        Ok(Self::from_parts(moduli, ntt_tables))
    }

    /// Same moduli in the same order.
    pub fn same_limbs(&self, other: &Self) -> bool {
        self.moduli == other.moduli
    }

    /// `true` when `self` consists of the leading limbs of `other`.
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.moduli.starts_with(&self.moduli)
    }

    /// CRT-reconstructs one coefficient into `[0, Q)`.
    pub fn reconstruct_coeff(&self, residues: &[u64]) -> BigUint {
        debug_assert_eq!(residues.len(), self.moduli.len());
        let sum = residues
            .iter()
            .zip(&self.crt.factors)
            .fold(BigUint::zero(), |acc, (&r, factor)| acc + factor * r);
        sum % &self.crt.product
    }

    /// CRT-reconstructs one coefficient and centers it in `(-Q/2, Q/2]`.
    pub fn reconstruct_centered_coeff(&self, residues: &[u64]) -> BigInt {
        let value = self.reconstruct_coeff(residues);
        let half: BigUint = &self.crt.product >> 1u32;
        if value > half {
            BigInt::from(value) - BigInt::from(self.crt.product.clone())
        } else {
            BigInt::from(value)
        }
    }
}
