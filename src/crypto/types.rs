use crate::{
    crypto::{FheError, FheResult},
    keys::KeyTag,
    math::modular::center,
    rings::RnsPoly,
};

/// An encoded message: one ring element plus the number of meaningful slots.
///
/// `length` is metadata only; it never changes the limb count.
#[derive(Debug, Clone, PartialEq)]
pub struct Plaintext<const DEGREE: usize> {
    pub poly: RnsPoly<DEGREE>,
    pub length: usize,
}

impl<const DEGREE: usize> Plaintext<DEGREE> {
    pub fn new(poly: RnsPoly<DEGREE>, length: usize) -> Self {
        Self { poly, length }
    }

    pub fn limb_count(&self) -> usize {
        self.poly.limb_count()
    }
}

/// A decrypted polynomial with coefficients in `[0, t)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainPoly {
    coeffs: Vec<u64>,
    modulus: u64,
    length: usize,
}

impl PlainPoly {
    pub fn new(coeffs: Vec<u64>, modulus: u64, length: usize) -> Self {
        let length = length.min(coeffs.len());
        Self {
            coeffs,
            modulus,
            length,
        }
    }

    /// All `N` coefficients.
    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// The first `length` coefficients.
    pub fn values(&self) -> &[u64] {
        &self.coeffs[..self.length]
    }

    /// The first `length` coefficients lifted to `(-t/2, t/2]`.
    pub fn centered_values(&self) -> Vec<i64> {
        self.values()
            .iter()
            .map(|&c| center(c, self.modulus))
            .collect()
    }
}

/// Outcome of a successful decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptStatus {
    pub message_length: usize,
}

/// Two-element RLWE ciphertext `(c0, c1)`, decrypting as `c0 + c1 * s`.
///
/// Both elements always share limb set and representation.
#[derive(Debug, Clone, PartialEq)]
pub struct Ciphertext<const DEGREE: usize> {
    c0: RnsPoly<DEGREE>,
    c1: RnsPoly<DEGREE>,
    noise_scale_degree: usize,
    key_tag: KeyTag,
    length: usize,
}

impl<const DEGREE: usize> Ciphertext<DEGREE> {
    pub(crate) fn fresh(
        c0: RnsPoly<DEGREE>,
        c1: RnsPoly<DEGREE>,
        key_tag: KeyTag,
        length: usize,
    ) -> FheResult<Self> {
        c0.check_compatible(&c1)?;
        Ok(Self {
            c0,
            c1,
            noise_scale_degree: 1,
            key_tag,
            length,
        })
    }

    pub fn c0(&self) -> &RnsPoly<DEGREE> {
        &self.c0
    }

    pub fn c1(&self) -> &RnsPoly<DEGREE> {
        &self.c1
    }

    pub fn limb_count(&self) -> usize {
        self.c0.limb_count()
    }

    /// Limbs dropped relative to a chain of `chain_length` primes.
    pub fn level(&self, chain_length: usize) -> usize {
        chain_length.saturating_sub(self.limb_count())
    }

    pub fn noise_scale_degree(&self) -> usize {
        self.noise_scale_degree
    }

    pub fn set_noise_scale_degree(&mut self, degree: usize) {
        self.noise_scale_degree = degree;
    }

    pub fn key_tag(&self) -> KeyTag {
        self.key_tag
    }

    /// Logical length of the encrypted message.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns a ciphertext with `(c0, c1)` replaced and all metadata kept.
    ///
    /// The new elements must share limb set and representation.
    pub fn with_elements(&self, c0: RnsPoly<DEGREE>, c1: RnsPoly<DEGREE>) -> FheResult<Self> {
        c0.check_compatible(&c1).map_err(FheError::from)?;
        Ok(Self {
            c0,
            c1,
            noise_scale_degree: self.noise_scale_degree,
            key_tag: self.key_tag,
            length: self.length,
        })
    }

    pub fn into_elements(self) -> (RnsPoly<DEGREE>, RnsPoly<DEGREE>) {
        (self.c0, self.c1)
    }
}
