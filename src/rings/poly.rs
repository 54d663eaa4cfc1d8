use super::{
    basis::RnsBasis,
    errors::{RingError, RingResult},
    ntt,
    scale::RescaleConstants,
};
use crate::math::{
    modular::{add_mod, mul_mod, neg_mod, reduce_signed, sub_mod},
    sampling::{
        gaussian_coefficients, ternary_coefficients, uniform_coefficients,
        uniform_ternary_coefficients,
    },
};
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;
use rand::Rng;
use std::{ops::Neg, sync::Arc};

/// Which domain the limb arrays currently hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Raw polynomial coefficients.
    Coefficient,
    /// Evaluations at the odd powers of a primitive `2N`-th root; pointwise
    /// multiplication is polynomial multiplication.
    Evaluation,
}

/// Distributions a ring element can be sampled from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolyDistribution {
    /// Uniform modulo the full limb product; limbs are drawn independently.
    Uniform,
    /// Rounded Gaussian with the given standard deviation.
    Gaussian { std_dev: f64 },
    /// Every coefficient uniform in `{-1, 0, 1}`.
    UniformTernary,
    /// Ternary with exactly `hamming_weight` non-zero coefficients.
    SparseTernary { hamming_weight: usize },
}

/// A polynomial in `Z_{q_0} x … x Z_{q_{L-1}}[X] / (X^N + 1)`.
///
/// Stores one `[u64; DEGREE]` array per limb.
///
/// # Invariants
/// - `limbs.len() == basis.limb_count()`
/// - Every `limbs[i][j] < basis.moduli()[i]`
/// - All limbs share one `representation`
#[derive(Clone, Debug)]
pub struct RnsPoly<const DEGREE: usize> {
    limbs: Vec<[u64; DEGREE]>,
    basis: Arc<RnsBasis<DEGREE>>,
    representation: Representation,
}

// ─── Constructors ─────────────────────────────────────────────────────────────

impl<const DEGREE: usize> RnsPoly<DEGREE> {
    pub fn zero(basis: Arc<RnsBasis<DEGREE>>, representation: Representation) -> Self {
        let limbs = vec![[0u64; DEGREE]; basis.limb_count()];
        Self {
            limbs,
            basis,
            representation,
        }
    }

    /// Creates a coefficient-form polynomial from signed integer coefficients.
    ///
    /// Each coefficient is reduced into `[0, q_i)` per limb, so every limb
    /// encodes the same integer polynomial. Missing trailing coefficients are
    /// zero; coefficients beyond `DEGREE` are ignored.
    pub fn from_coeffs(coeffs: &[i64], basis: Arc<RnsBasis<DEGREE>>) -> Self {
        let mut limbs = vec![[0u64; DEGREE]; basis.limb_count()];
        for (limb, &q) in limbs.iter_mut().zip(basis.moduli()) {
            for (slot, &coeff) in limb.iter_mut().zip(coeffs) {
                *slot = reduce_signed(coeff as i128, q);
            }
        }
        Self::new_unchecked(limbs, basis, Representation::Coefficient)
    }

    /// Embeds big non-negative integer coefficients into `basis`.
    pub fn from_biguint_coeffs(coeffs: &[BigUint], basis: Arc<RnsBasis<DEGREE>>) -> Self {
        let mut limbs = vec![[0u64; DEGREE]; basis.limb_count()];
        for (limb, &q) in limbs.iter_mut().zip(basis.moduli()) {
            for (slot, coeff) in limb.iter_mut().zip(coeffs) {
                *slot = (coeff % q).to_u64().unwrap_or(0);
            }
        }
        Self::new_unchecked(limbs, basis, Representation::Coefficient)
    }

    /// Creates a polynomial from pre-built limb arrays.
    ///
    /// Returns an error if the limb count doesn't match the basis, or if any
    /// residue is not reduced modulo its limb prime.
    pub fn from_limbs(
        limbs: Vec<[u64; DEGREE]>,
        basis: Arc<RnsBasis<DEGREE>>,
        representation: Representation,
    ) -> RingResult<Self> {
        let expected = basis.limb_count();
        let actual = limbs.len();
        if actual != expected {
            return Err(RingError::LimbCountMismatch { expected, actual });
        }
        for (limb, &q) in limbs.iter().zip(basis.moduli()) {
            if let Some(&c) = limb.iter().find(|&&c| c >= q) {
                return Err(RingError::NonReducedCoefficient {
                    coefficient: c,
                    modulus: q,
                });
            }
        }
        Ok(Self::new_unchecked(limbs, basis, representation))
    }

    // Skips the O(N·L) reducedness check; only for limbs built by this crate.
    pub(crate) fn new_unchecked(
        limbs: Vec<[u64; DEGREE]>,
        basis: Arc<RnsBasis<DEGREE>>,
        representation: Representation,
    ) -> Self {
        Self {
            limbs,
            basis,
            representation,
        }
    }

    /// Samples a fresh element from `distribution` over `basis`.
    ///
    /// Small-coefficient distributions draw one integer polynomial and reduce
    /// it into every limb; `Uniform` draws each limb independently.
    ///
    /// # Panics
    /// Panics if a sparse-ternary hamming weight exceeds `DEGREE` or a
    /// Gaussian standard deviation is not finite and positive.
    pub fn sample<R: Rng + ?Sized>(
        distribution: PolyDistribution,
        basis: Arc<RnsBasis<DEGREE>>,
        representation: Representation,
        rng: &mut R,
    ) -> Self {
        let mut poly = match distribution {
            PolyDistribution::Uniform => {
                let limbs = basis
                    .moduli()
                    .iter()
                    .map(|&q| uniform_coefficients::<DEGREE, R>(q, &mut *rng))
                    .collect();
                // Uniform residues are uniform in either domain.
                return Self::new_unchecked(limbs, basis, representation);
            }
            PolyDistribution::Gaussian { std_dev } => {
                Self::from_coeffs(&gaussian_coefficients::<DEGREE, _>(std_dev, rng), basis)
            }
            PolyDistribution::UniformTernary => {
                Self::from_coeffs(&uniform_ternary_coefficients::<DEGREE, _>(rng), basis)
            }
            PolyDistribution::SparseTernary { hamming_weight } => Self::from_coeffs(
                &ternary_coefficients::<DEGREE, _>(hamming_weight, rng),
                basis,
            ),
        };
        poly.convert(representation);
        poly
    }
}

// ─── Accessors & format conversion ────────────────────────────────────────────

impl<const DEGREE: usize> RnsPoly<DEGREE> {
    pub fn limbs(&self) -> &[[u64; DEGREE]] {
        &self.limbs
    }

    pub fn basis(&self) -> &Arc<RnsBasis<DEGREE>> {
        &self.basis
    }

    pub fn limb_count(&self) -> usize {
        self.limbs.len()
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    /// Converts in place to `target`; a no-op when already there.
    pub fn convert(&mut self, target: Representation) {
        if self.representation == target {
            return;
        }
        for (limb_index, limb) in self.limbs.iter_mut().enumerate() {
            let table = self.basis.ntt_table(limb_index);
            match target {
                Representation::Evaluation => ntt::forward(limb, table),
                Representation::Coefficient => ntt::inverse(limb, table),
            }
        }
        self.representation = target;
    }

    pub fn to_evaluation(&mut self) {
        self.convert(Representation::Evaluation);
    }

    pub fn to_coefficient(&mut self) {
        self.convert(Representation::Coefficient);
    }

    /// Checks that `rhs` lives over the same limb set and in the same mode.
    pub fn check_compatible(&self, rhs: &Self) -> RingResult<()> {
        if !Arc::ptr_eq(&self.basis, &rhs.basis) && !self.basis.same_limbs(&rhs.basis) {
            return Err(RingError::LimbSetMismatch {
                left: self.limb_count(),
                right: rhs.limb_count(),
            });
        }
        if self.representation != rhs.representation {
            return Err(RingError::ModeMismatch {
                expected: self.representation,
                actual: rhs.representation,
            });
        }
        Ok(())
    }
}

// ─── Arithmetic ───────────────────────────────────────────────────────────────

impl<const DEGREE: usize> RnsPoly<DEGREE> {
    fn zip_limbs_with(&mut self, rhs: &Self, op: fn(u64, u64, u64) -> u64) {
        for ((limb, rhs_limb), &q) in self
            .limbs
            .iter_mut()
            .zip(&rhs.limbs)
            .zip(self.basis.moduli())
        {
            for (a, &b) in limb.iter_mut().zip(rhs_limb.iter()) {
                *a = op(*a, b, q);
            }
        }
    }

    /// Limb-wise addition. Valid in either mode, but both operands must match.
    pub fn try_add_assign(&mut self, rhs: &Self) -> RingResult<()> {
        self.check_compatible(rhs)?;
        self.zip_limbs_with(rhs, add_mod);
        Ok(())
    }

    /// Limb-wise subtraction. Valid in either mode, but both operands must match.
    pub fn try_sub_assign(&mut self, rhs: &Self) -> RingResult<()> {
        self.check_compatible(rhs)?;
        self.zip_limbs_with(rhs, sub_mod);
        Ok(())
    }

    /// Ring multiplication as pointwise products; both operands must be in
    /// evaluation mode.
    pub fn try_mul_assign(&mut self, rhs: &Self) -> RingResult<()> {
        for operand in [self.representation, rhs.representation] {
            if operand != Representation::Evaluation {
                return Err(RingError::ModeMismatch {
                    expected: Representation::Evaluation,
                    actual: operand,
                });
            }
        }
        self.check_compatible(rhs)?;
        self.zip_limbs_with(rhs, mul_mod);
        Ok(())
    }

    /// Multiplies every coefficient by an integer scalar. Valid in either mode.
    pub fn scalar_mul_assign(&mut self, scalar: u64) {
        for (limb, &q) in self.limbs.iter_mut().zip(self.basis.moduli()) {
            let s = scalar % q;
            for c in limb.iter_mut() {
                *c = mul_mod(*c, s, q);
            }
        }
    }
}

impl<const DEGREE: usize> Neg for RnsPoly<DEGREE> {
    type Output = Self;

    /// Limb-wise negation. Works in both modes.
    fn neg(mut self) -> Self {
        for (limb, &q) in self.limbs.iter_mut().zip(self.basis.moduli()) {
            for c in limb.iter_mut() {
                *c = neg_mod(*c, q);
            }
        }
        self
    }
}

impl<const DEGREE: usize> PartialEq for RnsPoly<DEGREE> {
    fn eq(&self, other: &Self) -> bool {
        self.representation == other.representation
            && self.basis.same_limbs(&other.basis)
            && self.limbs == other.limbs
    }
}

// ─── Level management ─────────────────────────────────────────────────────────

impl<const DEGREE: usize> RnsPoly<DEGREE> {
    /// Removes the trailing `count` limbs. The result represents the same
    /// logical value modulo the reduced modulus.
    pub fn drop_last_limbs(&mut self, count: usize) -> RingResult<()> {
        if count == 0 {
            return Ok(());
        }
        let reduced = Arc::new(self.basis.drop_last(count)?);
        self.limbs.truncate(reduced.limb_count());
        self.basis = reduced;
        Ok(())
    }

    /// Keeps only the leading limbs forming `target`, which must be a prefix
    /// of this element's limb set. Works in either mode.
    pub fn truncate_to(&mut self, target: &Arc<RnsBasis<DEGREE>>) -> RingResult<()> {
        if !target.is_prefix_of(&self.basis) {
            return Err(RingError::LimbSetMismatch {
                left: self.limb_count(),
                right: target.limb_count(),
            });
        }
        self.limbs.truncate(target.limb_count());
        self.basis = target.clone();
        Ok(())
    }

    /// Drops the last limb `q_l` and divides the logical value by it,
    /// rounding to the nearest integer: `x -> round(x / q_l)`.
    ///
    /// The representation is preserved.
    pub fn drop_last_limb_and_rescale(&mut self, constants: &RescaleConstants) -> RingResult<()> {
        let limb_count = self.limb_count();
        if limb_count < 2 {
            return Err(RingError::InvalidLimbDrop {
                drop_count: 1,
                limb_count,
            });
        }
        let q_last = self.basis.moduli()[limb_count - 1];
        if constants.dropped_modulus() != q_last || constants.remaining_limbs() != limb_count - 1 {
            return Err(RingError::ConstantsMismatch);
        }

        let original = self.representation;
        self.to_coefficient();
        let reduced = Arc::new(self.basis.drop_last(1)?);

        let half = q_last >> 1;
        let mut last = self.limbs.pop().unwrap_or([0u64; DEGREE]);
        // y = (x_l + floor(q_l / 2)) mod q_l
        for c in last.iter_mut() {
            *c = add_mod(*c, half, q_last);
        }
        for (i, (limb, &q)) in self.limbs.iter_mut().zip(reduced.moduli()).enumerate() {
            let correction = constants.rounding_correction[i];
            let inverse = constants.inverse[i];
            for (x, &y) in limb.iter_mut().zip(last.iter()) {
                let shifted = sub_mod(add_mod(*x, correction, q), y % q, q);
                *x = mul_mod(shifted, inverse, q);
            }
        }

        self.basis = reduced;
        self.convert(original);
        Ok(())
    }
}

// ─── Reconstruction & plaintext scaling ───────────────────────────────────────

impl<const DEGREE: usize> RnsPoly<DEGREE> {
    fn coefficient_limbs(&self) -> std::borrow::Cow<'_, [[u64; DEGREE]]> {
        match self.representation {
            Representation::Coefficient => std::borrow::Cow::Borrowed(&self.limbs),
            Representation::Evaluation => {
                let mut clone = self.clone();
                clone.to_coefficient();
                std::borrow::Cow::Owned(clone.limbs)
            }
        }
    }

    /// Reconstructs the big-modulus coefficients in `[0, Q)` from all limbs.
    /// Pure: an evaluation-mode element is converted on a temporary copy.
    pub fn crt_interpolate(&self) -> Vec<BigUint> {
        let limbs = self.coefficient_limbs();
        let mut residues = vec![0u64; limbs.len()];
        (0..DEGREE)
            .map(|j| {
                for (r, limb) in residues.iter_mut().zip(limbs.iter()) {
                    *r = limb[j];
                }
                self.basis.reconstruct_coeff(&residues)
            })
            .collect()
    }

    /// Like [`Self::crt_interpolate`], centered into `(-Q/2, Q/2]`.
    pub fn to_centered_coeffs(&self) -> Vec<BigInt> {
        let limbs = self.coefficient_limbs();
        let mut residues = vec![0u64; limbs.len()];
        (0..DEGREE)
            .map(|j| {
                for (r, limb) in residues.iter_mut().zip(limbs.iter()) {
                    *r = limb[j];
                }
                self.basis.reconstruct_centered_coeff(&residues)
            })
            .collect()
    }

    /// Replaces a plaintext `m` with `ceil(Q * m / t)` in every limb, where
    /// `Q` is the product of this element's limbs.
    ///
    /// `m` is read from the first limb and reduced mod `t`: plaintext
    /// coefficients lie in `[0, t)` and `t < q_0`, so limb 0 holds them
    /// exactly.
    ///
    /// `t_inv_mod_q[i] = t^-1 mod q_i` and `neg_q_mod_t = -Q mod t`. Requires
    /// coefficient mode.
    pub fn times_q_over_t(
        &mut self,
        t: u64,
        t_inv_mod_q: &[u64],
        neg_q_mod_t: u64,
    ) -> RingResult<()> {
        if self.representation != Representation::Coefficient {
            return Err(RingError::ModeMismatch {
                expected: Representation::Coefficient,
                actual: self.representation,
            });
        }
        if t_inv_mod_q.len() < self.limb_count() {
            return Err(RingError::ConstantsMismatch);
        }
        for j in 0..DEGREE {
            let m = self.limbs[0][j] % t;
            // r = -Q * m mod t, so (Q * m + r) / t is an integer.
            let r = mul_mod(m, neg_q_mod_t, t);
            for ((limb, &q), &t_inv) in self
                .limbs
                .iter_mut()
                .zip(self.basis.moduli())
                .zip(t_inv_mod_q)
            {
                limb[j] = mul_mod(r % q, t_inv, q);
            }
        }
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
