use std::sync::Arc;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::ToPrimitive;
use tracing::debug;

use super::{
    DEFAULT_ERROR_STD_DEV, EncryptionTechnique, RlweParams, ScalingTechnique,
    SecretKeyDistribution, validate_common,
};
use crate::{
    crypto::{FheError, FheResult},
    math::modular::mod_inverse,
    rings::{
        DecompositionTables, GammaTables, RescaleConstants, RnsBasis, ScaleRoundConstants,
        scale::GAMMA,
    },
};

/// Per-technique data used to lift a plaintext during encryption.
#[derive(Debug, Clone)]
pub enum EncryptionMode<const DEGREE: usize> {
    Standard,
    Extended {
        /// Chain followed by the auxiliary primes.
        qr_basis: Arc<RnsBasis<DEGREE>>,
        t_inv_mod_qr: Vec<u64>,
        neg_qr_mod_t: u64,
        /// One entry per auxiliary prime, dropped last-first.
        aux_rescale: Vec<RescaleConstants>,
    },
}

/// Immutable BFV parameter set.
///
/// Built through [`BfvParamsBuilder`]; every correction table is derived
/// there and never recomputed per operation.
#[derive(Debug, Clone)]
pub struct BfvParams<const DEGREE: usize> {
    /// `level_bases[k]` holds the first `L - k` chain primes.
    level_bases: Vec<Arc<RnsBasis<DEGREE>>>,
    secret_key_basis: Arc<RnsBasis<DEGREE>>,
    public_key_basis: Arc<RnsBasis<DEGREE>>,
    plaintext_modulus: u64,
    secret_key_distribution: SecretKeyDistribution,
    encryption_technique: EncryptionTechnique,
    scaling_technique: ScalingTechnique,
    error_std_dev: f64,
    /// `t^-1 mod q_i` for every chain prime.
    t_inv_mod_q: Vec<u64>,
    /// `-Q_k mod t`, where `Q_k` is the product of `level_bases[k]`.
    neg_q_mod_t: Vec<u64>,
    /// Constants for dropping the last limb at level `k`; length `L - 1`.
    level_rescale: Vec<RescaleConstants>,
    scale_round: ScaleRoundConstants,
    mode: EncryptionMode<DEGREE>,
}

impl<const DEGREE: usize> BfvParams<DEGREE> {
    pub fn builder() -> BfvParamsBuilder<DEGREE> {
        BfvParamsBuilder::new()
    }

    pub fn plaintext_modulus(&self) -> u64 {
        self.plaintext_modulus
    }

    pub fn encryption_technique(&self) -> EncryptionTechnique {
        self.encryption_technique
    }

    pub fn scaling_technique(&self) -> ScalingTechnique {
        self.scaling_technique
    }

    /// Chain prefix with `L - level` limbs.
    pub fn basis_at_level(&self, level: usize) -> Option<&Arc<RnsBasis<DEGREE>>> {
        self.level_bases.get(level)
    }

    /// Level a limb set of `limb_count` chain primes sits at.
    pub fn level_of(&self, limb_count: usize) -> Option<usize> {
        self.chain_length().checked_sub(limb_count)
    }

    pub fn t_inv_mod_q(&self) -> &[u64] {
        &self.t_inv_mod_q
    }

    pub fn neg_q_mod_t(&self, level: usize) -> Option<u64> {
        self.neg_q_mod_t.get(level).copied()
    }

    pub fn rescale_constants(&self, level: usize) -> Option<&RescaleConstants> {
        self.level_rescale.get(level)
    }

    pub fn scale_round(&self) -> &ScaleRoundConstants {
        &self.scale_round
    }

    pub fn mode(&self) -> &EncryptionMode<DEGREE> {
        &self.mode
    }

    /// Maximum number of meaningful plaintext slots.
    pub fn max_slots(&self) -> usize {
        DEGREE / 2
    }
}

impl<const DEGREE: usize> RlweParams<DEGREE> for BfvParams<DEGREE> {
    fn ciphertext_basis(&self) -> &Arc<RnsBasis<DEGREE>> {
        &self.level_bases[0]
    }

    fn secret_key_basis(&self) -> &Arc<RnsBasis<DEGREE>> {
        &self.secret_key_basis
    }

    fn public_key_basis(&self) -> &Arc<RnsBasis<DEGREE>> {
        &self.public_key_basis
    }

    fn secret_key_distribution(&self) -> SecretKeyDistribution {
        self.secret_key_distribution
    }

    fn error_std_dev(&self) -> f64 {
        self.error_std_dev
    }
}

/// Consuming builder for [`BfvParams`].
///
/// ```
/// use toy_rns_fhe::{BfvParams, math::generate_primes};
///
/// let params = BfvParams::<64>::builder()
///     .moduli(generate_primes(50, 3, 64))
///     .plaintext_modulus(65537)
///     .build()
///     .unwrap();
/// assert_eq!(params.plaintext_modulus(), 65537);
/// ```
#[derive(Debug, Clone)]
pub struct BfvParamsBuilder<const DEGREE: usize> {
    moduli: Vec<u64>,
    plaintext_modulus: Option<u64>,
    secret_key_distribution: SecretKeyDistribution,
    encryption_technique: EncryptionTechnique,
    scaling_technique: ScalingTechnique,
    auxiliary_moduli: Vec<u64>,
    public_key_extension: Vec<u64>,
    error_std_dev: Option<f64>,
}

impl<const DEGREE: usize> Default for BfvParamsBuilder<DEGREE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEGREE: usize> BfvParamsBuilder<DEGREE> {
    pub fn new() -> Self {
        Self {
            moduli: Vec::new(),
            plaintext_modulus: None,
            secret_key_distribution: SecretKeyDistribution::UniformTernary,
            encryption_technique: EncryptionTechnique::default(),
            scaling_technique: ScalingTechnique::default(),
            auxiliary_moduli: Vec::new(),
            public_key_extension: Vec::new(),
            error_std_dev: None,
        }
    }

    pub fn moduli(mut self, moduli: Vec<u64>) -> Self {
        self.moduli = moduli;
        self
    }

    pub fn plaintext_modulus(mut self, t: u64) -> Self {
        self.plaintext_modulus = Some(t);
        self
    }

    pub fn secret_key_distribution(mut self, distribution: SecretKeyDistribution) -> Self {
        self.secret_key_distribution = distribution;
        self
    }

    pub fn encryption_technique(mut self, technique: EncryptionTechnique) -> Self {
        self.encryption_technique = technique;
        self
    }

    pub fn scaling_technique(mut self, technique: ScalingTechnique) -> Self {
        self.scaling_technique = technique;
        self
    }

    /// Auxiliary primes `r` used by [`EncryptionTechnique::Extended`].
    pub fn auxiliary_moduli(mut self, moduli: Vec<u64>) -> Self {
        self.auxiliary_moduli = moduli;
        self
    }

    /// Extra primes appended to the public-key limb set only.
    pub fn public_key_extension(mut self, moduli: Vec<u64>) -> Self {
        self.public_key_extension = moduli;
        self
    }

    pub fn error_std_dev(mut self, std_dev: f64) -> Self {
        self.error_std_dev = Some(std_dev);
        self
    }

    fn validate(&self, t: u64, error_std_dev: f64) -> FheResult<()> {
        validate_common::<DEGREE>(&self.moduli, self.secret_key_distribution, error_std_dev)?;
        if !(2..1 << 62).contains(&t) {
            return Err(FheError::invalid(format!(
                "plaintext modulus must be in [2, 2^62), got {t}"
            )));
        }
        if let Some(&q) = self
            .moduli
            .iter()
            .chain(&self.auxiliary_moduli)
            .find(|&&q| t >= q)
        {
            return Err(FheError::invalid(format!(
                "plaintext modulus {t} must be below every chain and auxiliary modulus, found {q}"
            )));
        }
        let mut all_moduli = self
            .moduli
            .iter()
            .chain(&self.auxiliary_moduli)
            .chain(&self.public_key_extension);
        if let Some(&q) = all_moduli.find(|&&q| q.gcd(&t) != 1) {
            return Err(FheError::invalid(format!(
                "plaintext modulus {t} shares a factor with modulus {q}"
            )));
        }
        if self.scaling_technique == ScalingTechnique::Behz {
            if t.gcd(&GAMMA) != 1 {
                return Err(FheError::invalid(format!(
                    "plaintext modulus {t} must be odd for the BEHZ technique"
                )));
            }
            if t.checked_mul(GAMMA).is_none_or(|v| v >= 1 << 63) {
                return Err(FheError::invalid(format!(
                    "plaintext modulus {t} too large for the BEHZ technique"
                )));
            }
        }
        if self.encryption_technique == EncryptionTechnique::Extended
            && self.auxiliary_moduli.is_empty()
        {
            return Err(FheError::invalid(
                "extended encryption requires at least one auxiliary modulus",
            ));
        }
        Ok(())
    }

    pub fn build(self) -> FheResult<BfvParams<DEGREE>> {
        let t = self
            .plaintext_modulus
            .ok_or_else(|| FheError::invalid("plaintext modulus is required"))?;
        let error_std_dev = self.error_std_dev.unwrap_or(DEFAULT_ERROR_STD_DEV);
        self.validate(t, error_std_dev)?;

        let chain = Arc::new(RnsBasis::new(self.moduli.clone())?);
        let chain_len = chain.limb_count();

        let mut level_bases = Vec::with_capacity(chain_len);
        level_bases.push(chain.clone());
        for level in 1..chain_len {
            level_bases.push(Arc::new(chain.drop_last(level)?));
        }

        let t_inv_mod_q = self.moduli.iter().map(|&q| mod_inverse(t % q, q)).collect();
        let neg_q_mod_t = level_bases
            .iter()
            .map(|basis| neg_mod_t(basis.modulus_product(), t))
            .collect();
        let level_rescale = (0..chain_len.saturating_sub(1))
            .map(|level| RescaleConstants::new(&self.moduli[..chain_len - level]))
            .collect();

        let scale_round = if self.scaling_technique.uses_decomposition() {
            ScaleRoundConstants::Decomposition(DecompositionTables::new(&self.moduli, t))
        } else {
            ScaleRoundConstants::GammaCorrection(GammaTables::new(&self.moduli, t))
        };

        let (secret_key_basis, mode) = match self.encryption_technique {
            EncryptionTechnique::Standard => (chain.clone(), EncryptionMode::Standard),
            EncryptionTechnique::Extended => {
                let qr_basis = Arc::new(chain.extend(&self.auxiliary_moduli)?);
                let qr_moduli = qr_basis.moduli();
                let aux_rescale = (0..self.auxiliary_moduli.len())
                    .map(|dropped| RescaleConstants::new(&qr_moduli[..qr_moduli.len() - dropped]))
                    .collect();
                let mode = EncryptionMode::Extended {
                    t_inv_mod_qr: qr_moduli.iter().map(|&q| mod_inverse(t % q, q)).collect(),
                    neg_qr_mod_t: neg_mod_t(qr_basis.modulus_product(), t),
                    aux_rescale,
                    qr_basis: qr_basis.clone(),
                };
                (qr_basis, mode)
            }
        };

        let public_key_basis = if self.public_key_extension.is_empty() {
            secret_key_basis.clone()
        } else {
            Arc::new(secret_key_basis.extend(&self.public_key_extension)?)
        };

        debug!(
            degree = DEGREE,
            chain_limbs = chain_len,
            public_key_limbs = public_key_basis.limb_count(),
            plaintext_modulus = t,
            technique = ?self.encryption_technique,
            scaling = ?self.scaling_technique,
            "built BFV parameters"
        );

        Ok(BfvParams {
            level_bases,
            secret_key_basis,
            public_key_basis,
            plaintext_modulus: t,
            secret_key_distribution: self.secret_key_distribution,
            encryption_technique: self.encryption_technique,
            scaling_technique: self.scaling_technique,
            error_std_dev,
            t_inv_mod_q,
            neg_q_mod_t,
            level_rescale,
            scale_round,
            mode,
        })
    }
}

fn neg_mod_t(product: &BigUint, t: u64) -> u64 {
    let q_mod_t = (product % t).to_u64().unwrap_or(0);
    (t - q_mod_t) % t
}
