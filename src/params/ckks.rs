use std::sync::Arc;

use tracing::debug;

use super::{DEFAULT_ERROR_STD_DEV, RlweParams, SecretKeyDistribution, validate_common};
use crate::{
    crypto::{FheError, FheResult},
    rings::RnsBasis,
};

const DEFAULT_SCALE_BITS: u32 = 40;

/// Parameters for the approximate scheme sharing the RNS substrate.
#[derive(Debug, Clone)]
pub struct CkksParams<const DEGREE: usize> {
    level_bases: Vec<Arc<RnsBasis<DEGREE>>>,
    public_key_basis: Arc<RnsBasis<DEGREE>>,
    secret_key_distribution: SecretKeyDistribution,
    error_std_dev: f64,
    scale_bits: u32,
}

impl<const DEGREE: usize> CkksParams<DEGREE> {
    pub fn builder() -> CkksParamsBuilder<DEGREE> {
        CkksParamsBuilder::new()
    }

    pub fn scale_bits(&self) -> u32 {
        self.scale_bits
    }

    /// Encoding scale `2^scale_bits`.
    pub fn delta(&self) -> f64 {
        (1u64 << self.scale_bits) as f64
    }

    pub fn basis_at_level(&self, level: usize) -> Option<&Arc<RnsBasis<DEGREE>>> {
        self.level_bases.get(level)
    }

    pub fn max_slots(&self) -> usize {
        DEGREE / 2
    }
}

impl<const DEGREE: usize> RlweParams<DEGREE> for CkksParams<DEGREE> {
    fn ciphertext_basis(&self) -> &Arc<RnsBasis<DEGREE>> {
        &self.level_bases[0]
    }

    fn secret_key_basis(&self) -> &Arc<RnsBasis<DEGREE>> {
        &self.level_bases[0]
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

pub struct CkksParamsBuilder<const DEGREE: usize> {
    moduli: Vec<u64>,
    scale_bits: Option<u32>,
    secret_key_distribution: SecretKeyDistribution,
    public_key_extension: Vec<u64>,
    error_std_dev: Option<f64>,
}

impl<const DEGREE: usize> Default for CkksParamsBuilder<DEGREE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEGREE: usize> CkksParamsBuilder<DEGREE> {
    pub fn new() -> Self {
        Self {
            moduli: Vec::new(),
            scale_bits: None,
            secret_key_distribution: SecretKeyDistribution::UniformTernary,
            public_key_extension: Vec::new(),
            error_std_dev: None,
        }
    }

    pub fn moduli(mut self, moduli: Vec<u64>) -> Self {
        self.moduli = moduli;
        self
    }

    pub fn scale_bits(mut self, scale_bits: u32) -> Self {
        self.scale_bits = Some(scale_bits);
        self
    }

    pub fn secret_key_distribution(mut self, distribution: SecretKeyDistribution) -> Self {
        self.secret_key_distribution = distribution;
        self
    }

    pub fn public_key_extension(mut self, moduli: Vec<u64>) -> Self {
        self.public_key_extension = moduli;
        self
    }

    pub fn error_std_dev(mut self, std_dev: f64) -> Self {
        self.error_std_dev = Some(std_dev);
        self
    }

    pub fn build(self) -> FheResult<CkksParams<DEGREE>> {
        let scale_bits = self.scale_bits.unwrap_or(DEFAULT_SCALE_BITS);
        let error_std_dev = self.error_std_dev.unwrap_or(DEFAULT_ERROR_STD_DEV);
        validate_common::<DEGREE>(&self.moduli, self.secret_key_distribution, error_std_dev)?;

        let chain = Arc::new(RnsBasis::new(self.moduli)?);
        // Leave headroom for the sign and for values a few times the scale.
        let q_bits = chain.modulus_product().bits();
        if scale_bits == 0 || scale_bits > 62 || u64::from(scale_bits) + 8 > q_bits {
            return Err(FheError::invalid(format!(
                "scale_bits {scale_bits} does not fit a {q_bits}-bit modulus chain"
            )));
        }

        let mut level_bases = vec![chain.clone()];
        for level in 1..chain.limb_count() {
            level_bases.push(Arc::new(chain.drop_last(level)?));
        }
        let public_key_basis = if self.public_key_extension.is_empty() {
            chain.clone()
        } else {
            Arc::new(chain.extend(&self.public_key_extension)?)
        };

        debug!(
            degree = DEGREE,
            chain_limbs = chain.limb_count(),
            scale_bits,
            "built CKKS parameters"
        );

        Ok(CkksParams {
            level_bases,
            public_key_basis,
            secret_key_distribution: self.secret_key_distribution,
            error_std_dev,
            scale_bits,
        })
    }
}
