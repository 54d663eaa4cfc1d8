//! Scheme parameter sets.
//!
//! A parameter set is built once through its builder, validated, and then
//! shared read-only (usually behind an `Arc`) by key generation, encryption
//! and decryption. Every constant table is derived inside `build()`.

pub mod bfv;
pub mod ckks;

use std::{fmt, str::FromStr, sync::Arc};

use crate::{
    crypto::{FheError, FheResult},
    rings::{PolyDistribution, RnsBasis},
};

pub use bfv::{BfvParams, BfvParamsBuilder, EncryptionMode};
pub use ckks::{CkksParams, CkksParamsBuilder};

/// Hamming weight used when a sparse-ternary secret is requested by name.
pub const DEFAULT_HAMMING_WEIGHT: usize = 192;
/// Standard deviation of the error distribution unless configured otherwise.
pub const DEFAULT_ERROR_STD_DEV: f64 = 3.19;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKeyDistribution {
    Gaussian,
    UniformTernary,
    SparseTernary { hamming_weight: usize },
}

impl SecretKeyDistribution {
    pub fn sparse_ternary() -> Self {
        Self::SparseTernary {
            hamming_weight: DEFAULT_HAMMING_WEIGHT,
        }
    }

    /// Maps the tag to a ring-element distribution for degree `DEGREE`.
    pub fn poly_distribution<const DEGREE: usize>(
        self,
        error_std_dev: f64,
    ) -> FheResult<PolyDistribution> {
        match self {
            Self::Gaussian => Ok(PolyDistribution::Gaussian {
                std_dev: error_std_dev,
            }),
            Self::UniformTernary => Ok(PolyDistribution::UniformTernary),
            Self::SparseTernary { hamming_weight }
                if hamming_weight == 0 || hamming_weight > DEGREE =>
            {
                Err(FheError::UnsupportedDistribution(format!(
                    "sparse-ternary with hamming weight {hamming_weight} for degree {DEGREE}"
                )))
            }
            Self::SparseTernary { hamming_weight } => {
                Ok(PolyDistribution::SparseTernary { hamming_weight })
            }
        }
    }
}

impl FromStr for SecretKeyDistribution {
    type Err = FheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gaussian" => Ok(Self::Gaussian),
            "uniform-ternary" => Ok(Self::UniformTernary),
            "sparse-ternary" => Ok(Self::sparse_ternary()),
            other => Err(FheError::UnsupportedDistribution(other.to_string())),
        }
    }
}

impl fmt::Display for SecretKeyDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gaussian => write!(f, "gaussian"),
            Self::UniformTernary => write!(f, "uniform-ternary"),
            Self::SparseTernary { hamming_weight } => {
                write!(f, "sparse-ternary(h={hamming_weight})")
            }
        }
    }
}

/// How plaintexts are lifted to the ciphertext modulus during encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionTechnique {
    /// Scale by `Q/t` directly over the chain.
    #[default]
    Standard,
    /// Scale over `Q * r` with auxiliary primes `r`, then round back to `Q`.
    Extended,
}

impl FromStr for EncryptionTechnique {
    type Err = FheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "extended" => Ok(Self::Extended),
            other => Err(FheError::invalid(format!(
                "unknown encryption technique '{other}'"
            ))),
        }
    }
}

/// Multiplication technique; for the core it only selects the
/// scale-and-round constant family used by decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalingTechnique {
    #[default]
    Hps,
    HpsPOverQ,
    HpsPOverQLeveled,
    Behz,
}

impl ScalingTechnique {
    /// `true` for the HPS variants, which use the decomposition family.
    pub fn uses_decomposition(self) -> bool {
        !matches!(self, Self::Behz)
    }
}

impl FromStr for ScalingTechnique {
    type Err = FheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hps" => Ok(Self::Hps),
            "hps-p-over-q" => Ok(Self::HpsPOverQ),
            "hps-p-over-q-leveled" => Ok(Self::HpsPOverQLeveled),
            "behz" => Ok(Self::Behz),
            other => Err(FheError::invalid(format!(
                "unknown scaling technique '{other}'"
            ))),
        }
    }
}

/// What key generation and the encryption-of-zero helper need from a
/// parameter set, independent of the scheme.
pub trait RlweParams<const DEGREE: usize> {
    /// The modulus chain fresh ciphertexts are stored over.
    fn ciphertext_basis(&self) -> &Arc<RnsBasis<DEGREE>>;

    /// Limb set the secret key is kept at after generation. A prefix of
    /// [`Self::public_key_basis`].
    fn secret_key_basis(&self) -> &Arc<RnsBasis<DEGREE>>;

    /// Limb set keys are generated over.
    fn public_key_basis(&self) -> &Arc<RnsBasis<DEGREE>>;

    fn secret_key_distribution(&self) -> SecretKeyDistribution;

    fn error_std_dev(&self) -> f64;

    /// Factor applied to every fresh error term.
    fn noise_scale(&self) -> u64 {
        1
    }

    fn error_distribution(&self) -> PolyDistribution {
        PolyDistribution::Gaussian {
            std_dev: self.error_std_dev(),
        }
    }

    fn chain_length(&self) -> usize {
        self.ciphertext_basis().limb_count()
    }
}

/// Checks shared by both builders.
pub(crate) fn validate_common<const DEGREE: usize>(
    moduli: &[u64],
    distribution: SecretKeyDistribution,
    error_std_dev: f64,
) -> FheResult<()> {
    if !DEGREE.is_power_of_two() || DEGREE < 2 {
        return Err(FheError::invalid(format!(
            "ring degree must be a power of two and at least 2, got {DEGREE}"
        )));
    }
    if moduli.is_empty() {
        return Err(FheError::invalid("modulus chain must not be empty"));
    }
    if !(error_std_dev.is_finite() && error_std_dev > 0.0) {
        return Err(FheError::invalid(format!(
            "error standard deviation must be finite and positive, got {error_std_dev}"
        )));
    }
    distribution.poly_distribution::<DEGREE>(error_std_dev)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_distribution_names() {
        assert_eq!(
            "gaussian".parse::<SecretKeyDistribution>().unwrap(),
            SecretKeyDistribution::Gaussian
        );
        assert_eq!(
            "Uniform-Ternary".parse::<SecretKeyDistribution>().unwrap(),
            SecretKeyDistribution::UniformTernary
        );
        assert_eq!(
            "sparse-ternary".parse::<SecretKeyDistribution>().unwrap(),
            SecretKeyDistribution::SparseTernary { hamming_weight: 192 }
        );
        assert!(matches!(
            "binary".parse::<SecretKeyDistribution>(),
            Err(FheError::UnsupportedDistribution(name)) if name == "binary"
        ));
    }

    #[test]
    fn parses_techniques() {
        assert_eq!(
            "extended".parse::<EncryptionTechnique>().unwrap(),
            EncryptionTechnique::Extended
        );
        assert_eq!(
            "hps-p-over-q-leveled".parse::<ScalingTechnique>().unwrap(),
            ScalingTechnique::HpsPOverQLeveled
        );
        assert!(!"behz".parse::<ScalingTechnique>().unwrap().uses_decomposition());
        assert!(ScalingTechnique::HpsPOverQ.uses_decomposition());
        assert!("bgv".parse::<EncryptionTechnique>().is_err());
    }

    #[test]
    fn sparse_weight_must_fit_degree() {
        let too_heavy = SecretKeyDistribution::sparse_ternary();
        assert!(matches!(
            too_heavy.poly_distribution::<64>(3.19),
            Err(FheError::UnsupportedDistribution(_))
        ));
        assert_eq!(
            too_heavy.poly_distribution::<256>(3.19).unwrap(),
            PolyDistribution::SparseTernary { hamming_weight: 192 }
        );
    }
}
