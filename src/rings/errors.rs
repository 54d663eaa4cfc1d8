use thiserror::Error;

use super::poly::Representation;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RingError {
    #[error("ring degree must be a power of two and at least 2, got {degree}")]
    InvalidDegree { degree: usize },
    #[error("RNS basis must contain at least one modulus")]
    EmptyBasis,
    #[error("modulus {modulus} appears more than once in the RNS basis")]
    DuplicateModulus { modulus: u64 },
    #[error("modulus {modulus} is not NTT-friendly for degree {degree}")]
    NonNttFriendlyModulus { modulus: u64, degree: usize },
    #[error("cannot drop {drop_count} of {limb_count} limbs")]
    InvalidLimbDrop { drop_count: usize, limb_count: usize },
    #[error("limb count mismatch: expected {expected}, got {actual}")]
    LimbCountMismatch { expected: usize, actual: usize },
    #[error("coefficient {coefficient} is not reduced modulo {modulus}")]
    NonReducedCoefficient { coefficient: u64, modulus: u64 },
    #[error("representation mismatch: expected {expected:?}, got {actual:?}")]
    ModeMismatch {
        expected: Representation,
        actual: Representation,
    },
    #[error("operands live over different limb sets ({left} vs {right} limbs)")]
    LimbSetMismatch { left: usize, right: usize },
    #[error("precomputed constants were derived for a different limb set")]
    ConstantsMismatch,
}

pub type RingResult<T> = Result<T, RingError>;
