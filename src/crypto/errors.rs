use thiserror::Error;

use crate::{encoding::EncodingError, rings::RingError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FheError {
    #[error("Ring operation failed: {source}")]
    Ring {
        #[from]
        source: RingError,
    },

    #[error("Encoding failed: {source}")]
    Encoding {
        #[from]
        source: EncodingError,
    },

    #[error(
        "Plaintext encoded over {plaintext_limbs} limbs is incompatible with a \
        {chain_limbs}-limb modulus chain"
    )]
    IncompatibleEncodingLevel {
        plaintext_limbs: usize,
        chain_limbs: usize,
    },

    #[error("Unsupported secret key distribution: {0}")]
    UnsupportedDistribution(String),

    #[error("Requested plaintext length {requested} exceeds capacity {max}")]
    DecryptionLengthMismatch { requested: usize, max: usize },

    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Key tag mismatch: ciphertext was not produced under this key pair")]
    KeyTagMismatch,
}

impl FheError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}

pub type FheResult<T> = Result<T, FheError>;
