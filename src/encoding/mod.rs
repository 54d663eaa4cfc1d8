//! Plaintext encoders.
//!
//! - [`encode_coefficients`]: integers placed directly in the coefficients,
//!   reduced modulo the plaintext modulus (BFV).
//! - [`CkksEncoder`]: real vectors through the canonical embedding, scaled by
//!   `2^scale_bits` (CKKS).

mod coefficient;
mod fft;

pub use coefficient::encode_coefficients;
pub use fft::CkksEncoder;
use thiserror::Error;

pub type EncodingResult<T> = Result<T, EncodingError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("Ring degree {degree} not supported")]
    InvalidRingDegree { degree: usize },

    #[error("Scale bits {scale_bits} outside 1..=62")]
    InvalidScaleBits { scale_bits: u32 },

    #[error("Input too long: got {got}, max {max}")]
    InputTooLong { got: usize, max: usize },

    #[error("Coefficient {value} out of range")]
    CoefficientOutOfRange { value: f64 },

    #[error("Value {value} cannot be encoded")]
    ValueOutOfRange { value: f64 },
}
