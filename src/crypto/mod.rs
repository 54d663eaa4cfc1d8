//! Key-dependent operations: encryption of zero, BFV and CKKS
//! encryption/decryption, and ciphertext compression.

pub mod bfv;
pub mod ckks;
pub mod errors;
pub mod types;
pub mod zero;

pub use errors::{FheError, FheResult};
pub use types::{Ciphertext, DecryptStatus, PlainPoly, Plaintext};
pub use zero::{EncryptionKey, encryption_of_zero};
