//! Key material and key generation.

pub mod generator;
pub mod public_key;
pub mod secret_key;

use rand::Rng;

pub use generator::KeyGenerator;
pub use public_key::PublicKey;
pub use secret_key::SecretKey;

/// Random identifier shared by the two halves of a key pair and stamped on
/// every ciphertext encrypted under them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyTag(u64);

impl KeyTag {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random())
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct KeyPair<const DEGREE: usize> {
    pub secret_key: SecretKey<DEGREE>,
    pub public_key: PublicKey<DEGREE>,
}
