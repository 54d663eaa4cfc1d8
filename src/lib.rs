pub mod crypto;
pub mod encoding;
pub mod keys;
pub mod math;
pub mod params;
pub mod rings;

pub use crypto::{
    Ciphertext, DecryptStatus, EncryptionKey, FheError, FheResult, PlainPoly, Plaintext, bfv,
    ckks,
};
pub use encoding::{CkksEncoder, EncodingError, encode_coefficients};
pub use keys::{KeyGenerator, KeyPair, KeyTag, PublicKey, SecretKey};
pub use params::{
    BfvParams, BfvParamsBuilder, CkksParams, CkksParamsBuilder, EncryptionTechnique, RlweParams,
    ScalingTechnique, SecretKeyDistribution,
};
pub use rings::{PolyDistribution, Representation, RingError, RnsBasis, RnsPoly};
