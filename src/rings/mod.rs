//! RNS ring-element engine.
//!
//! Polynomials in `Z_Q[X] / (X^N + 1)` stored as one residue array per limb
//! prime, with NTT-based multiplication, limb dropping and scale-and-round.

pub mod basis;
pub mod errors;
pub mod ntt;
pub mod poly;
pub mod scale;

pub use basis::{NttTable, RnsBasis};
pub use errors::{RingError, RingResult};
pub use poly::{PolyDistribution, Representation, RnsPoly};
pub use scale::{DecompositionTables, GammaTables, RescaleConstants, ScaleRoundConstants};
