//! Secret key: a small polynomial `s(X)` stored in evaluation form.
use std::sync::Arc;

use super::KeyTag;
use crate::rings::{RingResult, RnsBasis, RnsPoly};

#[derive(Debug, Clone)]
pub struct SecretKey<const DEGREE: usize> {
    pub(crate) s: RnsPoly<DEGREE>,
    pub(crate) key_tag: KeyTag,
}

impl<const DEGREE: usize> SecretKey<DEGREE> {
    /// Wraps an existing secret polynomial, e.g. one loaded from storage.
    pub fn from_poly(s: RnsPoly<DEGREE>, key_tag: KeyTag) -> Self {
        let mut s = s;
        s.to_evaluation();
        Self { s, key_tag }
    }

    pub fn poly(&self) -> &RnsPoly<DEGREE> {
        &self.s
    }

    pub fn key_tag(&self) -> KeyTag {
        self.key_tag
    }

    /// The secret restricted to the leading limbs in `basis`.
    pub fn poly_over(&self, basis: &Arc<RnsBasis<DEGREE>>) -> RingResult<RnsPoly<DEGREE>> {
        let mut s = self.s.clone();
        if !Arc::ptr_eq(s.basis(), basis) {
            s.truncate_to(basis)?;
        }
        Ok(s)
    }
}
