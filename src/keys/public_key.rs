//! Public key `(b, a)` with `b = noise_scale * e - a * s`.
use std::sync::Arc;

use super::KeyTag;
use crate::rings::{RingResult, RnsBasis, RnsPoly};

#[derive(Debug, Clone)]
pub struct PublicKey<const DEGREE: usize> {
    pub(crate) b: RnsPoly<DEGREE>,
    pub(crate) a: RnsPoly<DEGREE>,
    pub(crate) key_tag: KeyTag,
}

impl<const DEGREE: usize> PublicKey<DEGREE> {
    pub fn b(&self) -> &RnsPoly<DEGREE> {
        &self.b
    }

    pub fn a(&self) -> &RnsPoly<DEGREE> {
        &self.a
    }

    pub fn key_tag(&self) -> KeyTag {
        self.key_tag
    }

    /// Both components restricted to the leading limbs in `basis`.
    pub fn elements_over(
        &self,
        basis: &Arc<RnsBasis<DEGREE>>,
    ) -> RingResult<(RnsPoly<DEGREE>, RnsPoly<DEGREE>)> {
        let (mut b, mut a) = (self.b.clone(), self.a.clone());
        if !Arc::ptr_eq(b.basis(), basis) {
            b.truncate_to(basis)?;
            a.truncate_to(basis)?;
        }
        Ok((b, a))
    }
}
