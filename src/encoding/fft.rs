//! CKKS canonical-embedding encoder.
//!
//! Slot `j` holds the evaluation of the message polynomial at
//! `zeta_j = exp(i * pi * (2j + 1) / N)`. Because `zeta_{N-1-j}` is the
//! conjugate of `zeta_j`, filling the upper half with conjugates keeps the
//! coefficients real.
//!
//! With the twist `b_i = m_i * psi^i` (`psi = exp(i * pi / N)`) the
//! evaluations become a plain length-`N` DFT of `b`, which `rustfft` runs:
//! decoding is an unnormalized inverse FFT, encoding the forward FFT divided
//! by `N`.
use std::{f64::consts::PI, sync::Arc};

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use crate::{
    crypto::{FheResult, Plaintext},
    encoding::{EncodingError, EncodingResult},
    rings::{RnsBasis, RnsPoly},
};

/// Largest coefficient magnitude accepted after scaling.
const MAX_COEFF: f64 = (1u64 << 62) as f64;

pub struct CkksEncoder<const DEGREE: usize> {
    scale_bits: u32,
    twist: Vec<Complex64>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl<const DEGREE: usize> CkksEncoder<DEGREE> {
    pub fn new(scale_bits: u32) -> EncodingResult<Self> {
        if !DEGREE.is_power_of_two() || DEGREE < 2 {
            return Err(EncodingError::InvalidRingDegree { degree: DEGREE });
        }
        if !(1..=62).contains(&scale_bits) {
            return Err(EncodingError::InvalidScaleBits { scale_bits });
        }
        let twist = (0..DEGREE)
            .map(|i| Complex64::from_polar(1.0, PI * i as f64 / DEGREE as f64))
            .collect();
        let mut planner = FftPlanner::new();
        Ok(Self {
            scale_bits,
            twist,
            forward: planner.plan_fft_forward(DEGREE),
            inverse: planner.plan_fft_inverse(DEGREE),
        })
    }

    pub fn delta(&self) -> f64 {
        (1u64 << self.scale_bits) as f64
    }

    pub fn max_slots(&self) -> usize {
        DEGREE / 2
    }

    /// Scaled integer coefficients whose slots approximate `values`.
    pub fn encode_coeffs(&self, values: &[f64]) -> EncodingResult<[i64; DEGREE]> {
        let max_slots = self.max_slots();
        if values.len() > max_slots {
            return Err(EncodingError::InputTooLong {
                got: values.len(),
                max: max_slots,
            });
        }
        if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(EncodingError::ValueOutOfRange { value: bad });
        }

        let delta = self.delta();
        let mut slots = vec![Complex64::new(0.0, 0.0); DEGREE];
        for (j, &value) in values.iter().enumerate() {
            slots[j] = Complex64::new(value * delta, 0.0);
            slots[DEGREE - 1 - j] = slots[j].conj();
        }
        self.forward.process(&mut slots);

        let scale = (DEGREE as f64).recip();
        let mut coeffs = [0i64; DEGREE];
        for ((coeff, b), psi) in coeffs.iter_mut().zip(&slots).zip(&self.twist) {
            let real = (b * psi.conj()).re * scale;
            if real.abs() >= MAX_COEFF {
                return Err(EncodingError::CoefficientOutOfRange { value: real });
            }
            *coeff = real.round() as i64;
        }
        Ok(coeffs)
    }

    /// Encodes `values` over `basis` as a coefficient-form plaintext.
    pub fn encode(
        &self,
        values: &[f64],
        basis: Arc<RnsBasis<DEGREE>>,
    ) -> FheResult<Plaintext<DEGREE>> {
        let coeffs = self.encode_coeffs(values)?;
        Ok(Plaintext::new(RnsPoly::from_coeffs(&coeffs, basis), values.len()))
    }

    /// Evaluates centered coefficients at the slot points and rescales,
    /// returning the first `length` slots.
    pub fn decode(&self, coeffs: &[f64], length: usize) -> Vec<f64> {
        let mut buffer: Vec<Complex64> = self
            .twist
            .iter()
            .zip(coeffs.iter().chain(std::iter::repeat(&0.0)))
            .map(|(psi, &c)| psi * c)
            .collect();
        self.inverse.process(&mut buffer);
        let delta = self.delta();
        buffer
            .iter()
            .take(length.min(self.max_slots()))
            .map(|z| z.re / delta)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn roundtrip_small_values() {
        let encoder = CkksEncoder::<8>::new(30).unwrap();
        let values = [0.5, 0.25, 0.125, 0.0625];
        let coeffs = encoder.encode_coeffs(&values).unwrap();
        let as_f64: Vec<f64> = coeffs.iter().map(|&c| c as f64).collect();
        let decoded = encoder.decode(&as_f64, values.len());
        for (orig, dec) in values.iter().zip(&decoded) {
            assert_abs_diff_eq!(orig, dec, epsilon = 1e-6);
        }
    }

    #[test]
    fn encoding_is_a_ring_homomorphism_for_products() {
        // Slot-wise product equals the negacyclic product of the encodings.
        let encoder = CkksEncoder::<8>::new(20).unwrap();
        let x = [1.5, -2.0, 0.5, 3.0];
        let y = [2.0, 0.25, -4.0, 1.0];
        let a = encoder.encode_coeffs(&x).unwrap();
        let b = encoder.encode_coeffs(&y).unwrap();

        let mut product = [0f64; 8];
        for i in 0..8 {
            for j in 0..8 {
                let term = a[i] as f64 * b[j] as f64;
                if i + j < 8 {
                    product[i + j] += term;
                } else {
                    product[i + j - 8] -= term;
                }
            }
        }
        let decoded = encoder.decode(&product, 4);
        for k in 0..4 {
            assert_abs_diff_eq!(decoded[k] / encoder.delta(), x[k] * y[k], epsilon = 1e-3);
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            CkksEncoder::<6>::new(20),
            Err(EncodingError::InvalidRingDegree { degree: 6 })
        ));
        for scale_bits in [0, 63, 64, 200] {
            assert!(matches!(
                CkksEncoder::<4>::new(scale_bits),
                Err(EncodingError::InvalidScaleBits { .. })
            ));
        }
        let encoder = CkksEncoder::<4>::new(20).unwrap();
        assert!(matches!(
            encoder.encode_coeffs(&[1.0, 2.0, 3.0]),
            Err(EncodingError::InputTooLong { got: 3, max: 2 })
        ));
        assert!(matches!(
            encoder.encode_coeffs(&[f64::NAN]),
            Err(EncodingError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            encoder.encode_coeffs(&[1e30]),
            Err(EncodingError::CoefficientOutOfRange { .. })
        ));
    }
}
