//! Negacyclic NTT kernels over one limb.
//!
//! `forward` maps coefficients `a_i` to evaluations `a(psi^(2k+1))` in natural
//! order; `inverse` undoes it exactly. Pointwise products of evaluations are
//! products in `Z_q[X] / (X^N + 1)`.

use super::basis::NttTable;
use crate::math::modular::{add_mod, mul_mod, sub_mod};

pub fn forward<const DEGREE: usize>(values: &mut [u64; DEGREE], table: &NttTable<DEGREE>) {
    let q = table.modulus;
    for (v, &psi) in values.iter_mut().zip(&table.psi_powers) {
        *v = mul_mod(*v, psi, q);
    }
    bit_reverse_permute(values);
    cooley_tukey(values, &table.omega_powers, q);
}

pub fn inverse<const DEGREE: usize>(values: &mut [u64; DEGREE], table: &NttTable<DEGREE>) {
    let q = table.modulus;
    bit_reverse_permute(values);
    cooley_tukey(values, &table.omega_inv_powers, q);
    for (v, &psi_inv) in values.iter_mut().zip(&table.psi_inv_powers_scaled) {
        *v = mul_mod(*v, psi_inv, q);
    }
}

// Iterative decimation-in-time transform; expects bit-reversed input and
// `roots[k] = w^k` for k < N/2.
fn cooley_tukey<const DEGREE: usize>(values: &mut [u64; DEGREE], roots: &[u64], q: u64) {
    let mut len = 2;
    while len <= DEGREE {
        let half = len / 2;
        let step = DEGREE / len;
        for start in (0..DEGREE).step_by(len) {
            for offset in 0..half {
                let left = start + offset;
                let right = left + half;
                let t = mul_mod(values[right], roots[offset * step], q);
                let u = values[left];
                values[left] = add_mod(u, t, q);
                values[right] = sub_mod(u, t, q);
            }
        }
        len *= 2;
    }
}

fn bit_reverse_permute<const DEGREE: usize>(values: &mut [u64; DEGREE]) {
    let bits = DEGREE.trailing_zeros();
    for i in 0..DEGREE {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if i < j {
            values.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::modular::mod_pow;

    fn naive_negacyclic(a: &[u64; 8], b: &[u64; 8], q: u64) -> [u64; 8] {
        let mut out = [0u64; 8];
        for i in 0..8 {
            for j in 0..8 {
                let prod = mul_mod(a[i], b[j], q);
                if i + j < 8 {
                    out[i + j] = add_mod(out[i + j], prod, q);
                } else {
                    out[i + j - 8] = sub_mod(out[i + j - 8], prod, q);
                }
            }
        }
        out
    }

    #[test]
    fn forward_evaluates_at_odd_powers_of_psi() {
        let table = NttTable::<8>::new(97).unwrap();
        let psi = table.psi_powers[1];
        let coeffs = [3u64, 1, 4, 1, 5, 9, 2, 6];
        let mut evals = coeffs;
        forward(&mut evals, &table);
        for (k, &eval) in evals.iter().enumerate() {
            let point = mod_pow(psi, 2 * k as u64 + 1, 97);
            let expected = coeffs
                .iter()
                .rev()
                .fold(0u64, |acc, &c| add_mod(mul_mod(acc, point, 97), c, 97));
            assert_eq!(eval, expected, "evaluation {k}");
        }
    }

    #[test]
    fn inverse_undoes_forward() {
        let table = NttTable::<8>::new(113).unwrap();
        let original = [1u64, 2, 3, 4, 5, 6, 7, 112];
        let mut values = original;
        forward(&mut values, &table);
        inverse(&mut values, &table);
        assert_eq!(values, original);
    }

    #[test]
    fn pointwise_product_is_negacyclic_convolution() {
        let q = 97;
        let table = NttTable::<8>::new(q).unwrap();
        let a = [0u64, 0, 0, 0, 0, 0, 0, 1];
        let b = [5u64, 1, 0, 0, 0, 0, 3, 0];
        let expected = naive_negacyclic(&a, &b, q);

        let (mut fa, mut fb) = (a, b);
        forward(&mut fa, &table);
        forward(&mut fb, &table);
        let mut prod = [0u64; 8];
        for i in 0..8 {
            prod[i] = mul_mod(fa[i], fb[i], q);
        }
        inverse(&mut prod, &table);
        assert_eq!(prod, expected);
    }
}
