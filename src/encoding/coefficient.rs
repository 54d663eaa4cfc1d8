use crate::{
    crypto::{FheError, FheResult, Plaintext},
    encoding::EncodingError,
    math::modular::reduce_signed,
    params::{BfvParams, RlweParams},
    rings::RnsPoly,
};

/// Places `values` in the low coefficients, reduced into `[0, t)`, over the
/// chain prefix for `level`.
pub fn encode_coefficients<const DEGREE: usize>(
    values: &[i64],
    params: &BfvParams<DEGREE>,
    level: usize,
) -> FheResult<Plaintext<DEGREE>> {
    let max = params.max_slots();
    if values.len() > max {
        return Err(EncodingError::InputTooLong {
            got: values.len(),
            max,
        }
        .into());
    }
    let chain_limbs = params.chain_length();
    let basis = params
        .basis_at_level(level)
        .ok_or(FheError::IncompatibleEncodingLevel {
            plaintext_limbs: chain_limbs.saturating_sub(level),
            chain_limbs,
        })?;

    let t = params.plaintext_modulus();
    let coeffs: Vec<i64> = values
        .iter()
        .map(|&v| reduce_signed(v as i128, t) as i64)
        .collect();
    Ok(Plaintext::new(
        RnsPoly::from_coeffs(&coeffs, basis.clone()),
        values.len(),
    ))
}
