pub mod modular;
pub mod primes;
pub mod sampling;

pub use primes::{generate_primes, get_first_prime_down, is_ntt_friendly_prime, is_prime};
pub use sampling::{
    gaussian_coefficients, ternary_coefficients, uniform_coefficients,
    uniform_ternary_coefficients,
};
