use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use toy_rns_fhe::{
    BfvParams, EncryptionTechnique, FheError, KeyGenerator, KeyPair, RlweParams,
    ScalingTechnique, SecretKeyDistribution, bfv, encode_coefficients, math::generate_primes,
};

const DEGREE: usize = 64;
const T: u64 = 65537;

fn build_params(
    encryption: EncryptionTechnique,
    scaling: ScalingTechnique,
) -> BfvParams<DEGREE> {
    let primes = generate_primes(50, 5, DEGREE as u64);
    BfvParams::<DEGREE>::builder()
        .moduli(primes[..3].to_vec())
        .plaintext_modulus(T)
        .encryption_technique(encryption)
        .scaling_technique(scaling)
        .auxiliary_moduli(vec![primes[3]])
        .build()
        .unwrap()
}

fn generate_keys(params: &BfvParams<DEGREE>, seed: u64) -> (KeyPair<DEGREE>, ChaCha20Rng) {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let keys = KeyGenerator::new(params).generate(&mut rng).unwrap();
    (keys, rng)
}

#[test]
fn public_key_round_trip_recovers_message() {
    let params = build_params(EncryptionTechnique::Standard, ScalingTechnique::Hps);
    let (keys, mut rng) = generate_keys(&params, 42);

    let plaintext = encode_coefficients(&[1, 2, 3, 4], &params, 0).unwrap();
    let ct = bfv::encrypt(&plaintext, &keys.public_key, &params, &mut rng).unwrap();
    let (plain, status) = bfv::decrypt(&ct, &keys.secret_key, &params).unwrap();

    assert_eq!(plain.values(), &[1, 2, 3, 4]);
    assert_eq!(status.message_length, 4);
    assert_eq!(ct.level(params.chain_length()), 0);
}

#[test]
fn every_technique_combination_round_trips() {
    let message: Vec<i64> = (0..32).map(|i| i * 1999 - 30000).collect();
    let expected: Vec<i64> = message.clone();

    for encryption in [EncryptionTechnique::Standard, EncryptionTechnique::Extended] {
        for scaling in [
            ScalingTechnique::Hps,
            ScalingTechnique::HpsPOverQ,
            ScalingTechnique::HpsPOverQLeveled,
            ScalingTechnique::Behz,
        ] {
            let params = build_params(encryption, scaling);
            let (keys, mut rng) = generate_keys(&params, 7);
            let plaintext = encode_coefficients(&message, &params, 0).unwrap();

            let via_pk = bfv::encrypt(&plaintext, &keys.public_key, &params, &mut rng).unwrap();
            let via_sk = bfv::encrypt(&plaintext, &keys.secret_key, &params, &mut rng).unwrap();
            for ct in [via_pk, via_sk] {
                assert_eq!(ct.limb_count(), 3, "{encryption:?}/{scaling:?}");
                let (plain, _) = bfv::decrypt(&ct, &keys.secret_key, &params).unwrap();
                assert_eq!(plain.centered_values(), expected, "{encryption:?}/{scaling:?}");
            }
        }
    }
}

#[test]
fn scale_and_round_families_agree_on_the_same_ciphertext() {
    let hps = build_params(EncryptionTechnique::Standard, ScalingTechnique::Hps);
    let behz = build_params(EncryptionTechnique::Standard, ScalingTechnique::Behz);
    let (keys, mut rng) = generate_keys(&hps, 99);

    let plaintext = encode_coefficients(&[65536, 0, 12345, 1], &hps, 0).unwrap();
    let ct = bfv::encrypt(&plaintext, &keys.public_key, &hps, &mut rng).unwrap();
    let (a, _) = bfv::decrypt_with_length(&ct, &keys.secret_key, &hps, Some(DEGREE / 2)).unwrap();
    let (b, _) = bfv::decrypt_with_length(&ct, &keys.secret_key, &behz, Some(DEGREE / 2)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.values()[..4], [65536, 0, 12345, 1]);
}

#[test]
fn secret_key_variants_round_trip() {
    let primes = generate_primes(50, 3, DEGREE as u64);
    for distribution in [
        SecretKeyDistribution::Gaussian,
        SecretKeyDistribution::UniformTernary,
        SecretKeyDistribution::SparseTernary { hamming_weight: 16 },
    ] {
        let params = BfvParams::<DEGREE>::builder()
            .moduli(primes.clone())
            .plaintext_modulus(T)
            .secret_key_distribution(distribution)
            .build()
            .unwrap();
        let (keys, mut rng) = generate_keys(&params, 3);
        let plaintext = encode_coefficients(&[9, 8, 7], &params, 0).unwrap();
        let ct = bfv::encrypt(&plaintext, &keys.public_key, &params, &mut rng).unwrap();
        let (plain, _) = bfv::decrypt(&ct, &keys.secret_key, &params).unwrap();
        assert_eq!(plain.values(), &[9, 8, 7], "{distribution}");
    }
}

#[test]
fn public_key_extension_keeps_round_trip() {
    let primes = generate_primes(50, 4, DEGREE as u64);
    let params = BfvParams::<DEGREE>::builder()
        .moduli(primes[..3].to_vec())
        .plaintext_modulus(T)
        .public_key_extension(vec![primes[3]])
        .build()
        .unwrap();
    let (keys, mut rng) = generate_keys(&params, 5);
    assert_eq!(keys.public_key.b().limb_count(), 4);
    assert_eq!(keys.secret_key.poly().limb_count(), 3);

    let plaintext = encode_coefficients(&[100, -100], &params, 0).unwrap();
    let ct = bfv::encrypt(&plaintext, &keys.public_key, &params, &mut rng).unwrap();
    assert_eq!(ct.limb_count(), 3);
    let (plain, _) = bfv::decrypt(&ct, &keys.secret_key, &params).unwrap();
    assert_eq!(plain.centered_values(), vec![100, -100]);
}

#[test]
fn reduced_level_plaintext_encrypts_at_that_level() {
    let params = build_params(EncryptionTechnique::Standard, ScalingTechnique::Behz);
    let (keys, mut rng) = generate_keys(&params, 11);

    for level in 0..3 {
        let plaintext = encode_coefficients(&[4, 3, 2, 1], &params, level).unwrap();
        let ct = bfv::encrypt(&plaintext, &keys.secret_key, &params, &mut rng).unwrap();
        assert_eq!(ct.level(params.chain_length()), level);
        let (plain, _) = bfv::decrypt(&ct, &keys.secret_key, &params).unwrap();
        assert_eq!(plain.values(), &[4, 3, 2, 1], "level {level}");
    }
}

#[test]
fn extended_technique_rejects_reduced_level_plaintext() {
    let params = build_params(EncryptionTechnique::Extended, ScalingTechnique::Hps);
    let (keys, mut rng) = generate_keys(&params, 13);
    let plaintext = encode_coefficients(&[1], &params, 1).unwrap();
    assert!(matches!(
        bfv::encrypt(&plaintext, &keys.public_key, &params, &mut rng),
        Err(FheError::IncompatibleEncodingLevel {
            plaintext_limbs: 2,
            chain_limbs: 3
        })
    ));
}

#[test]
fn plaintext_from_foreign_chain_is_rejected() {
    let params = build_params(EncryptionTechnique::Standard, ScalingTechnique::Hps);
    let other = BfvParams::<DEGREE>::builder()
        .moduli(generate_primes(40, 3, DEGREE as u64))
        .plaintext_modulus(T)
        .build()
        .unwrap();
    let (keys, mut rng) = generate_keys(&params, 17);
    let plaintext = encode_coefficients(&[1], &other, 0).unwrap();
    assert!(matches!(
        bfv::encrypt(&plaintext, &keys.public_key, &params, &mut rng),
        Err(FheError::IncompatibleEncodingLevel { .. })
    ));
}

#[test]
fn plaintext_modulus_just_below_smallest_prime_round_trips() {
    let primes = generate_primes(30, 4, DEGREE as u64);
    let t = primes[3] - 2;
    let message = [t as i64 - 1, 5, (t / 2) as i64, (t / 2 + 1) as i64];

    for encryption in [EncryptionTechnique::Standard, EncryptionTechnique::Extended] {
        for scaling in [ScalingTechnique::Hps, ScalingTechnique::Behz] {
            let params = BfvParams::<DEGREE>::builder()
                .moduli(primes[..3].to_vec())
                .auxiliary_moduli(vec![primes[3]])
                .plaintext_modulus(t)
                .encryption_technique(encryption)
                .scaling_technique(scaling)
                .build()
                .unwrap();
            let (keys, mut rng) = generate_keys(&params, 23);
            let plaintext = encode_coefficients(&message, &params, 0).unwrap();

            let via_sk = bfv::encrypt(&plaintext, &keys.secret_key, &params, &mut rng).unwrap();
            let via_pk = bfv::encrypt(&plaintext, &keys.public_key, &params, &mut rng).unwrap();
            for ct in [via_sk, via_pk] {
                let (plain, _) = bfv::decrypt(&ct, &keys.secret_key, &params).unwrap();
                assert_eq!(
                    plain.values(),
                    &[t - 1, 5, t / 2, t / 2 + 1],
                    "{encryption:?}/{scaling:?}"
                );
            }
        }
    }
}
