use argon2::Variant;
use rand::RngCore;

use pea_lib::sec::authn::MAX_PASSWORD_CHARS;

use crate::error::{Detail, Error, ErrorKind};

pub const SALT_LEN: usize = 32;

pub type Salt = [u8; SALT_LEN];

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password exceeds the maximum length")]
    TooLong,

    #[error(transparent)]
    Rand(#[from] rand::Error),

    #[error(transparent)]
    Argon2(#[from] argon2::Error),
}

impl From<PasswordError> for Error {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooLong => Error::from(ErrorKind::ValidationFailed)
                .with_detail(Detail::with_key("password")),
            PasswordError::Rand(src) => Error::from(ErrorKind::InternalFailure)
                .with_source(src),
            PasswordError::Argon2(src) => Error::from(ErrorKind::InternalFailure)
                .with_source(src),
        }
    }
}

pub fn gen_salt<R>(rng: &mut R) -> Result<Salt, rand::Error>
where
    R: RngCore
{
    let mut salt = [0u8; SALT_LEN];

    rng.try_fill_bytes(&mut salt)?;

    Ok(salt)
}

// each call draws a fresh salt so identical passwords never share an
// encoded hash. the work factor travels inside the encoded string
pub fn gen_hash<R>(password: &str, rng: &mut R) -> Result<String, PasswordError>
where
    R: RngCore
{
    if password.chars().count() > MAX_PASSWORD_CHARS {
        return Err(PasswordError::TooLong);
    }

    let salt = gen_salt(rng)?;

    let mut config = argon2::Config::default();
    config.mem_cost = 19456;
    config.variant = Variant::Argon2id;

    Ok(argon2::hash_encoded(
        password.as_bytes(),
        &salt,
        &config
    )?)
}

pub fn verify_hash<C>(check: C, encoded: &str) -> Result<bool, PasswordError>
where
    C: AsRef<[u8]>
{
    Ok(argon2::verify_encoded(encoded, check.as_ref())?)
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn hash_then_verify() {
        let mut rng = SmallRng::seed_from_u64(1);

        let encoded = gen_hash("test_password_123", &mut rng).unwrap();

        assert!(verify_hash("test_password_123", &encoded).unwrap(), "password failed to verify");
        assert!(!verify_hash("wrong_password", &encoded).unwrap(), "wrong password was accepted");
    }

    #[test]
    fn repeated_hashing_salts_differently() {
        let mut rng = SmallRng::seed_from_u64(2);

        let first = gen_hash("test_password_123", &mut rng).unwrap();
        let second = gen_hash("test_password_123", &mut rng).unwrap();

        assert_ne!(first, second, "two hashes shared a salt");
        assert!(verify_hash("test_password_123", &first).unwrap());
        assert!(verify_hash("test_password_123", &second).unwrap());
    }

    #[test]
    fn oversized_password_is_rejected() {
        let mut rng = SmallRng::seed_from_u64(3);
        let long = pea_lib::string_to_len(MAX_PASSWORD_CHARS + 1);

        let result = gen_hash(&long, &mut rng);

        assert!(matches!(result, Err(PasswordError::TooLong)));
    }

    #[test]
    fn malformed_encoded_hash_is_an_error() {
        let result = verify_hash("test_password_123", "not-an-encoded-hash");

        assert!(matches!(result, Err(PasswordError::Argon2(_))), "malformed hash did not error");
    }
}
