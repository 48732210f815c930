//! Password hashing and token generation

use ring::rand::{SecureRandom, SystemRandom};
use shared::{AppError, AppResult};

const TOKEN_BYTES: usize = 32;

/// Argon2id PHC string for `plain`
pub fn hash_password(plain: &str) -> AppResult<String> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Constant-time check of `candidate` against a stored PHC hash
///
/// Anything that is not a parsable hash never verifies.
pub fn verify_password(candidate: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

/// Whether a stored secret is already a hash (as opposed to legacy plain text)
pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with("$argon2")
}

/// Opaque session token: 32 random bytes, hex encoded
pub fn generate_token() -> AppResult<String> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; TOKEN_BYTES];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::internal("Failed to generate session token"))?;
    Ok(hex::encode(bytes))
}
