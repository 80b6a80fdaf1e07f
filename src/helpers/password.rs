use argon2::password_hash::{
    rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier,
    SaltString,
};
use argon2::Argon2;
use std::sync::OnceLock;

static PLACEHOLDER_HASH: OnceLock<String> = OnceLock::new();

/// Argon2id PHC string with a fresh random salt. CPU bound, call it from a blocking context.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// `Ok(false)` on mismatch, `Err` only when the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(stored_hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Pays the same Argon2 cost as [`verify_password`] for a login with no account behind it,
/// so response timing does not reveal which usernames exist. Always `false`.
pub fn verify_placeholder(password: &str) -> bool {
    let hash = PLACEHOLDER_HASH.get_or_init(|| {
        hash_password("placeholder").unwrap_or_else(|err| {
            tracing::error!("placeholder hash not created: {}", err);
            String::new()
        })
    });
    let _ = verify_password(password, hash);
    false
}
