use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use tracing::error;

/// Check `plain` against an argon2 PHC string from `auth.password_hash`.
///
/// An empty stored hash means the account has no password login and never matches.
/// A malformed hash is an error, not a mismatch.
pub fn verify_password(plain: &str, stored_hash: &str) -> anyhow::Result<bool> {
    if stored_hash.is_empty() {
        return Ok(false);
    }
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!("stored password hash is malformed: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
pub fn hash_password(plain: &str) -> String {
    use argon2::password_hash::{PasswordHasher, SaltString};
    use rand::rngs::OsRng;

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .expect("argon2 hashing")
        .to_string()
}
