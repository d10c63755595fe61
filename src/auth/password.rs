//! Argon2id password hashing. Hashes are stored as PHC strings, which embed the
//! algorithm parameters and salt.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    fn matches(password: &str, hash: &str) -> bool {
        let parsed = PasswordHash::new(hash).unwrap();
        Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
    }

    #[test]
    fn hashes_verify_and_are_salted() {
        let first = hash_password("correct-horse").unwrap();
        let second = hash_password("correct-horse").unwrap();
        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(matches("correct-horse", &first));
        assert!(!matches("wrong-horse", &first));
    }
}
