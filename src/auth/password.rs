/// Password Hashing and Verification
///
/// bcrypt with a configurable work factor. The hash string carries the
/// algorithm version, cost, salt and digest, so verification needs nothing
/// but the stored value.

use crate::error::{AppError, AuthError};

/// bcrypt's input limit in bytes
pub const MAX_SECRET_BYTES: usize = 72;

/// Hash a secret with bcrypt
///
/// Any string is accepted. Fails only if bcrypt itself fails (an
/// out-of-range `cost` or an entropy failure while salting).
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    bcrypt::hash(password, cost).map_err(|e| {
        tracing::error!(error = %e, cost = cost, "bcrypt hashing failed");
        AppError::Auth(AuthError::Hashing)
    })
}

/// Verify a secret against a stored bcrypt hash
///
/// A malformed stored hash and an over-long secret are reported exactly
/// like a wrong password.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if password.len() > MAX_SECRET_BYTES {
        return false;
    }

    match bcrypt::verify(password, hash) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be parsed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    // Lowest cost bcrypt accepts; keeps the suite fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_password() {
        let password = "ValidPassword123";
        let hash = hash_password(password, TEST_COST).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
        assert!(hash.contains("$04$"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("ValidPassword123", TEST_COST).expect("Failed to hash password");
        assert!(verify_password("ValidPassword123", &hash));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("ValidPassword123", TEST_COST).expect("Failed to hash password");
        assert!(!verify_password("WrongPassword123", &hash));
    }

    #[test]
    fn test_same_secret_gets_distinct_salts() {
        let first = hash_password("repeat", TEST_COST).unwrap();
        let second = hash_password("repeat", TEST_COST).unwrap();

        assert_ne!(first, second);
        assert!(verify_password("repeat", &first));
        assert!(verify_password("repeat", &second));
    }

    #[test]
    fn test_any_content_is_hashable() {
        for secret in ["", " ", "pässwörd-ü", "emoji 🔐 secret", "tab\tand\nnewline"] {
            let hash = hash_password(secret, TEST_COST).expect("Failed to hash password");
            assert!(verify_password(secret, &hash), "round trip failed for {:?}", secret);
        }
    }

    #[test]
    fn test_malformed_hash_is_not_verified() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
        assert!(!verify_password("anything", "$2b$10$tooshort"));
    }

    #[test]
    fn test_secret_past_bcrypt_limit_does_not_verify() {
        let stored = "p".repeat(MAX_SECRET_BYTES);
        let hash = hash_password(&stored, TEST_COST).expect("Failed to hash password");

        assert!(verify_password(&stored, &hash));
        assert!(!verify_password(&format!("{}-not-the-password", stored), &hash));
        assert!(!verify_password(&format!("{}x", stored), &hash));
    }

    #[test]
    fn test_secret_past_bcrypt_limit_is_not_hashed() {
        let result = hash_password(&"p".repeat(MAX_SECRET_BYTES + 1), TEST_COST);
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::TooLong(_, MAX_SECRET_BYTES)))
        ));
    }

    #[test]
    fn test_out_of_range_cost_is_a_hashing_error() {
        let result = hash_password("ValidPassword123", 3);
        assert!(matches!(result, Err(AppError::Auth(AuthError::Hashing))));
    }
}
