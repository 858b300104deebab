/// Input validators for account data
/// - Length limits on every field
/// - Practical RFC 5322 email format check
/// - Password length bounded by bcrypt's 72 byte input limit

use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::MAX_SECRET_BYTES;
use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_NAME_LENGTH: usize = 256;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = MAX_SECRET_BYTES;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// Validates and normalizes an email address (trimmed)
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }
    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email".to_string(), MIN_EMAIL_LENGTH));
    }
    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }
    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a display name (trimmed, no control characters)
pub fn is_valid_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("name".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("name".to_string(), MAX_NAME_LENGTH));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat("name".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Registration-time password policy; hashing itself accepts any string
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password".to_string(), MIN_PASSWORD_LENGTH));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_LENGTH));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert_eq!(is_valid_email("a@b.com").unwrap(), "a@b.com");
        assert_eq!(is_valid_email("  user@example.com ").unwrap(), "user@example.com");
        assert!(is_valid_email("first.last+tag@sub.example.org").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["", "   ", "a@b", "notanemail", "user@", "@example.com", "user@@example.com"] {
            assert!(is_valid_email(email).is_err(), "accepted {:?}", email);
        }
        let long = format!("{}@example.com", "a".repeat(MAX_EMAIL_LENGTH));
        assert!(matches!(is_valid_email(&long), Err(ValidationError::TooLong(_, _))));
    }

    #[test]
    fn test_names() {
        assert_eq!(is_valid_name("  Ada Lovelace ").unwrap(), "Ada Lovelace");
        assert!(is_valid_name("").is_err());
        assert!(is_valid_name("bad\u{0007}name").is_err());
        assert!(is_valid_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_password_bounds() {
        assert!(is_valid_password("Passw0rd").is_ok());
        assert!(is_valid_password("short").is_err());
        assert!(is_valid_password(&"p".repeat(MAX_PASSWORD_LENGTH)).is_ok());
        assert!(is_valid_password(&"p".repeat(MAX_PASSWORD_LENGTH + 1)).is_err());
    }
}
