/// Password Hashing and Verification
///
/// bcrypt is salted and adaptive: identical plaintexts never hash to the
/// same stored value, and the work factor scales brute-force cost.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AuthError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
// bcrypt only reads the first 72 bytes of input
const MAX_PASSWORD_LENGTH: usize = 72;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns error if the password fails strength validation or hashing fails
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    validate_password_strength(password)?;

    hash(password, DEFAULT_COST)
        .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its stored hash
///
/// A malformed stored hash yields `false`, never an error: verification is
/// a yes/no question at this boundary.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    verify(password, stored_hash).unwrap_or(false)
}

/// Validate password strength requirements
///
/// Requirements:
/// - 8 to 72 bytes
/// - At least one digit, one lowercase letter, one uppercase letter
fn validate_password_strength(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(ValidationError::TooShort(
            "password",
            MIN_PASSWORD_LENGTH,
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::Validation(ValidationError::TooLong(
            "password",
            MAX_PASSWORD_LENGTH,
        )));
    }

    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(AuthError::Validation(ValidationError::InvalidFormat(
            "password",
        )));
    }

    Ok(())
}
