use garde::Validate;

use crate::error::{AppError, Result};

/// Runs the `garde` rules declared on a request payload.
pub fn validate_payload<T>(payload: &T) -> Result<()>
where
    T: Validate,
    T::Context: Default,
{
    payload
        .validate()
        .map_err(|report| AppError::Validation(report.to_string().trim().to_string()))
}

/// Normalizes an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates a password.
///
/// # Arguments
///
/// * `password` - The password to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the password is valid.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Signup {
        #[garde(email)]
        email: String,
        #[garde(length(min = 8, max = 128))]
        password: String,
    }

    #[test]
    fn payload_rules_are_enforced() {
        let ok = Signup {
            email: "ana@example.com".to_string(),
            password: "long enough".to_string(),
        };
        assert!(validate_payload(&ok).is_ok());

        let bad_email = Signup {
            email: "not-an-email".to_string(),
            password: "long enough".to_string(),
        };
        assert!(matches!(validate_payload(&bad_email), Err(AppError::Validation(_))));

        let short = Signup {
            email: "ana@example.com".to_string(),
            password: "short".to_string(),
        };
        let err = validate_payload(&short).unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }
}
