//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest identity string accepted from the identity collaborator.
pub const MAX_IDENTITY_LENGTH: usize = 128;

/// Validates a sport label: short, lowercase ASCII letters, digits, `-` or `_`.
///
/// # Examples
///
/// ```ignore
/// validate_sport("soccer")      // Ok
/// validate_sport("beach-volley") // Ok
/// validate_sport("Soccer")      // Err - uppercase
/// ```
pub fn validate_sport(sport: &str) -> Result<(), ValidationError> {
    let sport = sport.trim();
    if sport.is_empty() || sport.len() > 32 {
        let mut err = ValidationError::new("sport_length");
        err.message = Some(format!("sport must be 1 to 32 characters (got {})", sport.len()).into());
        return Err(err);
    }

    if !sport
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        let mut err = ValidationError::new("sport_format");
        err.message = Some("sport must use lowercase letters, digits, '-' or '_'".into());
        return Err(err);
    }

    Ok(())
}

/// Validates an identity reference such as a scorer or a new member.
pub fn validate_identity(identity: &str) -> Result<(), ValidationError> {
    if identity.trim().is_empty() || identity.len() > MAX_IDENTITY_LENGTH {
        let mut err = ValidationError::new("identity");
        err.message = Some(format!("identity must be 1 to {MAX_IDENTITY_LENGTH} characters").into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sport_valid() {
        assert!(validate_sport("soccer").is_ok());
        assert!(validate_sport("futsal_5").is_ok());
        assert!(validate_sport("beach-volley").is_ok());
    }

    #[test]
    fn test_validate_sport_invalid() {
        assert!(validate_sport("").is_err());
        assert!(validate_sport("Soccer").is_err());
        assert!(validate_sport("ice hockey").is_err());
        assert!(validate_sport(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_identity() {
        assert!(validate_identity("user-1").is_ok());
        assert!(validate_identity("  ").is_err());
        assert!(validate_identity(&"u".repeat(MAX_IDENTITY_LENGTH + 1)).is_err());
    }
}
