//! Validation helpers for DTOs.

use validator::ValidationError;

/// Minimum nickname length after trimming surrounding whitespace.
pub const MIN_NICKNAME_LENGTH: usize = 3;
/// Maximum nickname length.
pub const MAX_NICKNAME_LENGTH: usize = 32;

/// Validates that a nickname is at least three visible characters.
pub fn validate_nickname(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_NICKNAME_LENGTH {
        let mut err = ValidationError::new("nickname_length");
        err.message = Some(
            format!("Nickname must be at least {MIN_NICKNAME_LENGTH} characters").into(),
        );
        return Err(err);
    }
    if trimmed.chars().count() > MAX_NICKNAME_LENGTH {
        let mut err = ValidationError::new("nickname_length");
        err.message =
            Some(format!("Nickname must be at most {MAX_NICKNAME_LENGTH} characters").into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a player identity string is present and non-blank.
pub fn validate_player_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("player_id_missing");
        err.message = Some("Player id must not be empty".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_length_bounds() {
        assert!(validate_nickname("ala").is_ok());
        assert!(validate_nickname("  ola  ").is_ok());
        assert!(validate_nickname("ab").is_err());
        assert!(validate_nickname("   a   ").is_err());
        assert!(validate_nickname(&"x".repeat(33)).is_err());
    }

    #[test]
    fn player_id_must_be_present() {
        assert!(validate_player_id("p1").is_ok());
        assert!(validate_player_id("").is_err());
        assert!(validate_player_id("   ").is_err());
    }
}
