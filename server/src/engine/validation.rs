/// Maximum length of a user or host identifier.
pub const MAX_USER_ID_LENGTH: usize = 128;

/// Maximum display name length.
pub const MAX_USER_NAME_LENGTH: usize = 64;

/// Maximum session name length.
pub const MAX_SESSION_NAME_LENGTH: usize = 100;

/// Maximum language tag length.
pub const MAX_LANGUAGE_LENGTH: usize = 32;

/// Upper bound on `maxParticipants`.
pub const MAX_PARTICIPANTS_LIMIT: usize = 100;

/// Validate a user id. Must be non-blank and at most 128 bytes.
pub fn validate_user_id(id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err("User ID cannot be empty".into());
    }
    if id.len() > MAX_USER_ID_LENGTH {
        return Err(format!(
            "User ID too long (max {} characters)",
            MAX_USER_ID_LENGTH
        ));
    }
    Ok(())
}

/// Validate a participant display name.
pub fn validate_user_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("User name cannot be empty".into());
    }
    if name.len() > MAX_USER_NAME_LENGTH {
        return Err(format!(
            "User name too long (max {} characters)",
            MAX_USER_NAME_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_session_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Session name cannot be blank".into());
    }
    if name.len() > MAX_SESSION_NAME_LENGTH {
        return Err(format!(
            "Session name too long (max {} characters)",
            MAX_SESSION_NAME_LENGTH
        ));
    }
    Ok(())
}

/// Validate a language tag. Letters, digits, `+`, `#`, `-` and `_` only.
pub fn validate_language(language: &str) -> Result<(), String> {
    if language.is_empty() || language.len() > MAX_LANGUAGE_LENGTH {
        return Err(format!(
            "Language must be 1-{} characters",
            MAX_LANGUAGE_LENGTH
        ));
    }
    if !language
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '+' | '#' | '-' | '_'))
    {
        return Err("Language contains invalid characters".into());
    }
    Ok(())
}

pub fn validate_max_participants(max: usize) -> Result<(), String> {
    if max == 0 {
        return Err("maxParticipants must be at least 1".into());
    }
    if max > MAX_PARTICIPANTS_LIMIT {
        return Err(format!(
            "maxParticipants cannot exceed {}",
            MAX_PARTICIPANTS_LIMIT
        ));
    }
    Ok(())
}

/// Validate a code buffer against the configured byte limit. Empty is allowed.
pub fn validate_code(code: &str, max_len: usize) -> Result<(), String> {
    if code.len() > max_len {
        return Err(format!("Code too long (max {} bytes)", max_len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_ids() {
        assert!(validate_user_id("alice").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("   ").is_err());
        assert!(validate_user_id(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_user_names() {
        assert!(validate_user_name("Alice Sharma").is_ok());
        assert!(validate_user_name("").is_err());
        assert!(validate_user_name(&"n".repeat(65)).is_err());
    }

    #[test]
    fn test_languages() {
        assert!(validate_language("javascript").is_ok());
        assert!(validate_language("c++").is_ok());
        assert!(validate_language("c#").is_ok());
        assert!(validate_language("").is_err());
        assert!(validate_language("rust lang").is_err());
    }

    #[test]
    fn test_max_participants() {
        assert!(validate_max_participants(1).is_ok());
        assert!(validate_max_participants(0).is_err());
        assert!(validate_max_participants(101).is_err());
    }

    #[test]
    fn test_code_length() {
        assert!(validate_code("", 10).is_ok());
        assert!(validate_code("0123456789", 10).is_ok());
        assert!(validate_code("0123456789a", 10).is_err());
    }
}
