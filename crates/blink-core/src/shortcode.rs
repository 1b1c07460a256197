use crate::error::ShortenerError;
use std::fmt::Display;

/// A short code identifying a shortened URL.
///
/// Custom slugs must be 3-20 characters long and contain only
/// alphanumeric characters, hyphens, or underscores.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShortCode {
    /// A system-generated short code.
    Generated(String),
    /// A user-provided custom slug.
    Custom(String),
}

pub const MIN_SLUG_LENGTH: usize = 3;
pub const MAX_SLUG_LENGTH: usize = 20;

impl ShortCode {
    /// Wraps the output of a code generator.
    pub fn generated(code: impl Into<String>) -> Self {
        Self::Generated(code.into())
    }

    /// Creates a custom `ShortCode` after validating the input.
    ///
    /// Valid slugs are 3-20 characters and contain only `[a-zA-Z0-9_-]`.
    pub fn new(code: impl Into<String>) -> std::result::Result<Self, ShortenerError> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(Self::Custom(code))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Used for codes taken from a request path or read back from storage,
    /// which are looked up as-is.
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self::Custom(code.into())
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            ShortCode::Generated(s) | ShortCode::Custom(s) => s.as_str(),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ShortCode::Custom(_))
    }

    fn validate(code: &str) -> std::result::Result<(), ShortenerError> {
        if code.is_empty() {
            return Err(ShortenerError::InvalidShortCode(
                "custom slug cannot be empty if provided".to_string(),
            ));
        }

        let length = code.chars().count();
        if !(MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH).contains(&length) {
            return Err(ShortenerError::InvalidShortCode(format!(
                "custom slug must be between {} and {} characters, got {}",
                MIN_SLUG_LENGTH, MAX_SLUG_LENGTH, length
            )));
        }

        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ShortenerError::InvalidShortCode(format!(
                "must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                code
            )));
        }

        Ok(())
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes() {
        assert!(ShortCode::new("abc").is_ok());
        assert!(ShortCode::new("Abc-123_xyz").is_ok());
        assert!(ShortCode::new("a".repeat(20)).is_ok());
    }

    #[test]
    fn too_short() {
        assert!(ShortCode::new("ab").is_err());
    }

    #[test]
    fn empty_is_rejected() {
        let err = ShortCode::new("").unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidShortCode(_)));
    }

    #[test]
    fn too_long() {
        assert!(ShortCode::new("a".repeat(21)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(ShortCode::new("abc def").is_err());
        assert!(ShortCode::new("abc/def").is_err());
        assert!(ShortCode::new("abc!def").is_err());
    }

    #[test]
    fn custom_codes_are_flagged() {
        assert!(ShortCode::new("my-code").unwrap().is_custom());
        assert!(!ShortCode::generated("x7Kp2Q").is_custom());
    }

    #[test]
    fn display_matches_as_str() {
        let code = ShortCode::generated("x7Kp2Q");
        assert_eq!(code.to_string(), "x7Kp2Q");
        assert_eq!(code.as_str(), "x7Kp2Q");
    }

    #[test]
    fn to_url_custom() {
        let code = ShortCode::new("mypage").unwrap();
        assert_eq!(
            code.to_url("http://localhost:3000"),
            "http://localhost:3000/mypage"
        );
        assert_eq!(
            code.to_url("http://localhost:3000/"),
            "http://localhost:3000/mypage"
        );
    }
}
