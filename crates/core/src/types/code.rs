//! One-time verification code sent by the auth service.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`VerificationCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// The code does not have exactly six characters.
    #[error("verification code must be exactly {expected} digits (got {got})")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
        /// Number of characters supplied.
        got: usize,
    },
    /// The code contains something other than ASCII digits.
    #[error("verification code must contain only digits")]
    NonDigit,
}

/// A six-digit verification code.
///
/// Leading zeroes are significant, so the code is kept as a string.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Number of digits in a code.
    pub const LENGTH: usize = 6;

    /// Parse a code typed by the user.
    ///
    /// # Errors
    ///
    /// Returns an error unless the trimmed input is exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, CodeError> {
        let trimmed = s.trim();
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(CodeError::NonDigit);
        }
        let got = trimmed.chars().count();
        if got != Self::LENGTH {
            return Err(CodeError::WrongLength {
                expected: Self::LENGTH,
                got,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Strip everything but digits and keep at most six of them.
    ///
    /// Mirrors what a code input box does while the user types; the result
    /// still has to go through [`VerificationCode::parse`].
    #[must_use]
    pub fn sanitize_input(raw: &str) -> String {
        raw.chars()
            .filter(char::is_ascii_digit)
            .take(Self::LENGTH)
            .collect()
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are credentials; keep them out of logs.
impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode([REDACTED])")
    }
}

impl std::str::FromStr for VerificationCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_leading_zeroes() {
        let code = VerificationCode::parse("012345").unwrap();
        assert_eq!(code.as_str(), "012345");
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(
            VerificationCode::parse("12345"),
            Err(CodeError::WrongLength {
                expected: 6,
                got: 5
            })
        );
        assert!(VerificationCode::parse("1234567").is_err());
        assert!(VerificationCode::parse("").is_err());
    }

    #[test]
    fn test_parse_non_digit() {
        assert_eq!(VerificationCode::parse("12a456"), Err(CodeError::NonDigit));
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(VerificationCode::sanitize_input("12-34 56 78"), "123456");
        assert_eq!(VerificationCode::sanitize_input("abc"), "");
    }

    #[test]
    fn test_debug_is_redacted() {
        let code = VerificationCode::parse("654321").unwrap();
        assert!(!format!("{code:?}").contains("654321"));
    }
}
