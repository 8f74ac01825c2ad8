//! Typed identifier newtypes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque appliance identifier assigned by the vendor cloud ("said").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Said(String);

impl Said {
    /// Wrap a non-empty identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySaid`] when `value` is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::EmptySaid);
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Said {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Said {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Said {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Said> for String {
    fn from(said: Said) -> Self {
        said.0
    }
}

/// Address of a kitchen timer on the appliance.
///
/// Rendered as a two-digit, zero-padded number in attribute keys, so only
/// `1..=99` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TimerId(u8);

impl TimerId {
    /// The timer every appliance exposes.
    pub const FIRST: Self = Self(1);

    /// # Errors
    ///
    /// Returns [`ValidationError::TimerIdOutOfRange`] outside `1..=99`.
    pub fn new(id: u8) -> Result<Self, ValidationError> {
        if (1..=99).contains(&id) {
            Ok(Self(id))
        } else {
            Err(ValidationError::TimerIdOutOfRange(id))
        }
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl TryFrom<u8> for TimerId {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TimerId> for u8 {
    fn from(id: TimerId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_reject_blank_said() {
        assert_eq!(Said::new("  "), Err(ValidationError::EmptySaid));
    }

    #[test]
    fn should_parse_said_from_str() {
        let said: Said = "WPR4XYZ123".parse().unwrap();
        assert_eq!(said.as_str(), "WPR4XYZ123");
        assert_eq!(said.to_string(), "WPR4XYZ123");
    }

    #[test]
    fn should_refuse_empty_said_in_json() {
        let result: Result<Said, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn should_pad_timer_id_to_two_digits() {
        assert_eq!(TimerId::FIRST.to_string(), "01");
        assert_eq!(TimerId::new(12).unwrap().to_string(), "12");
    }

    #[test]
    fn should_reject_timer_id_out_of_range() {
        assert_eq!(TimerId::new(0), Err(ValidationError::TimerIdOutOfRange(0)));
        assert_eq!(
            TimerId::new(100),
            Err(ValidationError::TimerIdOutOfRange(100))
        );
    }

    #[test]
    fn should_default_to_first_timer() {
        assert_eq!(TimerId::default().get(), 1);
    }
}
