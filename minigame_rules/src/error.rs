//! Error type for minigame rules and session configuration.

use thiserror::Error;

/// Errors raised while validating configuration or scoring input.
///
/// In-session failures never surface here; a lost minigame is reported as
/// `MinigameResult { success: false }`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RulesError {
    /// Difficulty below 1 or above the allowed maximum.
    #[error("difficulty out of range, got {0}")]
    InvalidDifficulty(i64),

    /// Time limit of zero or less seconds.
    #[error("time limit must be a positive number of seconds, got {0}")]
    InvalidTimeLimit(i64),

    /// Engine type string that names no known minigame.
    #[error("unknown minigame type: {0}")]
    UnknownMinigame(String),

    /// Reference path too short to form a segment.
    #[error("reference path needs at least 2 points, got {points}")]
    DegenerateReferencePath { points: usize },

    /// Tuning document that failed to parse or holds unusable values.
    #[error("invalid minigame configuration: {0}")]
    InvalidConfig(String),

    /// Request payload that failed to decode.
    #[error("invalid minigame request: {0}")]
    InvalidRequest(String),
}

impl RulesError {
    /// Create a configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a request decoding error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Whether the error should prevent a session from being created.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, Self::DegenerateReferencePath { .. })
    }
}

impl From<toml::de::Error> for RulesError {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl From<serde_json::Error> for RulesError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RulesError::InvalidDifficulty(0).to_string(),
            "difficulty out of range, got 0"
        );
        assert_eq!(
            RulesError::DegenerateReferencePath { points: 1 }.to_string(),
            "reference path needs at least 2 points, got 1"
        );
    }

    #[test]
    fn test_configuration_error_classification() {
        assert!(RulesError::InvalidTimeLimit(-5).is_configuration_error());
        assert!(RulesError::UnknownMinigame("Chess".into()).is_configuration_error());
        assert!(!RulesError::DegenerateReferencePath { points: 0 }.is_configuration_error());
    }
}
