//! Model-level errors: token parse misses and construction validation.

use thiserror::Error;

/// A text token that matched nothing in a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {vocabulary} token: {token:?}")]
pub struct UnknownToken {
    vocabulary: &'static str,
    token: String,
}

impl UnknownToken {
    pub fn new(vocabulary: &'static str, token: impl Into<String>) -> Self {
        Self {
            vocabulary,
            token: token.into(),
        }
    }

    pub fn vocabulary(&self) -> &'static str {
        self.vocabulary
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Construction-time validation failures for value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} exceeds {max} characters (got {len})")]
    TooLong {
        field: &'static str,
        max: usize,
        len: usize,
    },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: i32 },

    #[error("charging profile requires at least one charging schedule")]
    EmptySchedule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_descriptive() {
        let err = ModelError::TooLong {
            field: "idToken",
            max: 36,
            len: 40,
        };
        assert_eq!(err.to_string(), "idToken exceeds 36 characters (got 40)");

        let err = UnknownToken::new("BootReason", "Sideways");
        assert_eq!(err.to_string(), "unknown BootReason token: \"Sideways\"");
    }
}
