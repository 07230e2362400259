//! Errors raised by domain primitives.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Rejected construction of a domain primitive.
///
/// Only malformed input ends up here. The planning engine resolves its
/// numeric edge cases to fallbacks and never returns these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Blank SKU, unparseable tenant UUID.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid calendar month {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    /// A code outside a closed vocabulary (e.g. transaction action codes).
    #[error("unknown {kind} code `{code}`")]
    UnknownCode { kind: &'static str, code: String },
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unknown_code(kind: &'static str, code: impl Into<String>) -> Self {
        Self::UnknownCode {
            kind,
            code: code.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            DomainError::InvalidMonth { year: 2024, month: 13 }.to_string(),
            "invalid calendar month 2024-13"
        );
        assert_eq!(
            DomainError::unknown_code("action", "XX").to_string(),
            "unknown action code `XX`"
        );
    }
}
