use thiserror::Error;

use replenish_core::{DomainError, TenantId};

/// Failure of a planning job or analyzer.
///
/// Numeric edge cases (empty series, zero totals, zero targets) never end up
/// here; they resolve to documented fallbacks. Only conditions that make a
/// whole run meaningless are reported.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    #[error("invalid job input: {0}")]
    InvalidInput(String),

    #[error("invalid planning configuration: {0}")]
    InvalidConfig(String),

    #[error("planning data source failed: {0}")]
    Source(String),

    #[error("job for tenant {0} is outside this scheduler's tenant scope")]
    OutOfScope(TenantId),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PlanningError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<DomainError> for PlanningError {
    fn from(value: DomainError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}
