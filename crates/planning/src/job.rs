use replenish_core::TenantId;

use crate::error::PlanningError;

/// A tenant-scoped planning computation over an input snapshot the caller
/// has already loaded.
///
/// `run` must be deterministic for identical inputs.
pub trait PlanningJob: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Short stable label used in logs.
    fn name(&self) -> &'static str;

    fn tenant_id(&self) -> TenantId;

    fn run(&self) -> Result<Self::Output, PlanningError>;
}
