//! In-process job execution bounded to a tenant scope.
//!
//! A pipeline or runner owns one scheduler for its lifetime. Jobs for a
//! tenant outside that scope are refused before they touch any input.

use serde::{Deserialize, Serialize};
use tracing::debug;

use replenish_core::TenantId;

use crate::error::PlanningError;
use crate::job::PlanningJob;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "scope", content = "tenant_id", rename_all = "snake_case")]
pub enum TenantScope {
    /// Shared scheduler (e.g. CLI, tests).
    #[default]
    Any,
    Only(TenantId),
}

impl TenantScope {
    pub fn admits(&self, tenant_id: TenantId) -> bool {
        match self {
            TenantScope::Any => true,
            TenantScope::Only(t) => *t == tenant_id,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct JobScheduler {
    scope: TenantScope,
}

impl JobScheduler {
    pub fn new(scope: TenantScope) -> Self {
        Self { scope }
    }

    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self::new(TenantScope::Only(tenant_id))
    }

    pub fn scope(&self) -> TenantScope {
        self.scope
    }

    pub fn run<J: PlanningJob>(&self, job: &J) -> Result<J::Output, PlanningError> {
        let tenant_id = job.tenant_id();
        if !self.scope.admits(tenant_id) {
            return Err(PlanningError::OutOfScope(tenant_id));
        }
        debug!(job = job.name(), tenant = %tenant_id, "running planning job");
        job.run()
    }
}
