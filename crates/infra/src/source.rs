//! Planning data sources.
//!
//! A source returns everything one planning run reads, already filtered to
//! the configured period. Loading is the only blocking step of a run.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use thiserror::Error;

use replenish_core::TenantId;
use replenish_planning::{PlanningConfig, PlanningInputs};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no planning data for tenant {0}")]
    TenantNotFound(TenantId),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed planning data: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub trait PlanningDataSource: Send + Sync + 'static {
    fn load(&self, tenant_id: TenantId, config: &PlanningConfig) -> Result<PlanningInputs, SourceError>;
}

/// Keep only transactions in `[report_start_date, report_end_date)`.
fn restrict_to_period(mut inputs: PlanningInputs, config: &PlanningConfig) -> PlanningInputs {
    inputs.transactions.retain(|t| {
        config.report_start_date <= t.order_date && t.order_date < config.report_end_date
    });
    inputs
}

/// In-memory source for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPlanningDataSource {
    inner: RwLock<HashMap<TenantId, PlanningInputs>>,
}

impl InMemoryPlanningDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot stored for `inputs.tenant_id`.
    pub fn insert(&self, inputs: PlanningInputs) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert(inputs.tenant_id, inputs);
    }
}

impl PlanningDataSource for InMemoryPlanningDataSource {
    fn load(&self, tenant_id: TenantId, config: &PlanningConfig) -> Result<PlanningInputs, SourceError> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let inputs = map
            .get(&tenant_id)
            .cloned()
            .ok_or(SourceError::TenantNotFound(tenant_id))?;
        Ok(restrict_to_period(inputs, config))
    }
}

/// Reads one serialized [`PlanningInputs`] snapshot from a JSON file on
/// every load.
#[derive(Debug, Clone)]
pub struct JsonFilePlanningDataSource {
    path: PathBuf,
}

impl JsonFilePlanningDataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Tenant recorded in the file.
    pub fn tenant_id(&self) -> Result<TenantId, SourceError> {
        Ok(self.read()?.tenant_id)
    }

    fn read(&self) -> Result<PlanningInputs, SourceError> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl PlanningDataSource for JsonFilePlanningDataSource {
    fn load(&self, tenant_id: TenantId, config: &PlanningConfig) -> Result<PlanningInputs, SourceError> {
        let inputs = self.read()?;
        if inputs.tenant_id != tenant_id {
            return Err(SourceError::TenantNotFound(tenant_id));
        }
        Ok(restrict_to_period(inputs, config))
    }
}
