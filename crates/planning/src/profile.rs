//! Classification-only demand profile (no stock or cost data needed).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use replenish_core::{Sku, TenantId};

use crate::classify::DemandCategory;
use crate::config::PlanningConfig;
use crate::error::PlanningError;
use crate::inputs::PlanningInputs;
use crate::job::PlanningJob;
use crate::plan::analyze_all;
use crate::series::aggregate_monthly_sales;
use crate::stats::round1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandProfileRow {
    pub sku: Sku,
    pub category: DemandCategory,
    pub months_with_sales: usize,
    pub avg_monthly: f64,
    pub coverage: f64,
    pub cv: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandProfile {
    pub tenant_id: TenantId,
    /// Ordered by SKU; empty when the period has no sales.
    pub rows: Vec<DemandProfileRow>,
    pub by_category: BTreeMap<DemandCategory, usize>,
}

pub fn profile_demand(
    inputs: &PlanningInputs,
    config: &PlanningConfig,
) -> Result<DemandProfile, PlanningError> {
    config.validate()?;

    let series = aggregate_monthly_sales(&inputs.transactions, config);
    let rows: Vec<DemandProfileRow> = analyze_all(&series, config)
        .into_iter()
        .map(|a| DemandProfileRow {
            sku: a.sku,
            category: a.classification.category,
            months_with_sales: a.classification.months_with_sales,
            avg_monthly: round1(a.classification.avg_monthly),
            coverage: a.classification.coverage,
            cv: a.classification.cv,
            confidence: a.confidence,
        })
        .collect();

    let by_category = rows.iter().fold(BTreeMap::new(), |mut acc, r| {
        *acc.entry(r.category).or_insert(0) += 1;
        acc
    });

    Ok(DemandProfile {
        tenant_id: inputs.tenant_id,
        rows,
        by_category,
    })
}

#[derive(Debug, Clone)]
pub struct DemandProfileJob {
    tenant_id: TenantId,
    config: PlanningConfig,
    input: PlanningInputs,
}

impl DemandProfileJob {
    pub fn new(tenant_id: TenantId, config: PlanningConfig, input: PlanningInputs) -> Self {
        Self {
            tenant_id,
            config,
            input,
        }
    }
}

impl PlanningJob for DemandProfileJob {
    type Output = DemandProfile;

    fn name(&self) -> &'static str {
        "demand_profile"
    }

    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn run(&self) -> Result<DemandProfile, PlanningError> {
        if self.input.tenant_id != self.tenant_id {
            return Err(PlanningError::invalid_input(
                "tenant_id mismatch between job and planning inputs",
            ));
        }
        profile_demand(&self.input, &self.config)
    }
}
