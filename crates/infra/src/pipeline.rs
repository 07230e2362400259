//! Multi-analyzer report pipeline.
//!
//! Each analyzer reads the same input snapshot and produces one section of
//! the report. A failing (or panicking) analyzer is recorded as failed;
//! its siblings still run. Jobs go through the pipeline's scheduler, so a
//! pipeline scoped to one tenant refuses to plan for any other.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use replenish_core::TenantId;
use replenish_planning::{
    DemandProfile, DemandProfileJob, JobScheduler, PlanOutcome, PlanningConfig, PlanningError,
    PlanningInputs, ReplenishmentPlanJob, TenantScope,
};

use crate::source::PlanningDataSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum AnalyzerOutput {
    Replenishment(PlanOutcome),
    DemandProfile(DemandProfile),
}

/// One independent section of a report run.
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(
        &self,
        scheduler: &JobScheduler,
        tenant_id: TenantId,
        config: &PlanningConfig,
        inputs: &PlanningInputs,
    ) -> Result<AnalyzerOutput, PlanningError>;
}

/// Full forecast + reorder plan.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplenishmentAnalyzer;

impl Analyzer for ReplenishmentAnalyzer {
    fn name(&self) -> &'static str {
        "replenishment"
    }

    fn run(
        &self,
        scheduler: &JobScheduler,
        tenant_id: TenantId,
        config: &PlanningConfig,
        inputs: &PlanningInputs,
    ) -> Result<AnalyzerOutput, PlanningError> {
        let job = ReplenishmentPlanJob::new(tenant_id, config.clone(), inputs.clone());
        scheduler.run(&job).map(AnalyzerOutput::Replenishment)
    }
}

/// Demand classification per SKU.
#[derive(Debug, Default, Clone, Copy)]
pub struct DemandProfileAnalyzer;

impl Analyzer for DemandProfileAnalyzer {
    fn name(&self) -> &'static str {
        "demand_profile"
    }

    fn run(
        &self,
        scheduler: &JobScheduler,
        tenant_id: TenantId,
        config: &PlanningConfig,
        inputs: &PlanningInputs,
    ) -> Result<AnalyzerOutput, PlanningError> {
        let job = DemandProfileJob::new(tenant_id, config.clone(), inputs.clone());
        scheduler.run(&job).map(AnalyzerOutput::DemandProfile)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalyzerRecord {
    Completed {
        analyzer: String,
        output: AnalyzerOutput,
    },
    Failed {
        analyzer: String,
        error: String,
    },
}

impl AnalyzerRecord {
    pub fn analyzer(&self) -> &str {
        match self {
            AnalyzerRecord::Completed { analyzer, .. } | AnalyzerRecord::Failed { analyzer, .. } => {
                analyzer
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AnalyzerRecord::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub tenant_id: TenantId,
    /// One record per analyzer, in registration order.
    pub records: Vec<AnalyzerRecord>,
}

impl PipelineReport {
    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_failed()).count()
    }

    pub fn record(&self, analyzer: &str) -> Option<&AnalyzerRecord> {
        self.records.iter().find(|r| r.analyzer() == analyzer)
    }

    pub fn replenishment(&self) -> Option<&PlanOutcome> {
        self.records.iter().find_map(|r| match r {
            AnalyzerRecord::Completed {
                output: AnalyzerOutput::Replenishment(outcome),
                ..
            } => Some(outcome),
            _ => None,
        })
    }
}

#[derive(Default)]
pub struct ReportPipeline {
    analyzers: Vec<Box<dyn Analyzer>>,
    scheduler: JobScheduler,
}

impl core::fmt::Debug for ReportPipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReportPipeline")
            .field("analyzers", &self.analyzer_names())
            .field("scope", &self.scheduler.scope())
            .finish()
    }
}

impl ReportPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replenishment plan followed by the demand profile.
    pub fn standard() -> Self {
        Self::new()
            .with_analyzer(ReplenishmentAnalyzer)
            .with_analyzer(DemandProfileAnalyzer)
    }

    pub fn with_analyzer(mut self, analyzer: impl Analyzer + 'static) -> Self {
        self.analyzers.push(Box::new(analyzer));
        self
    }

    /// Restrict every job this pipeline runs to `scope`.
    pub fn with_scope(mut self, scope: TenantScope) -> Self {
        self.scheduler = JobScheduler::new(scope);
        self
    }

    pub fn scope(&self) -> TenantScope {
        self.scheduler.scope()
    }

    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    /// Run analyzers one after another.
    pub fn run(
        &self,
        tenant_id: TenantId,
        config: &PlanningConfig,
        inputs: &PlanningInputs,
    ) -> PipelineReport {
        let records = self
            .analyzers
            .iter()
            .map(|a| {
                let result = catch_unwind(AssertUnwindSafe(|| {
                    a.run(&self.scheduler, tenant_id, config, inputs)
                }));
                record(tenant_id, a.name(), flatten_panic(result))
            })
            .collect();
        finish(tenant_id, records)
    }

    /// Run analyzers on scoped threads sharing the read-only snapshot.
    pub fn run_concurrent(
        &self,
        tenant_id: TenantId,
        config: &PlanningConfig,
        inputs: &PlanningInputs,
    ) -> PipelineReport {
        let scheduler = &self.scheduler;
        let records = std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .analyzers
                .iter()
                .map(|a| {
                    let handle = scope.spawn(move || a.run(scheduler, tenant_id, config, inputs));
                    (a.name(), handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(name, handle)| record(tenant_id, name, flatten_panic(handle.join())))
                .collect()
        });
        finish(tenant_id, records)
    }

    /// Load inputs from `source`, then run sequentially. A load failure
    /// marks every analyzer as failed.
    pub fn run_from_source<S>(
        &self,
        tenant_id: TenantId,
        config: &PlanningConfig,
        source: &S,
    ) -> PipelineReport
    where
        S: PlanningDataSource + ?Sized,
    {
        match source.load(tenant_id, config) {
            Ok(inputs) => self.run(tenant_id, config, &inputs),
            Err(e) => self.fail_all(tenant_id, PlanningError::Source(e.to_string())),
        }
    }

    /// Same as [`Self::run_from_source`] but runs analyzers concurrently.
    pub fn run_from_source_concurrent<S>(
        &self,
        tenant_id: TenantId,
        config: &PlanningConfig,
        source: &S,
    ) -> PipelineReport
    where
        S: PlanningDataSource + ?Sized,
    {
        match source.load(tenant_id, config) {
            Ok(inputs) => self.run_concurrent(tenant_id, config, &inputs),
            Err(e) => self.fail_all(tenant_id, PlanningError::Source(e.to_string())),
        }
    }

    /// Report in which every analyzer failed with `error`, for failures
    /// that happen before any analyzer can start (rejected config, load).
    pub fn fail_all(&self, tenant_id: TenantId, error: PlanningError) -> PipelineReport {
        let records = self
            .analyzers
            .iter()
            .map(|a| record(tenant_id, a.name(), Err(error.clone())))
            .collect();
        finish(tenant_id, records)
    }
}

fn flatten_panic<T>(
    result: Result<Result<T, PlanningError>, Box<dyn std::any::Any + Send>>,
) -> Result<T, PlanningError> {
    result.unwrap_or_else(|panic| {
        let msg = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(PlanningError::Internal(format!("analyzer panicked: {msg}")))
    })
}

fn record(
    tenant_id: TenantId,
    name: &'static str,
    result: Result<AnalyzerOutput, PlanningError>,
) -> AnalyzerRecord {
    match result {
        Ok(output) => AnalyzerRecord::Completed {
            analyzer: name.to_string(),
            output,
        },
        Err(e) => {
            warn!(analyzer = name, tenant = %tenant_id, error = %e, "analyzer failed");
            AnalyzerRecord::Failed {
                analyzer: name.to_string(),
                error: e.to_string(),
            }
        }
    }
}

fn finish(tenant_id: TenantId, records: Vec<AnalyzerRecord>) -> PipelineReport {
    let report = PipelineReport { tenant_id, records };
    info!(
        tenant = %tenant_id,
        analyzers = report.records.len(),
        failed = report.failed_count(),
        "report pipeline finished"
    );
    report
}
