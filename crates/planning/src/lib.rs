//! `replenish-planning`
//!
//! **Responsibility:** demand forecasting and replenishment planning.
//!
//! Pure, deterministic computation over an in-memory input snapshot:
//! - It performs no I/O; callers (infra/workers) load inputs.
//! - It keeps no state between runs; identical inputs give identical plans.
//! - Numeric edge cases resolve to documented fallbacks, never errors.

pub mod abc;
pub mod accuracy;
pub mod classify;
pub mod config;
pub mod error;
pub mod forecast;
pub mod inputs;
pub mod job;
pub mod plan;
pub mod profile;
pub mod replenish;
pub mod safety;
pub mod scheduler;
pub mod series;
pub mod stats;
pub mod transaction;

pub use abc::{AbcAssignment, AbcTier, classify_abc, z_score};
pub use classify::{Classification, DemandCategory, classify};
pub use config::{LossRates, PlanningConfig, SpecialSkuRule};
pub use error::PlanningError;
pub use forecast::{Forecast, forecast_demand};
pub use inputs::{PlanningInputs, SupplyPosition};
pub use job::PlanningJob;
pub use plan::{
    ForecastRow, PlanOutcome, PlanSummary, ReplenishmentPlanJob, ReplenishmentReport,
    ReplenishmentRow, plan_replenishment,
};
pub use profile::{DemandProfile, DemandProfileJob, DemandProfileRow, profile_demand};
pub use replenish::{OrderDecision, Urgency, decide_order};
pub use scheduler::{JobScheduler, TenantScope};
pub use series::{MonthlySeries, SalesWindow, aggregate_monthly_sales};
pub use transaction::{ActionCode, SkuSlot, TransactionRecord};
