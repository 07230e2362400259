//! Replenishment planning job: series → classification → forecast →
//! confidence → ABC → safety/target → order decision.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use replenish_core::{Sku, TenantId, YearMonth};

use crate::abc::{AbcTier, classify_abc, z_score};
use crate::accuracy::backtest_confidence;
use crate::classify::{Classification, DemandCategory, classify};
use crate::config::PlanningConfig;
use crate::error::PlanningError;
use crate::forecast::{Forecast, forecast_demand};
use crate::inputs::PlanningInputs;
use crate::job::PlanningJob;
use crate::replenish::{Urgency, decide_order};
use crate::safety::compute_stock_target;
use crate::series::{MonthlySeries, SalesWindow, Series, aggregate_monthly_sales};
use crate::stats::{self, round1};

/// One SKU's forecast, with the demand metrics behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub sku: Sku,
    pub category: DemandCategory,
    pub months_with_sales: usize,
    pub avg_monthly: f64,
    pub coverage: f64,
    pub cv: f64,
    /// Mean of the last three months.
    pub recent_avg: f64,
    pub forecast: f64,
    pub method: String,
    /// 0..=100.
    pub confidence: f64,
}

/// One SKU's reorder recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentRow {
    pub sku: Sku,
    pub abc_tier: AbcTier,
    pub service_level: f64,
    pub forecast: f64,
    pub unit_cost: f64,
    pub safety_stock: f64,
    pub target_stock: f64,
    pub available_stock: i64,
    pub gap: f64,
    pub moq: u64,
    pub suggested_qty: u64,
    pub urgency: Urgency,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub sku_count: usize,
    pub by_category: BTreeMap<DemandCategory, usize>,
    pub by_urgency: BTreeMap<Urgency, usize>,
    pub total_suggested_qty: u64,
    /// `Σ suggested_qty * unit_cost`.
    pub total_suggested_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentReport {
    pub tenant_id: TenantId,
    pub first_month: YearMonth,
    pub last_month: YearMonth,
    /// Ordered by SKU.
    pub forecasts: Vec<ForecastRow>,
    /// Ordered by urgency, then suggested quantity descending, then SKU.
    pub replenishment: Vec<ReplenishmentRow>,
    pub summary: PlanSummary,
}

impl ReplenishmentReport {
    pub fn row(&self, sku: &Sku) -> Option<&ReplenishmentRow> {
        self.replenishment.iter().find(|r| &r.sku == sku)
    }

    pub fn forecast(&self, sku: &Sku) -> Option<&ForecastRow> {
        self.forecasts.iter().find(|r| &r.sku == sku)
    }
}

/// Result of a planning run. An empty period is a result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanOutcome {
    NoData { reason: String },
    Planned(ReplenishmentReport),
}

impl PlanOutcome {
    pub fn report(&self) -> Option<&ReplenishmentReport> {
        match self {
            PlanOutcome::Planned(r) => Some(r),
            PlanOutcome::NoData { .. } => None,
        }
    }
}

/// Per-SKU results that do not depend on any other SKU.
#[derive(Debug, Clone)]
pub(crate) struct SkuAnalysis {
    pub sku: Sku,
    pub classification: Classification,
    pub forecast: Forecast,
    pub confidence: f64,
    pub recent_avg: f64,
}

pub(crate) fn analyze_sku(sku: &Sku, series: &Series, current_month: u32) -> SkuAnalysis {
    let classification = classify(series);
    let values = stats::to_f64(series);
    let forecast = forecast_demand(classification.category, &values, current_month);
    let recent_avg = stats::mean(&values[values.len().saturating_sub(3)..]);

    SkuAnalysis {
        sku: sku.clone(),
        confidence: backtest_confidence(&values),
        classification,
        forecast,
        recent_avg,
    }
}

pub(crate) fn no_data_reason(config: &PlanningConfig) -> String {
    format!(
        "no sales transactions between {} and {}",
        config.report_start_date, config.report_end_date
    )
}

/// Run the whole plan for one input snapshot.
pub fn plan_replenishment(
    inputs: &PlanningInputs,
    config: &PlanningConfig,
) -> Result<PlanOutcome, PlanningError> {
    config.validate()?;

    let series = aggregate_monthly_sales(&inputs.transactions, config);
    let window = SalesWindow::from_config(config);
    if series.is_empty() {
        info!(tenant = %inputs.tenant_id, "no sales data for planning period");
        return Ok(PlanOutcome::NoData {
            reason: no_data_reason(config),
        });
    }

    let analyses = analyze_all(&series, config);
    debug!(tenant = %inputs.tenant_id, skus = analyses.len(), "skus classified and forecast");

    let abc = classify_abc(
        analyses
            .iter()
            .map(|a| (&a.sku, a.forecast.value * inputs.unit_cost(&a.sku))),
    );

    let mut replenishment: Vec<ReplenishmentRow> = analyses
        .iter()
        .map(|a| {
            let tier = abc.get(&a.sku).map(|x| x.tier).unwrap_or(AbcTier::C);
            replenishment_row(a, tier, inputs, config)
        })
        .collect();
    sort_by_priority(&mut replenishment);

    let forecasts: Vec<ForecastRow> = analyses.iter().map(forecast_row).collect();
    let summary = summarize(&analyses, &replenishment);

    info!(
        tenant = %inputs.tenant_id,
        skus = summary.sku_count,
        critical = summary.by_urgency.get(&Urgency::Critical).copied().unwrap_or(0),
        total_suggested_qty = summary.total_suggested_qty,
        "replenishment plan computed"
    );

    Ok(PlanOutcome::Planned(ReplenishmentReport {
        tenant_id: inputs.tenant_id,
        first_month: window.first_month(),
        last_month: window.last_month(),
        forecasts,
        replenishment,
        summary,
    }))
}

pub(crate) fn analyze_all(series: &MonthlySeries, config: &PlanningConfig) -> Vec<SkuAnalysis> {
    let current_month = config.report_end_date.month();
    series
        .iter()
        .map(|(sku, s)| analyze_sku(sku, s, current_month))
        .collect()
}

fn replenishment_row(
    analysis: &SkuAnalysis,
    tier: AbcTier,
    inputs: &PlanningInputs,
    config: &PlanningConfig,
) -> ReplenishmentRow {
    let sku = &analysis.sku;
    let forecast = analysis.forecast.value;
    let service_level = tier.service_level();

    let target = compute_stock_target(
        forecast,
        inputs.volatility(sku),
        z_score(service_level),
        config.lead_time_months,
        config.min_safety_months,
    );
    let available_stock = inputs.available_stock(sku);
    let moq = inputs.moq(sku, config.default_moq);
    let decision = decide_order(forecast, target.target_stock, available_stock as f64, moq);

    ReplenishmentRow {
        sku: sku.clone(),
        abc_tier: tier,
        service_level,
        forecast,
        unit_cost: inputs.unit_cost(sku),
        safety_stock: round1(target.safety_stock),
        target_stock: round1(target.target_stock),
        available_stock,
        gap: round1(decision.gap),
        moq,
        suggested_qty: decision.suggested_qty,
        urgency: decision.urgency,
        note: decision.note,
    }
}

fn forecast_row(analysis: &SkuAnalysis) -> ForecastRow {
    let c = &analysis.classification;
    ForecastRow {
        sku: analysis.sku.clone(),
        category: c.category,
        months_with_sales: c.months_with_sales,
        avg_monthly: round1(c.avg_monthly),
        coverage: (c.coverage * 1000.0).round() / 1000.0,
        cv: (c.cv * 1000.0).round() / 1000.0,
        recent_avg: round1(analysis.recent_avg),
        forecast: analysis.forecast.value,
        method: analysis.forecast.method.clone(),
        confidence: analysis.confidence,
    }
}

/// Most urgent first; larger orders first within a tier.
pub fn sort_by_priority(rows: &mut [ReplenishmentRow]) {
    rows.sort_by(|a, b| {
        a.urgency
            .cmp(&b.urgency)
            .then_with(|| b.suggested_qty.cmp(&a.suggested_qty))
            .then_with(|| a.sku.cmp(&b.sku))
    });
}

fn summarize(analyses: &[SkuAnalysis], rows: &[ReplenishmentRow]) -> PlanSummary {
    let mut summary = PlanSummary {
        sku_count: rows.len(),
        ..PlanSummary::default()
    };
    for a in analyses {
        *summary.by_category.entry(a.classification.category).or_insert(0) += 1;
    }
    for r in rows {
        *summary.by_urgency.entry(r.urgency).or_insert(0) += 1;
        summary.total_suggested_qty += r.suggested_qty;
        summary.total_suggested_value += r.suggested_qty as f64 * r.unit_cost;
    }
    summary
}

/// Planning job over one tenant's input snapshot.
#[derive(Debug, Clone)]
pub struct ReplenishmentPlanJob {
    tenant_id: TenantId,
    config: PlanningConfig,
    input: PlanningInputs,
}

impl ReplenishmentPlanJob {
    pub fn new(tenant_id: TenantId, config: PlanningConfig, input: PlanningInputs) -> Self {
        Self {
            tenant_id,
            config,
            input,
        }
    }
}

impl PlanningJob for ReplenishmentPlanJob {
    type Output = PlanOutcome;

    fn name(&self) -> &'static str {
        "replenishment_plan"
    }

    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn run(&self) -> Result<PlanOutcome, PlanningError> {
        if self.input.tenant_id != self.tenant_id {
            return Err(PlanningError::invalid_input(
                "tenant_id mismatch between job and planning inputs",
            ));
        }
        plan_replenishment(&self.input, &self.config)
    }
}
