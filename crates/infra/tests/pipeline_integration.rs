//! End-to-end: in-memory source -> report pipeline -> replenishment rows.

use chrono::NaiveDate;

use replenish_core::{Sku, TenantId, YearMonth};
use replenish_infra::{
    AnalyzerOutput, AnalyzerRecord, InMemoryPlanningDataSource, ReportPipeline,
};
use replenish_planning::{
    AbcTier, ActionCode, DemandCategory, PlanOutcome, PlanningConfig, PlanningInputs,
    SpecialSkuRule, SupplyPosition, TransactionRecord, Urgency,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sku(s: &str) -> Sku {
    Sku::new(s).unwrap()
}

fn config() -> PlanningConfig {
    PlanningConfig::ending_on(date(2024, 7, 1))
}

/// Orders on the 12th of the given window months (0 = 2022-07).
fn orders(name: &str, months: impl IntoIterator<Item = i32>, qty: u32) -> Vec<TransactionRecord> {
    let first = YearMonth::new(2022, 7).unwrap();
    months
        .into_iter()
        .map(|i| {
            let m = first.offset(i);
            TransactionRecord::new(date(m.year(), m.month(), 12), ActionCode::Order, qty)
                .with_slot(name, 1)
        })
        .collect()
}

fn catalogue(tenant: TenantId) -> PlanningInputs {
    let mut tx = Vec::new();
    // High volume, every month.
    tx.extend(orders("HIGH", 0..24, 300));
    // Low volume, every month.
    tx.extend(orders("LOW", 0..24, 20));
    // Sparse: three recent months only.
    tx.extend(orders("SPARSE", [21, 22, 23], 11));
    // Brand new: one month.
    tx.extend(orders("FRESH", [23], 50));
    // Returns of HIGH in the last month lose 30%.
    tx.push(
        TransactionRecord::new(date(2024, 6, 20), ActionCode::Return, 10).with_slot("HIGH", 1),
    );
    // Cancelled order never counts.
    tx.push(TransactionRecord::new(date(2024, 6, 21), ActionCode::Cancel, 999).with_slot("LOW", 1));

    PlanningInputs::new(tenant)
        .with_transactions(tx)
        .with_unit_cost(sku("HIGH"), 10.0)
        .with_unit_cost(sku("LOW"), 60.0)
        .with_unit_cost(sku("SPARSE"), 1.0)
        .with_unit_cost(sku("FRESH"), 1.0)
        .with_supply(sku("LOW"), SupplyPosition::new(500, 0, 0))
        .with_supply(sku("HIGH"), SupplyPosition::new(200, 100, 0))
        .with_moq(sku("HIGH"), 250)
        .with_volatility(sku("HIGH"), 40.0)
}

#[test]
fn standard_pipeline_produces_plan_and_profile() {
    let tenant = TenantId::new();
    let source = InMemoryPlanningDataSource::new();
    source.insert(catalogue(tenant));

    let report = ReportPipeline::standard().run_from_source(tenant, &config(), &source);
    assert_eq!(report.failed_count(), 0);

    let Some(PlanOutcome::Planned(plan)) = report.replenishment() else {
        panic!("expected a plan");
    };

    let category = |name: &str| plan.forecast(&sku(name)).unwrap().category;
    assert_eq!(category("HIGH"), DemandCategory::HighStable);
    assert_eq!(category("LOW"), DemandCategory::LowStable);
    assert_eq!(category("SPARSE"), DemandCategory::Intermittent);
    assert_eq!(category("FRESH"), DemandCategory::New);

    let fresh = plan.forecast(&sku("FRESH")).unwrap();
    assert_eq!(fresh.forecast, 45.0);
    assert_eq!(fresh.method, "new-single-month×0.9");

    // HIGH holds about two thirds of forecast value -> tier A.
    let high = plan.row(&sku("HIGH")).unwrap();
    assert_eq!(high.abc_tier, AbcTier::A);
    assert_eq!(high.moq, 250);
    assert_eq!(high.available_stock, 300);
    assert_eq!(high.suggested_qty % 250, 0);
    assert!(high.suggested_qty > 0);

    // LOW has 500 on hand against a ~80 target.
    let low = plan.row(&sku("LOW")).unwrap();
    assert_eq!(low.urgency, Urgency::NotNeeded);
    assert_eq!(low.note, "sufficient stock");

    // Every safety stock respects the one-month floor.
    for row in &plan.replenishment {
        assert!(row.safety_stock + 0.05 >= row.forecast);
        assert_eq!(row.suggested_qty % row.moq, 0);
    }

    // Sorted by urgency priority.
    let urgencies: Vec<Urgency> = plan.replenishment.iter().map(|r| r.urgency).collect();
    let mut sorted = urgencies.clone();
    sorted.sort();
    assert_eq!(urgencies, sorted);

    match report.record("demand_profile").unwrap() {
        AnalyzerRecord::Completed {
            output: AnalyzerOutput::DemandProfile(profile),
            ..
        } => assert_eq!(profile.rows.len(), 4),
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn sequential_and_concurrent_runs_agree() {
    let tenant = TenantId::new();
    let inputs = catalogue(tenant);
    let pipeline = ReportPipeline::standard();

    assert_eq!(
        pipeline.run(tenant, &config(), &inputs),
        pipeline.run_concurrent(tenant, &config(), &inputs)
    );
}

#[test]
fn special_rule_creates_target_demand() {
    let tenant = TenantId::new();
    let mut tx = orders("KIT-A", 0..24, 30);
    tx.extend(orders("KIT-B", 0..24, 30));
    let inputs = PlanningInputs::new(tenant).with_transactions(tx);
    let cfg = config().with_special_rule(SpecialSkuRule::new(
        [sku("KIT-A"), sku("KIT-B")],
        sku("PART-T"),
        2,
    ));

    let report = ReportPipeline::standard().run(tenant, &cfg, &inputs);
    let plan = report.replenishment().and_then(PlanOutcome::report).unwrap();

    // Each kit order contributes 30 * 2 to the part: 120 per month.
    let part = plan.forecast(&sku("PART-T")).unwrap();
    assert_eq!(part.avg_monthly, 120.0);
    assert_eq!(part.category, DemandCategory::HighStable);
}

#[test]
fn missing_tenant_fails_every_analyzer_without_panicking() {
    let source = InMemoryPlanningDataSource::new();
    let report = ReportPipeline::standard().run_from_source(TenantId::new(), &config(), &source);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.failed_count(), 2);
}

#[test]
fn empty_period_is_no_data_not_failure() {
    let tenant = TenantId::new();
    let source = InMemoryPlanningDataSource::new();
    source.insert(PlanningInputs::new(tenant).with_transactions(orders("OLD", [0], 5)));

    // Period entirely after the only transaction.
    let cfg = PlanningConfig::for_period(date(2024, 1, 1), date(2024, 7, 1));
    let report = ReportPipeline::standard().run_from_source(tenant, &cfg, &source);
    assert_eq!(report.failed_count(), 0);
    assert!(matches!(report.replenishment(), Some(PlanOutcome::NoData { .. })));
}

#[test]
fn report_serializes_to_json() {
    let tenant = TenantId::new();
    let report = ReportPipeline::standard().run(tenant, &config(), &catalogue(tenant));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["records"][0]["status"], "completed");
    assert_eq!(json["records"][0]["output"]["kind"], "replenishment");
    assert_eq!(json["records"][0]["output"]["result"]["status"], "planned");
}
