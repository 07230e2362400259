use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use replenish_core::{Sku, TenantId, YearMonth};
use replenish_planning::{
    ActionCode, PlanningConfig, PlanningInputs, SupplyPosition, TransactionRecord,
    plan_replenishment,
};

/// Synthetic catalogue: every SKU sells on a different rhythm so all four
/// demand categories show up.
fn catalogue(skus: usize) -> PlanningInputs {
    let first = YearMonth::new(2022, 7).unwrap();
    let mut inputs = PlanningInputs::new(TenantId::new());

    for s in 0..skus {
        let name = format!("SKU-{s:05}");
        let sku = Sku::new(&name).unwrap();
        let every = 1 + (s % 4) as i32;
        let qty = 10 + (s % 97) as u32 * 3;

        for m in (0..24).step_by(every as usize) {
            let month = first.offset(m);
            let date = NaiveDate::from_ymd_opt(month.year(), month.month(), 15).unwrap();
            let action = if m % 5 == 0 { ActionCode::Return } else { ActionCode::Order };
            inputs
                .transactions
                .push(TransactionRecord::new(date, action, qty).with_slot(name.clone(), 1));
        }

        inputs = inputs
            .with_unit_cost(sku.clone(), 1.0 + (s % 13) as f64)
            .with_supply(sku, SupplyPosition::new((s % 50) as i64 * 10, 0, 0));
    }
    inputs
}

fn bench_plan(c: &mut Criterion) {
    let config = PlanningConfig::ending_on(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    let mut group = c.benchmark_group("plan_replenishment");

    for skus in [100usize, 1_000, 5_000] {
        let inputs = catalogue(skus);
        group.throughput(Throughput::Elements(skus as u64));
        group.bench_with_input(BenchmarkId::from_parameter(skus), &inputs, |b, inputs| {
            b.iter(|| plan_replenishment(black_box(inputs), black_box(&config)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_plan);
criterion_main!(benches);
