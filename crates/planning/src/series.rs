//! Monthly sales aggregation.
//!
//! Turns raw transaction rows into one 24-month quantity series per SKU,
//! oldest month first. Loss rates scale each row down by its action type and
//! special SKU rules fan demand out to target SKUs.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use replenish_core::{Sku, YearMonth};

use crate::config::PlanningConfig;
use crate::transaction::TransactionRecord;

/// Number of months in every series.
pub const SERIES_MONTHS: usize = 24;

/// One SKU's monthly quantities, oldest first.
pub type Series = [u64; SERIES_MONTHS];

/// The 24 calendar months a run looks at, plus the transaction date range.
///
/// The last month is the calendar month before `report_end_date`'s month.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesWindow {
    start_date: NaiveDate,
    end_date: NaiveDate,
    first_month: YearMonth,
    last_month: YearMonth,
}

impl SalesWindow {
    pub fn from_config(config: &PlanningConfig) -> Self {
        let last_month = YearMonth::from_date(config.report_end_date).previous();
        Self {
            start_date: config.report_start_date,
            end_date: config.report_end_date,
            first_month: last_month.offset(-(SERIES_MONTHS as i32 - 1)),
            last_month,
        }
    }

    pub fn first_month(&self) -> YearMonth {
        self.first_month
    }

    pub fn last_month(&self) -> YearMonth {
        self.last_month
    }

    /// `start <= date < end`.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date < self.end_date
    }

    /// Slot of `month` in a series, or `None` outside the window.
    pub fn index_of(&self, month: YearMonth) -> Option<usize> {
        let idx = self.first_month.months_until(month);
        usize::try_from(idx).ok().filter(|i| *i < SERIES_MONTHS)
    }
}

/// Immutable per-SKU monthly series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthlySeries {
    window: Option<SalesWindow>,
    by_sku: BTreeMap<Sku, Series>,
}

impl MonthlySeries {
    pub fn window(&self) -> Option<&SalesWindow> {
        self.window.as_ref()
    }

    pub fn get(&self, sku: &Sku) -> Option<&Series> {
        self.by_sku.get(sku)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Sku, &Series)> {
        self.by_sku.iter()
    }

    pub fn skus(&self) -> impl Iterator<Item = &Sku> {
        self.by_sku.keys()
    }

    pub fn len(&self) -> usize {
        self.by_sku.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sku.is_empty()
    }
}

/// Build the per-SKU series for `records` under `config`.
///
/// Quantities are truncated toward zero after loss-rate scaling (all inputs
/// are non-negative, so this equals `floor`). A row whose loss rate is `>= 1`
/// contributes nothing.
pub fn aggregate_monthly_sales(records: &[TransactionRecord], config: &PlanningConfig) -> MonthlySeries {
    let window = SalesWindow::from_config(config);

    let by_sku = records
        .iter()
        .filter(|r| window.contains_date(r.order_date))
        .filter_map(|r| {
            let loss_rate = config.loss_rates.for_action(r.action);
            if loss_rate >= 1.0 {
                return None;
            }
            let idx = window.index_of(YearMonth::from_date(r.order_date))?;
            Some((r, idx, 1.0 - loss_rate))
        })
        .flat_map(|(r, idx, ratio)| record_contributions(r, idx, ratio, config))
        .fold(BTreeMap::new(), |mut acc: BTreeMap<Sku, Series>, (sku, idx, qty)| {
            let slot = &mut acc.entry(sku).or_insert([0; SERIES_MONTHS])[idx];
            *slot = slot.saturating_add(qty);
            acc
        });

    tracing::debug!(
        skus = by_sku.len(),
        first_month = %window.first_month(),
        last_month = %window.last_month(),
        "monthly sales series built"
    );

    MonthlySeries {
        window: Some(window),
        by_sku,
    }
}

fn record_contributions<'a>(
    record: &'a TransactionRecord,
    idx: usize,
    effective_ratio: f64,
    config: &'a PlanningConfig,
) -> impl Iterator<Item = (Sku, usize, u64)> + 'a {
    let quantity = f64::from(record.quantity);

    record.active_slots().flat_map(move |(sku, per_unit)| {
        let net = truncate_qty(quantity * f64::from(per_unit) * effective_ratio);

        let special = config
            .special_sku_rules
            .iter()
            .filter(|rule| rule.applies_to(&sku))
            .map(move |rule| {
                let qty = truncate_qty(quantity * f64::from(rule.multiplier) * effective_ratio);
                (rule.target_sku.clone(), idx, qty)
            })
            .collect::<Vec<_>>();

        std::iter::once((sku, idx, net)).chain(special)
    })
}

fn truncate_qty(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}
