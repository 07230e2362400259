//! Next-period demand forecasting, one method per demand category.

use serde::{Deserialize, Serialize};

use crate::classify::DemandCategory;
use crate::stats::{self, linear_fit, mean, round1};

/// Croston smoothing constant.
pub const CROSTON_ALPHA: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Next-period demand, `>= 0`, rounded to one decimal.
    pub value: f64,
    /// Which method (and branch of it) produced the value.
    pub method: String,
}

impl Forecast {
    fn new(value: f64, method: impl Into<String>) -> Self {
        Self {
            value,
            method: method.into(),
        }
    }
}

/// Forecast `series` (oldest first) with the method bound to `category`.
///
/// `current_month` (1..=12) selects the seasonal factor for high-volume SKUs.
pub fn forecast_demand(category: DemandCategory, series: &[f64], current_month: u32) -> Forecast {
    let raw = match category {
        DemandCategory::New => forecast_new(series),
        DemandCategory::Intermittent => forecast_intermittent(series),
        DemandCategory::LowStable => forecast_low_stable(series),
        DemandCategory::HighStable => forecast_high_stable(series, current_month),
    };
    Forecast::new(round1(raw.value.max(0.0)), raw.method)
}

fn nonzero(series: &[f64]) -> Vec<f64> {
    series.iter().copied().filter(|v| *v > 0.0).collect()
}

/// Too little history for a pattern: lean on whatever months sold.
pub fn forecast_new(series: &[f64]) -> Forecast {
    let nz = nonzero(series);
    match nz.as_slice() {
        [] => Forecast::new(0.0, "no-sales-history"),
        [only] => Forecast::new(only * 0.9, "new-single-month×0.9"),
        [older, newer] => Forecast::new(newer * 0.6 + older * 0.4, "new-two-month-weighted"),
        _ => Forecast::new(mean(&nz), "new-mean"),
    }
}

/// Croston's method: smooth demand size and inter-arrival interval
/// separately, forecast their ratio.
pub fn forecast_intermittent(series: &[f64]) -> Forecast {
    let nz = nonzero(series);
    if nz.len() < 2 {
        return Forecast::new(mean(series), "intermittent-mean-fallback");
    }

    let mut hits = series.iter().enumerate().filter(|(_, v)| **v > 0.0);
    let Some((first_idx, first)) = hits.next() else {
        return Forecast::new(mean(series), "intermittent-mean-fallback");
    };

    let mut demand = *first;
    let mut interval = 1.0;
    let mut last_idx = first_idx;
    for (i, v) in hits {
        let cur_interval = (i - last_idx) as f64;
        demand = CROSTON_ALPHA * v + (1.0 - CROSTON_ALPHA) * demand;
        interval = CROSTON_ALPHA * cur_interval + (1.0 - CROSTON_ALPHA) * interval;
        last_idx = i;
    }

    if interval == 0.0 {
        return Forecast::new(mean(&nz), "intermittent-nonzero-mean");
    }
    Forecast::new(demand / interval, "croston-method")
}

/// Weighted blend of the last quarter and the quarter before, nudged by
/// the direction of change between them.
pub fn forecast_low_stable(series: &[f64]) -> Forecast {
    let n = series.len();
    if n < 3 {
        return Forecast::new(mean(series), "mean-fallback");
    }

    let recent3 = mean(&series[n - 3..]);
    let older3 = if n >= 6 {
        mean(&series[n - 6..n - 3])
    } else {
        mean(&series[..(n - 3).max(1)])
    };
    let base = recent3 * 0.6 + older3 * 0.4;

    if recent3 > older3 * 1.2 {
        Forecast::new(base * 1.05, "weighted-mean+uptrend")
    } else if recent3 < older3 * 0.8 {
        Forecast::new(base * 0.95, "weighted-mean+downtrend")
    } else {
        Forecast::new(base, "weighted-moving-average")
    }
}

/// Linear trend blended with the recent average, scaled by a fixed
/// seasonal profile and floored at half the recent average.
pub fn forecast_high_stable(series: &[f64], current_month: u32) -> Forecast {
    let n = series.len();
    if n < 6 {
        return forecast_low_stable(series);
    }

    let (slope, intercept) = linear_fit(series);
    let trend = intercept + slope * n as f64;
    let factor = seasonal_factor(current_month);
    let recent_avg = stats::mean(&series[n - 3..]);
    let base = trend * 0.5 + recent_avg * 0.5;
    let value = (base * factor).max(recent_avg * 0.5);

    let arrow = if slope > 0.0 {
        '↑'
    } else if slope < 0.0 {
        '↓'
    } else {
        '→'
    };
    Forecast::new(value, format!("linear-trend{arrow}+seasonal×{factor:.2}"))
}

/// Seasonal multiplier for the month after `current_month` (1..=12).
pub fn seasonal_factor(current_month: u32) -> f64 {
    match (current_month % 12) + 1 {
        1 => 0.85,
        2 => 0.80,
        3 => 0.95,
        4 => 1.00,
        5 => 1.00,
        6 => 0.95,
        7 => 0.90,
        8 => 0.90,
        9 => 1.05,
        10 => 1.10,
        11 => 1.20,
        _ => 1.15,
    }
}
