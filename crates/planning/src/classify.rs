//! Demand pattern classification.

use serde::{Deserialize, Serialize};

use crate::series::SERIES_MONTHS;
use crate::stats;

/// Fewer selling months than this means the SKU is treated as new.
pub const NEW_MIN_MONTHS_WITH_SALES: usize = 3;
/// Below this share of selling months demand is intermittent.
pub const INTERMITTENT_MAX_COVERAGE: f64 = 0.5;
/// Average monthly demand at or below this is low volume.
pub const LOW_VOLUME_MAX_AVG: f64 = 50.0;

/// Demand pattern of a SKU. Each variant has exactly one forecasting method.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandCategory {
    New,
    Intermittent,
    LowStable,
    HighStable,
}

impl DemandCategory {
    pub const ALL: [DemandCategory; 4] = [
        DemandCategory::New,
        DemandCategory::Intermittent,
        DemandCategory::LowStable,
        DemandCategory::HighStable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DemandCategory::New => "new",
            DemandCategory::Intermittent => "intermittent",
            DemandCategory::LowStable => "low_stable",
            DemandCategory::HighStable => "high_stable",
        }
    }
}

impl core::fmt::Display for DemandCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: DemandCategory,
    pub months_with_sales: usize,
    pub avg_monthly: f64,
    /// Share of months with any sales, in `[0, 1]`.
    pub coverage: f64,
    /// Coefficient of variation (`0` when the average is `0`).
    pub cv: f64,
}

/// Ordered decision table; first match wins.
pub fn categorize(months_with_sales: usize, coverage: f64, avg_monthly: f64) -> DemandCategory {
    if months_with_sales < NEW_MIN_MONTHS_WITH_SALES {
        DemandCategory::New
    } else if coverage < INTERMITTENT_MAX_COVERAGE {
        DemandCategory::Intermittent
    } else if avg_monthly <= LOW_VOLUME_MAX_AVG {
        DemandCategory::LowStable
    } else {
        DemandCategory::HighStable
    }
}

pub fn classify(series: &[u64]) -> Classification {
    let months_with_sales = series.iter().filter(|v| **v > 0).count();
    let coverage = months_with_sales as f64 / SERIES_MONTHS as f64;

    let values = stats::to_f64(series);
    let avg_monthly = stats::mean(&values);
    let std = stats::stddev_population(&values);
    let cv = if avg_monthly > 0.0 { std / avg_monthly } else { 0.0 };

    Classification {
        category: categorize(months_with_sales, coverage, avg_monthly),
        months_with_sales,
        avg_monthly,
        coverage,
        cv,
    }
}
