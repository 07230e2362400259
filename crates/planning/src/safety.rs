//! Safety stock and target stock level.

use serde::{Deserialize, Serialize};

/// Share of the forecast assumed as monthly volatility when none is known.
pub const DEFAULT_VOLATILITY_SHARE: f64 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockTarget {
    /// `z * sqrt(lead_time) * volatility`.
    pub statistical_safety: f64,
    /// `min_safety_months * forecast`.
    pub floor_safety: f64,
    pub safety_stock: f64,
    /// Lead-time demand plus safety stock.
    pub target_stock: f64,
}

/// Volatility to use for a SKU: the supplied value when positive, otherwise
/// half the forecast.
pub fn effective_volatility(forecast: f64, volatility: Option<f64>) -> f64 {
    match volatility {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => forecast * DEFAULT_VOLATILITY_SHARE,
    }
}

pub fn compute_stock_target(
    forecast: f64,
    volatility: Option<f64>,
    z_score: f64,
    lead_time_months: f64,
    min_safety_months: f64,
) -> StockTarget {
    let volatility = effective_volatility(forecast, volatility);
    let statistical_safety = z_score * lead_time_months.sqrt() * volatility;
    let floor_safety = min_safety_months * forecast;
    let safety_stock = statistical_safety.max(floor_safety);

    StockTarget {
        statistical_safety,
        floor_safety,
        safety_stock,
        target_stock: lead_time_months * forecast + safety_stock,
    }
}
