//! Pipeline gap, MOQ-quantized order quantity and urgency.

use serde::{Deserialize, Serialize};

/// Fractional MOQ multiple at or above which the order rounds up.
pub const MOQ_ROUND_UP_REMAINDER: f64 = 0.33;
/// Months of forecast demand that must reach the MOQ for an order to make sense.
pub const MOQ_VIABILITY_MONTHS: f64 = 6.0;

/// How soon a SKU needs replenishing. Declaration order is priority order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    Critical,
    High,
    Recommended,
    Deferrable,
    NotNeeded,
}

impl Urgency {
    pub const ALL: [Urgency; 5] = [
        Urgency::Critical,
        Urgency::High,
        Urgency::Recommended,
        Urgency::Deferrable,
        Urgency::NotNeeded,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Critical => "critical",
            Urgency::High => "high",
            Urgency::Recommended => "recommended",
            Urgency::Deferrable => "deferrable",
            Urgency::NotNeeded => "not-needed",
        }
    }

    /// Urgency tier for `available / target`.
    pub fn for_stock_ratio(ratio: f64) -> Self {
        if ratio < 0.3 {
            Urgency::Critical
        } else if ratio < 0.6 {
            Urgency::High
        } else if ratio < 0.9 {
            Urgency::Recommended
        } else {
            Urgency::Deferrable
        }
    }
}

impl core::fmt::Display for Urgency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDecision {
    /// `target - available`; positive means short.
    pub gap: f64,
    /// Always a whole multiple of the MOQ.
    pub suggested_qty: u64,
    pub urgency: Urgency,
    pub note: String,
}

impl OrderDecision {
    fn skip(gap: f64, note: &str) -> Self {
        Self {
            gap,
            suggested_qty: 0,
            urgency: Urgency::NotNeeded,
            note: note.to_string(),
        }
    }
}

/// Round a positive gap to whole MOQ multiples.
///
/// Rounds up when the fractional part reaches [`MOQ_ROUND_UP_REMAINDER`],
/// down otherwise. `moq` must be positive.
pub fn round_to_moq(gap: f64, moq: u64) -> u64 {
    let factor = gap / moq as f64;
    if !(factor.is_finite() && factor > 0.0) {
        return 0;
    }
    let remainder = factor - factor.floor();
    let multiples = if remainder >= MOQ_ROUND_UP_REMAINDER {
        factor.ceil()
    } else {
        factor.floor()
    };
    (multiples as u64).saturating_mul(moq)
}

/// Decide what to order for one SKU.
pub fn decide_order(forecast: f64, target_stock: f64, available_stock: f64, moq: u64) -> OrderDecision {
    let gap = target_stock - available_stock;

    if gap <= 0.0 {
        return OrderDecision::skip(gap, "sufficient stock");
    }
    if forecast * MOQ_VIABILITY_MONTHS < moq as f64 {
        return OrderDecision::skip(gap, "volume too low vs MOQ");
    }

    let suggested_qty = round_to_moq(gap, moq);
    if suggested_qty == 0 {
        return OrderDecision::skip(gap, "gap negligible");
    }

    let stock_ratio = if target_stock <= 0.0 {
        1.0
    } else {
        available_stock / target_stock
    };

    OrderDecision {
        gap,
        suggested_qty,
        urgency: Urgency::for_stock_ratio(stock_ratio),
        note: format!(
            "{} x MOQ {moq}; {:.0}% of target available",
            suggested_qty / moq,
            stock_ratio * 100.0
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn moq_rounding_examples() {
        assert_eq!(round_to_moq(250.0, 100), 300);
        assert_eq!(round_to_moq(240.0, 100), 300);
        assert_eq!(round_to_moq(220.0, 100), 200);
        assert_eq!(round_to_moq(300.0, 100), 300);
        assert_eq!(round_to_moq(20.0, 100), 0);
    }

    #[test]
    fn no_gap_means_sufficient_stock() {
        let d = decide_order(100.0, 400.0, 450.0, 100);
        assert_eq!(d.urgency, Urgency::NotNeeded);
        assert_eq!(d.note, "sufficient stock");
        assert_eq!(d.suggested_qty, 0);
        assert_eq!(d.gap, -50.0);
    }

    #[test]
    fn tiny_volume_never_meets_moq() {
        let d = decide_order(10.0, 40.0, 0.0, 100);
        assert_eq!(d.urgency, Urgency::NotNeeded);
        assert_eq!(d.note, "volume too low vs MOQ");
    }

    #[test]
    fn small_gap_rounds_to_nothing() {
        let d = decide_order(100.0, 400.0, 380.0, 100);
        assert_eq!(d.suggested_qty, 0);
        assert_eq!(d.urgency, Urgency::NotNeeded);
        assert_eq!(d.note, "gap negligible");
    }

    #[test]
    fn urgency_follows_stock_ratio() {
        // ratio 0.1 -> critical
        let d = decide_order(100.0, 400.0, 40.0, 100);
        assert_eq!(d.urgency, Urgency::Critical);
        assert_eq!(d.suggested_qty, 400);
        // ratio 0.5 -> high
        assert_eq!(decide_order(100.0, 400.0, 200.0, 100).urgency, Urgency::High);
        // ratio 0.75 -> recommended
        assert_eq!(decide_order(100.0, 400.0, 300.0, 100).urgency, Urgency::Recommended);
        // ratio 0.9 with MOQ 10 -> deferrable
        assert_eq!(decide_order(100.0, 400.0, 360.0, 10).urgency, Urgency::Deferrable);
    }

    #[test]
    fn labels_are_kebab_case() {
        assert_eq!(Urgency::NotNeeded.label(), "not-needed");
        assert_eq!(serde_json::to_string(&Urgency::NotNeeded).unwrap(), "\"not-needed\"");
        assert!(Urgency::Critical < Urgency::High);
    }

    proptest! {
        #[test]
        fn suggestion_is_a_whole_moq_multiple(
            forecast in 0.0f64..5_000.0,
            target in 0.0f64..50_000.0,
            available in -1_000.0f64..50_000.0,
            moq in 1u64..1_000,
        ) {
            let d = decide_order(forecast, target, available, moq);
            prop_assert_eq!(d.suggested_qty % moq, 0);
            if d.suggested_qty == 0 {
                prop_assert_eq!(d.urgency, Urgency::NotNeeded);
            }
        }

        #[test]
        fn exact_multiples_are_kept(k in 0u64..500, moq in 1u64..1_000) {
            prop_assert_eq!(round_to_moq((k * moq) as f64, moq), k * moq);
        }

        #[test]
        fn urgency_is_monotonic_in_stock_ratio(a in -1.0f64..2.0, b in -1.0f64..2.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            // higher ratio never yields a more urgent tier
            prop_assert!(Urgency::for_stock_ratio(hi) >= Urgency::for_stock_ratio(lo));
        }
    }
}
