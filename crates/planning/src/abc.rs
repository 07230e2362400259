//! ABC (Pareto) classification by forecast sales value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use replenish_core::Sku;

/// Cumulative share of total value up to which SKUs are tier A.
pub const TIER_A_CUMULATIVE: f64 = 0.80;
/// Cumulative share of total value up to which SKUs are tier B.
pub const TIER_B_CUMULATIVE: f64 = 0.95;
/// z-score used for service levels missing from the table.
pub const DEFAULT_Z_SCORE: f64 = 1.28;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbcTier {
    A,
    B,
    C,
}

impl AbcTier {
    /// Target probability of not stocking out.
    pub fn service_level(&self) -> f64 {
        match self {
            AbcTier::A => 0.98,
            AbcTier::B => 0.95,
            AbcTier::C => 0.90,
        }
    }

    fn for_cumulative_share(share: f64) -> Self {
        if share <= TIER_A_CUMULATIVE {
            AbcTier::A
        } else if share <= TIER_B_CUMULATIVE {
            AbcTier::B
        } else {
            AbcTier::C
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcAssignment {
    pub tier: AbcTier,
    pub service_level: f64,
    /// `forecast * unit_cost`.
    pub sales_value: f64,
}

/// z-score for a service level.
pub fn z_score(service_level: f64) -> f64 {
    const TABLE: [(f64, f64); 4] = [(0.98, 2.05), (0.95, 1.65), (0.90, 1.28), (0.85, 1.04)];
    TABLE
        .iter()
        .find(|(level, _)| (level - service_level).abs() < 1e-9)
        .map(|(_, z)| *z)
        .unwrap_or(DEFAULT_Z_SCORE)
}

/// Tier every SKU by its share of the running total of sales value.
///
/// SKUs are ranked by value descending (ties by SKU) and each SKU's tier is
/// decided by the cumulative share including itself. A non-positive grand
/// total puts everything in tier C.
pub fn classify_abc<'a>(
    sales_values: impl IntoIterator<Item = (&'a Sku, f64)>,
) -> BTreeMap<Sku, AbcAssignment> {
    let mut ranked: Vec<(&Sku, f64)> = sales_values.into_iter().collect();
    let total: f64 = ranked.iter().map(|(_, v)| *v).sum();

    if !(total > 0.0) {
        return ranked
            .into_iter()
            .map(|(sku, value)| (sku.clone(), assignment(AbcTier::C, value)))
            .collect();
    }

    ranked.sort_by(|(sa, va), (sb, vb)| vb.total_cmp(va).then_with(|| sa.cmp(sb)));

    ranked
        .into_iter()
        .scan(0.0, |cumulative, (sku, value)| {
            *cumulative += value;
            let tier = AbcTier::for_cumulative_share(*cumulative / total);
            Some((sku.clone(), assignment(tier, value)))
        })
        .collect()
}

fn assignment(tier: AbcTier, sales_value: f64) -> AbcAssignment {
    AbcAssignment {
        tier,
        service_level: tier.service_level(),
        sales_value,
    }
}
