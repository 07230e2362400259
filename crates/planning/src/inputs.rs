//! Planning input snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use replenish_core::{Sku, TenantId};

use crate::transaction::TransactionRecord;

/// Supply-chain position of one SKU.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyPosition {
    pub on_hand: i64,
    pub ordered_not_shipped: i64,
    pub in_transit: i64,
}

impl SupplyPosition {
    pub fn new(on_hand: i64, ordered_not_shipped: i64, in_transit: i64) -> Self {
        Self {
            on_hand,
            ordered_not_shipped,
            in_transit,
        }
    }

    /// Everything already owned or on its way.
    pub fn available(&self) -> i64 {
        self.on_hand
            .saturating_add(self.ordered_not_shipped)
            .saturating_add(self.in_transit)
    }
}

/// Everything a planning run reads, loaded up front by the caller.
///
/// Missing per-SKU entries degrade to defaults: cost `0`, empty supply
/// position, the configured default MOQ, forecast-derived volatility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningInputs {
    pub tenant_id: TenantId,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub unit_costs: BTreeMap<Sku, f64>,
    #[serde(default)]
    pub supply: BTreeMap<Sku, SupplyPosition>,
    #[serde(default)]
    pub moqs: BTreeMap<Sku, u64>,
    /// Trailing 12-month demand standard deviation per SKU.
    #[serde(default)]
    pub volatility: BTreeMap<Sku, f64>,
}

impl PlanningInputs {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            transactions: Vec::new(),
            unit_costs: BTreeMap::new(),
            supply: BTreeMap::new(),
            moqs: BTreeMap::new(),
            volatility: BTreeMap::new(),
        }
    }

    pub fn with_transactions(mut self, transactions: Vec<TransactionRecord>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_unit_cost(mut self, sku: Sku, cost: f64) -> Self {
        self.unit_costs.insert(sku, cost);
        self
    }

    pub fn with_supply(mut self, sku: Sku, position: SupplyPosition) -> Self {
        self.supply.insert(sku, position);
        self
    }

    pub fn with_moq(mut self, sku: Sku, moq: u64) -> Self {
        self.moqs.insert(sku, moq);
        self
    }

    pub fn with_volatility(mut self, sku: Sku, volatility: f64) -> Self {
        self.volatility.insert(sku, volatility);
        self
    }

    pub fn unit_cost(&self, sku: &Sku) -> f64 {
        self.unit_costs
            .get(sku)
            .copied()
            .filter(|c| c.is_finite())
            .unwrap_or(0.0)
    }

    pub fn available_stock(&self, sku: &Sku) -> i64 {
        self.supply.get(sku).map(SupplyPosition::available).unwrap_or(0)
    }

    /// Supplier MOQ, or `default_moq` when unknown or zero.
    pub fn moq(&self, sku: &Sku, default_moq: u64) -> u64 {
        self.moqs
            .get(sku)
            .copied()
            .filter(|m| *m > 0)
            .unwrap_or(default_moq)
    }

    pub fn volatility(&self, sku: &Sku) -> Option<f64> {
        self.volatility.get(sku).copied()
    }
}
