//! Raw transaction rows as delivered by the order ledger.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use replenish_core::{DomainError, Sku};

/// Maximum number of SKU slots on one transaction row.
pub const MAX_SLOTS: usize = 10;

/// Action code of a transaction row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionCode {
    /// Regular order.
    #[serde(rename = "NN")]
    Order,
    /// Cancelled order.
    #[serde(rename = "CA")]
    Cancel,
    /// Returned goods.
    #[serde(rename = "RE")]
    Return,
    /// Customer request.
    #[serde(rename = "CR")]
    Request,
    /// Customer service case.
    #[serde(rename = "CC")]
    Case,
    /// Payment dispute.
    #[serde(rename = "PD")]
    Dispute,
}

impl FromStr for ActionCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "NN" => Ok(ActionCode::Order),
            "CA" => Ok(ActionCode::Cancel),
            "RE" => Ok(ActionCode::Return),
            "CR" => Ok(ActionCode::Request),
            "CC" => Ok(ActionCode::Case),
            "PD" => Ok(ActionCode::Dispute),
            other => Err(DomainError::unknown_code("action", other)),
        }
    }
}

/// One `(sku, per-unit quantity)` slot of a transaction row.
///
/// The SKU is kept raw: a blank SKU marks the end of the slot list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuSlot {
    pub sku: String,
    pub per_unit_qty: u32,
}

impl SkuSlot {
    pub fn new(sku: impl Into<String>, per_unit_qty: u32) -> Self {
        Self {
            sku: sku.into(),
            per_unit_qty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub order_date: NaiveDate,
    pub action: ActionCode,
    /// Order-level quantity multiplier applied to every slot.
    pub quantity: u32,
    #[serde(default)]
    pub slots: Vec<SkuSlot>,
}

impl TransactionRecord {
    pub fn new(order_date: NaiveDate, action: ActionCode, quantity: u32) -> Self {
        Self {
            order_date,
            action,
            quantity,
            slots: Vec::new(),
        }
    }

    pub fn with_slot(mut self, sku: impl Into<String>, per_unit_qty: u32) -> Self {
        self.slots.push(SkuSlot::new(sku, per_unit_qty));
        self
    }

    /// Slots up to (not including) the first blank or zero-quantity slot,
    /// capped at [`MAX_SLOTS`].
    pub fn active_slots(&self) -> impl Iterator<Item = (Sku, u32)> + '_ {
        self.slots
            .iter()
            .take(MAX_SLOTS)
            .map_while(|slot| {
                if slot.per_unit_qty == 0 {
                    return None;
                }
                Sku::new(&slot.sku).ok().map(|sku| (sku, slot.per_unit_qty))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TransactionRecord {
        TransactionRecord::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), ActionCode::Order, 2)
    }

    #[test]
    fn blank_slot_terminates_the_list() {
        let rec = record()
            .with_slot("A", 1)
            .with_slot(" ", 3)
            .with_slot("B", 1);
        let skus: Vec<_> = rec.active_slots().map(|(s, _)| s.to_string()).collect();
        assert_eq!(skus, vec!["A"]);
    }

    #[test]
    fn zero_quantity_slot_terminates_the_list() {
        let rec = record().with_slot("A", 1).with_slot("B", 0).with_slot("C", 4);
        assert_eq!(rec.active_slots().count(), 1);
    }

    #[test]
    fn slots_beyond_the_tenth_are_ignored() {
        let mut rec = record();
        for i in 0..12 {
            rec = rec.with_slot(format!("S{i}"), 1);
        }
        assert_eq!(rec.active_slots().count(), MAX_SLOTS);
    }

    #[test]
    fn action_codes_parse_and_serialize() {
        assert_eq!("PD".parse::<ActionCode>().unwrap(), ActionCode::Dispute);
        assert!("XX".parse::<ActionCode>().is_err());
        assert_eq!(serde_json::to_string(&ActionCode::Case).unwrap(), "\"CC\"");
    }
}
