//! Planning run configuration.
//!
//! Every field except the report period has a default, so a serialized config
//! only needs to carry what differs from house policy.

use std::collections::BTreeSet;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use replenish_core::Sku;

use crate::error::PlanningError;
use crate::transaction::ActionCode;

pub const DEFAULT_LEAD_TIME_MONTHS: f64 = 3.0;
pub const DEFAULT_MIN_SAFETY_MONTHS: f64 = 1.0;
pub const DEFAULT_MOQ: u64 = 100;

/// Fraction of a transaction's quantity that never turns into consumed
/// inventory, per action type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossRates {
    /// Customer service case (`CC`).
    pub case: f64,
    /// Customer request (`CR`).
    pub request: f64,
    /// Return (`RE`).
    pub returned: f64,
    /// Payment dispute (`PD`).
    pub dispute: f64,
}

impl Default for LossRates {
    fn default() -> Self {
        Self {
            case: 0.6,
            request: 0.5,
            returned: 0.3,
            dispute: 1.0,
        }
    }
}

impl LossRates {
    /// Loss rate applied to a transaction with the given action.
    ///
    /// Cancellations always lose everything; plain orders lose nothing.
    pub fn for_action(&self, action: ActionCode) -> f64 {
        match action {
            ActionCode::Order => 0.0,
            ActionCode::Cancel => 1.0,
            ActionCode::Return => self.returned,
            ActionCode::Case => self.case,
            ActionCode::Request => self.request,
            ActionCode::Dispute => self.dispute,
        }
    }

    fn validate(&self) -> Result<(), PlanningError> {
        for (name, rate) in [
            ("case", self.case),
            ("request", self.request),
            ("returned", self.returned),
            ("dispute", self.dispute),
        ] {
            if !(rate.is_finite() && (0.0..=1.0).contains(&rate)) {
                return Err(PlanningError::invalid_config(format!(
                    "loss rate `{name}` must be within [0, 1] (got {rate})"
                )));
            }
        }
        Ok(())
    }
}

/// Demand on any of `source_skus` also counts as demand on `target_sku`.
///
/// Each matching slot contributes `quantity * multiplier` (after loss-rate
/// adjustment) to the target in the same month, independent of the slot's
/// per-unit quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialSkuRule {
    pub source_skus: BTreeSet<Sku>,
    pub target_sku: Sku,
    pub multiplier: u32,
}

impl SpecialSkuRule {
    pub fn new(
        source_skus: impl IntoIterator<Item = Sku>,
        target_sku: Sku,
        multiplier: u32,
    ) -> Self {
        Self {
            source_skus: source_skus.into_iter().collect(),
            target_sku,
            multiplier,
        }
    }

    pub fn applies_to(&self, sku: &Sku) -> bool {
        self.source_skus.contains(sku)
    }
}

/// Configuration of one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Inclusive start of the transaction period.
    pub report_start_date: NaiveDate,
    /// Exclusive end of the transaction period. The sales window ends with
    /// the calendar month before this date's month.
    pub report_end_date: NaiveDate,
    #[serde(default)]
    pub loss_rates: LossRates,
    #[serde(default)]
    pub special_sku_rules: Vec<SpecialSkuRule>,
    #[serde(default = "default_lead_time_months")]
    pub lead_time_months: f64,
    #[serde(default = "default_min_safety_months")]
    pub min_safety_months: f64,
    /// MOQ used for SKUs without a supplier-specific value.
    #[serde(default = "default_moq")]
    pub default_moq: u64,
}

fn default_lead_time_months() -> f64 {
    DEFAULT_LEAD_TIME_MONTHS
}

fn default_min_safety_months() -> f64 {
    DEFAULT_MIN_SAFETY_MONTHS
}

fn default_moq() -> u64 {
    DEFAULT_MOQ
}

impl PlanningConfig {
    /// Config for an explicit period with every other knob at its default.
    pub fn for_period(report_start_date: NaiveDate, report_end_date: NaiveDate) -> Self {
        Self {
            report_start_date,
            report_end_date,
            loss_rates: LossRates::default(),
            special_sku_rules: Vec::new(),
            lead_time_months: DEFAULT_LEAD_TIME_MONTHS,
            min_safety_months: DEFAULT_MIN_SAFETY_MONTHS,
            default_moq: DEFAULT_MOQ,
        }
    }

    /// Config covering the 24 months before `report_end_date`.
    pub fn ending_on(report_end_date: NaiveDate) -> Self {
        let start = report_end_date
            .checked_sub_months(Months::new(24))
            .unwrap_or(NaiveDate::MIN);
        Self::for_period(start, report_end_date)
    }

    pub fn with_loss_rates(mut self, loss_rates: LossRates) -> Self {
        self.loss_rates = loss_rates;
        self
    }

    pub fn with_special_rule(mut self, rule: SpecialSkuRule) -> Self {
        self.special_sku_rules.push(rule);
        self
    }

    pub fn with_lead_time_months(mut self, months: f64) -> Self {
        self.lead_time_months = months;
        self
    }

    pub fn with_min_safety_months(mut self, months: f64) -> Self {
        self.min_safety_months = months;
        self
    }

    pub fn with_default_moq(mut self, moq: u64) -> Self {
        self.default_moq = moq;
        self
    }

    /// Reject configurations that would make every number in the run
    /// meaningless. Called by jobs before any computation.
    pub fn validate(&self) -> Result<(), PlanningError> {
        if self.report_end_date <= self.report_start_date {
            return Err(PlanningError::invalid_config(format!(
                "report_end_date ({}) must be after report_start_date ({})",
                self.report_end_date, self.report_start_date
            )));
        }

        self.loss_rates.validate()?;

        if !(self.lead_time_months.is_finite() && self.lead_time_months >= 0.0) {
            return Err(PlanningError::invalid_config(format!(
                "lead_time_months must be a finite non-negative number (got {})",
                self.lead_time_months
            )));
        }

        if !(self.min_safety_months.is_finite() && self.min_safety_months >= 0.0) {
            return Err(PlanningError::invalid_config(format!(
                "min_safety_months must be a finite non-negative number (got {})",
                self.min_safety_months
            )));
        }

        if self.default_moq == 0 {
            return Err(PlanningError::invalid_config("default_moq must be positive"));
        }

        for rule in &self.special_sku_rules {
            if rule.source_skus.is_empty() {
                return Err(PlanningError::invalid_config(format!(
                    "special SKU rule for {} has no source SKUs",
                    rule.target_sku
                )));
            }
            if rule.multiplier == 0 {
                return Err(PlanningError::invalid_config(format!(
                    "special SKU rule for {} has a zero multiplier",
                    rule.target_sku
                )));
            }
        }

        Ok(())
    }
}
