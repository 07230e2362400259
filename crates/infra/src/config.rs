//! Environment-driven planning configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `REPLENISH_END_DATE` | first day of the current month |
//! | `REPLENISH_START_DATE` | 24 months before the end date |
//! | `REPLENISH_LR_CASE` / `_REQUEST` / `_RETURN` / `_DISPUTE` | 0.6 / 0.5 / 0.3 / 1.0 |
//! | `REPLENISH_LEAD_TIME_MONTHS` | 3.0 |
//! | `REPLENISH_MIN_SAFETY_MONTHS` | 1.0 |
//! | `REPLENISH_DEFAULT_MOQ` | 100 |
//! | `REPLENISH_SPECIAL_RULES` | none (JSON array of rules) |

use core::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, Utc};
use thiserror::Error;
use tracing::warn;

use replenish_planning::{LossRates, PlanningConfig, PlanningError, SpecialSkuRule};

pub const END_DATE: &str = "REPLENISH_END_DATE";
pub const START_DATE: &str = "REPLENISH_START_DATE";
pub const LR_CASE: &str = "REPLENISH_LR_CASE";
pub const LR_REQUEST: &str = "REPLENISH_LR_REQUEST";
pub const LR_RETURN: &str = "REPLENISH_LR_RETURN";
pub const LR_DISPUTE: &str = "REPLENISH_LR_DISPUTE";
pub const LEAD_TIME_MONTHS: &str = "REPLENISH_LEAD_TIME_MONTHS";
pub const MIN_SAFETY_MONTHS: &str = "REPLENISH_MIN_SAFETY_MONTHS";
pub const DEFAULT_MOQ: &str = "REPLENISH_DEFAULT_MOQ";
pub const SPECIAL_RULES: &str = "REPLENISH_SPECIAL_RULES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is not valid: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Rejected(#[from] PlanningError),
}

impl From<ConfigError> for PlanningError {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::Rejected(e) => e,
            invalid @ ConfigError::InvalidValue { .. } => {
                PlanningError::InvalidConfig(invalid.to_string())
            }
        }
    }
}

/// Build the planning config from process environment variables.
pub fn planning_config_from_env() -> Result<PlanningConfig, ConfigError> {
    planning_config_from_lookup(|key| std::env::var(key).ok(), Utc::now().date_naive())
}

/// Build the planning config from an arbitrary key lookup.
///
/// `today` anchors the default report period.
pub fn planning_config_from_lookup<F>(lookup: F, today: NaiveDate) -> Result<PlanningConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let default_end = today.with_day(1).unwrap_or(today);
    let end = parsed(&lookup, END_DATE)?.unwrap_or_else(|| {
        warn!(key = END_DATE, default = %default_end, "not set; using first day of current month");
        default_end
    });

    let default_start = end.checked_sub_months(Months::new(24)).unwrap_or(NaiveDate::MIN);
    let start = parsed(&lookup, START_DATE)?.unwrap_or(default_start);

    let defaults = LossRates::default();
    let loss_rates = LossRates {
        case: parsed(&lookup, LR_CASE)?.unwrap_or(defaults.case),
        request: parsed(&lookup, LR_REQUEST)?.unwrap_or(defaults.request),
        returned: parsed(&lookup, LR_RETURN)?.unwrap_or(defaults.returned),
        dispute: parsed(&lookup, LR_DISPUTE)?.unwrap_or(defaults.dispute),
    };

    let mut config = PlanningConfig::for_period(start, end).with_loss_rates(loss_rates);
    if let Some(months) = parsed(&lookup, LEAD_TIME_MONTHS)? {
        config = config.with_lead_time_months(months);
    }
    if let Some(months) = parsed(&lookup, MIN_SAFETY_MONTHS)? {
        config = config.with_min_safety_months(months);
    }
    if let Some(moq) = parsed(&lookup, DEFAULT_MOQ)? {
        config = config.with_default_moq(moq);
    }

    if let Some(raw) = lookup(SPECIAL_RULES) {
        let rules: Vec<SpecialSkuRule> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidValue {
                key: SPECIAL_RULES,
                value: raw.clone(),
                reason: e.to_string(),
            })?;
        for rule in rules {
            config = config.with_special_rule(rule);
        }
    }

    config.validate()?;
    Ok(config)
}

fn parsed<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<PlanningConfig, ConfigError> {
        let map = env(pairs);
        planning_config_from_lookup(|key| map.get(key).cloned(), date(2024, 7, 18))
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = from_pairs(&[]).unwrap();
        assert_eq!(cfg.report_end_date, date(2024, 7, 1));
        assert_eq!(cfg.report_start_date, date(2022, 7, 1));
        assert_eq!(cfg.loss_rates, LossRates::default());
        assert_eq!(cfg.lead_time_months, 3.0);
        assert_eq!(cfg.default_moq, 100);
        assert!(cfg.special_sku_rules.is_empty());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = from_pairs(&[
            (END_DATE, "2024-01-01"),
            (LR_RETURN, "0.25"),
            (LEAD_TIME_MONTHS, "2"),
            (DEFAULT_MOQ, " 24 "),
            (
                SPECIAL_RULES,
                r#"[{"source_skus":["A","B"],"target_sku":"T","multiplier":2}]"#,
            ),
        ])
        .unwrap();
        assert_eq!(cfg.report_end_date, date(2024, 1, 1));
        assert_eq!(cfg.report_start_date, date(2022, 1, 1));
        assert_eq!(cfg.loss_rates.returned, 0.25);
        assert_eq!(cfg.lead_time_months, 2.0);
        assert_eq!(cfg.default_moq, 24);
        assert_eq!(cfg.special_sku_rules.len(), 1);
        assert_eq!(cfg.special_sku_rules[0].multiplier, 2);
    }

    #[test]
    fn unparseable_value_is_an_error() {
        let err = from_pairs(&[(END_DATE, "July")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: END_DATE, .. }));
    }

    #[test]
    fn semantically_invalid_value_is_rejected() {
        let err = from_pairs(&[(LR_CASE, "1.7")]).unwrap_err();
        assert!(matches!(err, ConfigError::Rejected(PlanningError::InvalidConfig(_))));
    }

    #[test]
    fn config_errors_become_invalid_config() {
        let unparseable = PlanningError::from(from_pairs(&[(END_DATE, "July")]).unwrap_err());
        match unparseable {
            PlanningError::InvalidConfig(msg) => assert!(msg.contains(END_DATE)),
            other => panic!("unexpected {other:?}"),
        }

        let rejected = PlanningError::from(from_pairs(&[(LR_CASE, "1.7")]).unwrap_err());
        assert!(matches!(rejected, PlanningError::InvalidConfig(_)));
    }
}
