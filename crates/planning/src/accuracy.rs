//! Forecast confidence from a 3-month holdout backtest.

use crate::stats::{mean, round1};

/// Months held out as the test set.
pub const HOLDOUT_MONTHS: usize = 3;
/// Confidence reported when there is too little history to backtest.
pub const NEUTRAL_CONFIDENCE: f64 = 50.0;

/// Confidence score in `[0, 100]`, one decimal.
///
/// Predicts the holdout with a weighted moving average of the training
/// months and scores it by `1 - WMAPE`.
pub fn backtest_confidence(series: &[f64]) -> f64 {
    if series.len() < HOLDOUT_MONTHS + 1 {
        return NEUTRAL_CONFIDENCE;
    }

    let (train, test) = series.split_at(series.len() - HOLDOUT_MONTHS);
    if train.len() < 3 {
        return NEUTRAL_CONFIDENCE;
    }

    let prediction = if train.len() > 3 {
        let (older, recent) = train.split_at(train.len() - 3);
        mean(recent) * 0.6 + mean(older) * 0.4
    } else {
        mean(train)
    };

    let actual_sum: f64 = test.iter().map(|v| v.abs()).sum();
    let error_sum: f64 = test.iter().map(|v| (v - prediction).abs()).sum();

    if actual_sum == 0.0 {
        return if error_sum < 1.0 { 100.0 } else { 0.0 };
    }

    let wmape = error_sum / actual_sum;
    round1(((1.0 - wmape) * 100.0).clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_series_is_neutral() {
        assert_eq!(backtest_confidence(&[1.0, 2.0, 3.0]), 50.0);
        assert_eq!(backtest_confidence(&[5.0, 1.0, 2.0, 3.0, 4.0]), 50.0);
    }

    #[test]
    fn perfectly_flat_history_is_fully_confident() {
        assert_eq!(backtest_confidence(&[40.0; 24]), 100.0);
    }

    #[test]
    fn silent_holdout_after_silent_history_is_fully_confident() {
        assert_eq!(backtest_confidence(&[0.0; 24]), 100.0);
    }

    #[test]
    fn silent_holdout_after_sales_scores_zero() {
        let mut s = vec![30.0; 21];
        s.extend_from_slice(&[0.0, 0.0, 0.0]);
        assert_eq!(backtest_confidence(&s), 0.0);
    }

    #[test]
    fn six_month_series_uses_plain_training_mean() {
        // train = [10, 20, 30] -> prediction 20; test = [20, 25, 15]
        // error = 0 + 5 + 5 = 10, actual = 60 -> wmape 1/6 -> 83.3
        assert_eq!(backtest_confidence(&[10.0, 20.0, 30.0, 20.0, 25.0, 15.0]), 83.3);
    }

    #[test]
    fn wildly_wrong_prediction_is_clamped_at_zero() {
        let mut s = vec![1000.0; 21];
        s.extend_from_slice(&[1.0, 1.0, 1.0]);
        assert_eq!(backtest_confidence(&s), 0.0);
    }
}
