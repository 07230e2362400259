//! Small numeric helpers shared by the forecasting stages.
//!
//! Every helper is total: empty input yields `0.0` instead of `NaN`.

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Population standard deviation (divides by `n`).
pub fn stddev_population(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs
        .iter()
        .map(|x| {
            let d = x - m;
            d * d
        })
        .sum::<f64>()
        / (xs.len() as f64);
    var.sqrt()
}

/// Ordinary least squares fit of `y = slope * x + intercept` over
/// `x = 0..n-1`. Returns `(slope, intercept)`; a flat line through the mean
/// when fewer than two points are given.
pub fn linear_fit(ys: &[f64]) -> (f64, f64) {
    let n = ys.len();
    if n < 2 {
        return (0.0, mean(ys));
    }
    let x_mean = (n as f64 - 1.0) / 2.0;
    let y_mean = mean(ys);

    let (num, den) = ys
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });

    let slope = if den == 0.0 { 0.0 } else { num / den };
    (slope, y_mean - slope * x_mean)
}

/// Round half away from zero to one decimal place.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub fn to_f64(series: &[u64]) -> Vec<f64> {
    series.iter().map(|v| *v as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(stddev_population(&[]), 0.0);
    }

    #[test]
    fn population_stddev() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((stddev_population(&xs) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn linear_fit_recovers_exact_line() {
        let ys: Vec<f64> = (0..10).map(|x| 3.0 * x as f64 + 7.0).collect();
        let (slope, intercept) = linear_fit(&ys);
        assert!((slope - 3.0).abs() < 1e-9);
        assert!((intercept - 7.0).abs() < 1e-9);
    }

    #[test]
    fn linear_fit_of_single_point_is_flat() {
        assert_eq!(linear_fit(&[5.0]), (0.0, 5.0));
    }

    #[test]
    fn round1_is_half_away_from_zero() {
        assert_eq!(round1(1.25), 1.3);
        assert_eq!(round1(2.04), 2.0);
        assert_eq!(round1(0.0), 0.0);
    }
}
