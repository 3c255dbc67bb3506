pub fn arithmetic_mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// Sample variance with the n-1 denominator.
pub fn sample_variance(x: &[f64]) -> f64 {
    let mean = arithmetic_mean(x);
    x.iter().map(|xi| (xi - mean).powi(2)).sum::<f64>() / (x.len() as f64 - 1.0)
}

pub fn weighted_mean(x: &[f64], weights: &[f64]) -> f64 {
    let sum = x
        .iter()
        .zip(weights.iter())
        .map(|(x, w)| x * w)
        .sum::<f64>();
    let sum_of_weights = weights.iter().sum::<f64>();
    sum / sum_of_weights
}

/// A fitted two-parameter regression y = intercept + slope * x.
#[derive(Debug, Clone, Copy)]
pub struct OlsFit {
    pub intercept: f64,
    pub slope: f64,
    /// Standard error of the intercept estimate.
    pub intercept_se: f64,
    /// Residual degrees of freedom (n - 2).
    pub df: f64,
}

/// Ordinary least squares over paired observations.
///
/// Returns `None` when the fit is unsupported: fewer than 3 points (no
/// residual degrees of freedom) or a singular design (constant x).
pub fn ols(x: &[f64], y: &[f64]) -> Option<OlsFit> {
    let n = x.len();
    if n < 3 || y.len() != n {
        return None;
    }
    let n_f = n as f64;
    let x_mean = arithmetic_mean(x);
    let y_mean = arithmetic_mean(y);

    let sxx = x.iter().map(|xi| (xi - x_mean).powi(2)).sum::<f64>();
    if sxx <= 0.0 || !sxx.is_finite() {
        return None;
    }
    let sxy = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
        .sum::<f64>();

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let rss = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (yi - intercept - slope * xi).powi(2))
        .sum::<f64>();
    let df = n_f - 2.0;
    let residual_variance = rss / df;
    let intercept_se = (residual_variance * (1.0 / n_f + x_mean * x_mean / sxx)).sqrt();
    if !intercept_se.is_finite() {
        return None;
    }

    Some(OlsFit {
        intercept,
        slope,
        intercept_se,
        df,
    })
}
