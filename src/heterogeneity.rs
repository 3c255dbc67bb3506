use derive_new::new;

use crate::math::weighted_mean;

/// Cochran's Q, its degrees of freedom, and the I² percentage.
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct Heterogeneity {
    pub q: f64,
    pub df: usize,
    /// Share of total variation attributable to heterogeneity, in [0, 100).
    pub i_squared: f64,
}

/// Quantifies how much observed variation across studies exceeds what
/// sampling error alone would predict.
///
/// Q is always computed with fixed-effect weights against the fixed-effect
/// pooled value, even when the headline estimate is random-effects. That is
/// the standard convention for this statistic; do not substitute the
/// random-effects mean here.
pub fn heterogeneity(effects: &[f64], std_errors: &[f64]) -> Heterogeneity {
    let k = effects.len();
    if k <= 1 {
        // Q is undefined for a single study; zero by convention.
        return Heterogeneity::new(0.0, 0, 0.0);
    }
    let weights = inverse_variance_weights(std_errors);
    let pooled = weighted_mean(effects, &weights);
    let q = effects
        .iter()
        .zip(weights.iter())
        .map(|(effect, weight)| weight * (effect - pooled).powi(2))
        .sum::<f64>();
    let df = k - 1;
    Heterogeneity::new(q, df, i_squared(q, df as f64))
}

fn i_squared(q: f64, df: f64) -> f64 {
    if q <= df {
        0.0
    } else {
        ((q - df) / q * 100.0).max(0.0)
    }
}

/// DerSimonian-Laird between-study variance estimate.
///
/// τ² = max(0, (Q − df) / C) with C = Σw − Σw²/Σw over the fixed-effect
/// weights. A non-positive C is floored to keep the division finite; the
/// floor is a numerical safety valve, not part of the estimator.
pub fn tau_squared(q: f64, df: usize, weights: &[f64], denominator_floor: f64) -> f64 {
    let sum_w = weights.iter().sum::<f64>();
    let sum_w2 = weights.iter().map(|w| w * w).sum::<f64>();
    let mut c = sum_w - sum_w2 / sum_w;
    if c <= 0.0 {
        tracing::warn!(
            c,
            floor = denominator_floor,
            "non-positive tau-squared denominator, clamping"
        );
        c = denominator_floor;
    }
    ((q - df as f64) / c).max(0.0)
}

pub(crate) fn inverse_variance_weights(std_errors: &[f64]) -> Vec<f64> {
    std_errors.iter().map(|se| 1.0 / (se * se)).collect()
}
