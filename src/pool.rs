use crate::{
    config::PoolingMethod,
    error::MetaError,
    heterogeneity::{heterogeneity, inverse_variance_weights, tau_squared},
    math::weighted_mean,
};

/// Output of one pooling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Pooled {
    pub effect: f64,
    pub std_error: f64,
    /// Per-study weights actually used for the pooled estimate.
    pub weights: Vec<f64>,
    /// Between-study variance; 0.0 under the fixed-effect model.
    pub tau_squared: f64,
}

/// Pools per-study effects into one combined estimate.
///
/// Fails with [`MetaError::EmptyInput`] for zero studies. A single study is
/// special-cased to its own effect and standard error with weight 1.0: the
/// variance formulas would otherwise divide by zero degrees of freedom
/// downstream.
///
/// # Panics
///
/// Panics when `effects` and `std_errors` differ in length; the slices must
/// be parallel per-study vectors.
pub fn pool(
    effects: &[f64],
    std_errors: &[f64],
    method: PoolingMethod,
    tau_denominator_floor: f64,
) -> Result<Pooled, MetaError> {
    assert_eq!(
        effects.len(),
        std_errors.len(),
        "effects and std_errors must be the same length"
    );
    match effects.len() {
        0 => Err(MetaError::EmptyInput),
        1 => Ok(Pooled {
            effect: effects[0],
            std_error: std_errors[0],
            weights: vec![1.0],
            tau_squared: 0.0,
        }),
        _ => Ok(match method {
            PoolingMethod::FixedEffect => fixed_effect(effects, std_errors),
            PoolingMethod::RandomEffects => {
                random_effects(effects, std_errors, tau_denominator_floor)
            }
        }),
    }
}

/// Inverse-variance pooling under a single common true effect.
fn fixed_effect(effects: &[f64], std_errors: &[f64]) -> Pooled {
    let weights = inverse_variance_weights(std_errors);
    let (effect, std_error) = pooled_from_weights(effects, &weights);
    Pooled {
        effect,
        std_error,
        weights,
        tau_squared: 0.0,
    }
}

/// DerSimonian-Laird pooling: estimate τ² from Cochran's Q over the fixed
/// weights, then re-weight each study by 1/(SE² + τ²).
///
/// When τ² = 0 the re-weighted estimate is bitwise identical to the
/// fixed-effect one.
fn random_effects(effects: &[f64], std_errors: &[f64], tau_denominator_floor: f64) -> Pooled {
    let fixed_weights = inverse_variance_weights(std_errors);
    let het = heterogeneity(effects, std_errors);
    let tau2 = tau_squared(het.q, het.df, &fixed_weights, tau_denominator_floor);

    let weights: Vec<f64> = std_errors.iter().map(|se| 1.0 / (se * se + tau2)).collect();
    let (effect, std_error) = pooled_from_weights(effects, &weights);
    Pooled {
        effect,
        std_error,
        weights,
        tau_squared: tau2,
    }
}

fn pooled_from_weights(effects: &[f64], weights: &[f64]) -> (f64, f64) {
    let effect = weighted_mean(effects, weights);
    let std_error = (1.0 / weights.iter().sum::<f64>()).sqrt();
    (effect, std_error)
}
