use derive_new::new;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::math::ols;

/// Egger regression output.
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct EggerTest {
    /// Estimated regression intercept; far from zero indicates asymmetry.
    pub intercept: f64,
    /// Two-sided p-value for the null hypothesis intercept = 0.
    pub p_value: f64,
}

impl EggerTest {
    /// "No detectable bias" default for runs the regression cannot support
    /// (fewer than 3 studies, or a degenerate design). Callers must treat
    /// this as inconclusive, not as evidence of absence.
    pub fn inconclusive() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Egger's regression test for funnel-plot asymmetry.
///
/// Regresses the standardized effect y = effect/SE on precision x = 1/SE,
/// unweighted (the variable transform already carries the precision
/// weighting). The p-value comes from a Student's t with k − 2 degrees of
/// freedom. Singular designs, such as all standard errors identical, degrade
/// to [`EggerTest::inconclusive`] rather than propagating a numeric failure.
pub fn egger_test(effects: &[f64], std_errors: &[f64]) -> EggerTest {
    if effects.len() < 3 {
        return EggerTest::inconclusive();
    }
    let x: Vec<f64> = std_errors.iter().map(|se| 1.0 / se).collect();
    let y: Vec<f64> = effects
        .iter()
        .zip(std_errors.iter())
        .map(|(effect, se)| effect / se)
        .collect();

    let Some(fit) = ols(&x, &y) else {
        tracing::warn!("singular Egger regression design, reporting inconclusive");
        return EggerTest::inconclusive();
    };
    if fit.intercept_se <= 0.0 {
        tracing::warn!("degenerate Egger fit with zero residual variance, reporting inconclusive");
        return EggerTest::inconclusive();
    }

    let t_statistic = fit.intercept / fit.intercept_se;
    match StudentsT::new(0.0, 1.0, fit.df) {
        Ok(dist) => {
            let p_value = 2.0 * (1.0 - dist.cdf(t_statistic.abs()));
            EggerTest::new(fit.intercept, p_value.clamp(0.0, 1.0))
        }
        Err(_) => EggerTest::inconclusive(),
    }
}
