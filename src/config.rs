use bon::Builder;

/// Replacement for a standard error of exactly zero.
///
/// This is a safety valve against division by zero, not a statistical
/// correction; the clamp is logged when it fires.
pub const SE_EPSILON: f64 = 1e-6;

/// Floor for the DerSimonian-Laird denominator C = Σw − Σw²/Σw when it is
/// non-positive. Same caveat as [`SE_EPSILON`]: numerical safety, not model.
pub const TAU_DENOMINATOR_FLOOR: f64 = 1e-4;

/// z-score for the default 95% normal-approximation confidence interval.
pub const Z_95: f64 = 1.96;

/// Egger intercept p-values below this threshold flag likely publication
/// bias. Looser than 0.05 on purpose: the test has low power.
pub const EGGER_ALPHA: f64 = 0.10;

/// The two supported pooling models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolingMethod {
    /// One true effect shared by all studies; weights purely by precision.
    FixedEffect,
    /// True effects vary across studies (DerSimonian-Laird); over-confident
    /// outliers are down-weighted and intervals widen.
    RandomEffects,
}

/// Immutable per-engine configuration.
///
/// Set once at construction and never mutated, so an engine holding one can
/// be shared across concurrent callers.
#[derive(Debug, Clone, Copy, Builder)]
pub struct AnalysisConfig {
    #[builder(default = Z_95)]
    pub z_score: f64,
    #[builder(default = SE_EPSILON)]
    pub se_epsilon: f64,
    #[builder(default = TAU_DENOMINATOR_FLOOR)]
    pub tau_denominator_floor: f64,
    #[builder(default = EGGER_ALPHA)]
    pub bias_alpha: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.z_score, Z_95);
        assert_eq!(config.se_epsilon, SE_EPSILON);
        assert_eq!(config.tau_denominator_floor, TAU_DENOMINATOR_FLOOR);
        assert_eq!(config.bias_alpha, EGGER_ALPHA);
    }

    #[test]
    fn test_config_override() {
        let config = AnalysisConfig::builder().z_score(2.576).build();
        assert_eq!(config.z_score, 2.576);
        assert_eq!(config.se_epsilon, SE_EPSILON);
    }
}
