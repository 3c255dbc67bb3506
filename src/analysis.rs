use itertools::Itertools;

use crate::{
    bias::egger_test,
    config::{AnalysisConfig, PoolingMethod},
    error::MetaError,
    heterogeneity::heterogeneity,
    pool::pool,
    results::AnalysisResult,
    summary::StudySummary,
};

/// The meta-analysis engine.
///
/// Borrows a set of study summaries and pools them with the configured
/// method. Holds only immutable configuration, so one instance can serve
/// concurrent callers; each [`run`](MetaAnalysis::run) is a pure function of
/// the inputs.
pub struct MetaAnalysis<'a> {
    summaries: &'a [StudySummary],
    method: PoolingMethod,
    config: AnalysisConfig,
}

impl<'a> MetaAnalysis<'a> {
    pub fn new(summaries: &'a [StudySummary], method: PoolingMethod) -> Self {
        Self::with_config(summaries, method, AnalysisConfig::default())
    }

    pub fn with_config(
        summaries: &'a [StudySummary],
        method: PoolingMethod,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            summaries,
            method,
            config,
        }
    }

    /// Run the full analysis:
    /// 1. drop malformed summaries and clamp zero standard errors
    /// 2. pool with the requested method
    /// 3. Cochran's Q / I² heterogeneity
    /// 4. Egger's bias test
    pub fn run(&self) -> Result<AnalysisResult, MetaError> {
        let (effects, std_errors) = self.clean_inputs()?;

        let pooled = pool(
            &effects,
            &std_errors,
            self.method,
            self.config.tau_denominator_floor,
        )?;
        let het = heterogeneity(&effects, &std_errors);
        let egger = egger_test(&effects, &std_errors);

        let half_width = self.config.z_score * pooled.std_error;
        Ok(AnalysisResult {
            pooled_effect: pooled.effect,
            pooled_std_error: pooled.std_error,
            confidence_interval: (pooled.effect - half_width, pooled.effect + half_width),
            tau_squared: pooled.tau_squared,
            q_statistic: het.q,
            degrees_of_freedom: het.df,
            i_squared: het.i_squared,
            egger_intercept: egger.intercept,
            egger_p_value: egger.p_value,
            likely_publication_bias: egger.p_value < self.config.bias_alpha,
        })
    }

    /// Extracts effect/SE vectors, dropping malformed entries and clamping
    /// zero standard errors to epsilon. Every drop and clamp is logged.
    fn clean_inputs(&self) -> Result<(Vec<f64>, Vec<f64>), MetaError> {
        for study_id in self
            .summaries
            .iter()
            .map(|s| s.study_id.as_str())
            .duplicates()
        {
            tracing::warn!(study_id, "duplicate study id within one analysis run");
        }

        let mut effects = Vec::with_capacity(self.summaries.len());
        let mut std_errors = Vec::with_capacity(self.summaries.len());
        for summary in self.summaries {
            if !summary.effect_size.is_finite()
                || !summary.std_error.is_finite()
                || summary.std_error < 0.0
            {
                tracing::warn!(study_id = %summary.study_id, "dropping malformed summary");
                continue;
            }
            let std_error = if summary.std_error == 0.0 {
                tracing::warn!(
                    study_id = %summary.study_id,
                    epsilon = self.config.se_epsilon,
                    "zero standard error clamped"
                );
                self.config.se_epsilon
            } else {
                summary.std_error
            };
            effects.push(summary.effect_size);
            std_errors.push(std_error);
        }
        if effects.is_empty() {
            return Err(MetaError::EmptyInput);
        }
        Ok((effects, std_errors))
    }
}

/// Pools a set of study summaries into one combined result.
///
/// Thin entry point over [`MetaAnalysis`] with default configuration.
pub fn run_analysis(
    summaries: &[StudySummary],
    method: PoolingMethod,
) -> Result<AnalysisResult, MetaError> {
    MetaAnalysis::new(summaries, method).run()
}
