use std::fmt;

use serde::{Deserialize, Serialize};

/// Output of one pooling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub pooled_effect: f64,
    pub pooled_std_error: f64,
    /// Normal-approximation interval: pooled effect ± z · SE.
    pub confidence_interval: (f64, f64),
    /// Between-study variance; 0.0 under the fixed-effect model.
    pub tau_squared: f64,
    pub q_statistic: f64,
    pub degrees_of_freedom: usize,
    /// Percentage of total variation attributable to heterogeneity, [0, 100).
    pub i_squared: f64,
    pub egger_intercept: f64,
    pub egger_p_value: f64,
    /// True when the Egger p-value falls below the bias threshold.
    pub likely_publication_bias: bool,
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "pooled effect\t{:.6} (SE {:.6})",
            self.pooled_effect, self.pooled_std_error
        )?;
        writeln!(
            f,
            "CI\t[{:.6}, {:.6}]",
            self.confidence_interval.0, self.confidence_interval.1
        )?;
        writeln!(f, "tau^2\t{:.6}", self.tau_squared)?;
        writeln!(
            f,
            "Q\t{:.6} (df {})",
            self.q_statistic, self.degrees_of_freedom
        )?;
        writeln!(f, "I^2\t{:.2}%", self.i_squared)?;
        write!(
            f,
            "Egger\tintercept {:.6}, p {:.4}{}",
            self.egger_intercept,
            self.egger_p_value,
            if self.likely_publication_bias {
                " [likely publication bias]"
            } else {
                ""
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            pooled_effect: 0.55,
            pooled_std_error: 0.070710678,
            confidence_interval: (0.411407, 0.688593),
            tau_squared: 0.0,
            q_statistic: 0.5,
            degrees_of_freedom: 1,
            i_squared: 0.0,
            egger_intercept: 0.0,
            egger_p_value: 1.0,
            likely_publication_bias: false,
        }
    }

    #[test]
    fn test_display_report() {
        let report = sample_result().to_string();
        assert!(report.contains("pooled effect\t0.550000"));
        assert!(report.contains("I^2\t0.00%"));
        assert!(!report.contains("likely publication bias"));
    }

    #[test]
    fn test_serde_round_trip() {
        let result = sample_result();
        let json = serde_json::to_string(&result).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }
}
