use thiserror::Error;

/// Errors surfaced by the summary builder and the analysis engine.
///
/// Numeric degeneracies (zero standard errors, singular Egger designs,
/// non-positive tau-squared denominators) are deliberately absent from this
/// taxonomy: those are clamped to safe defaults and logged instead of raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetaError {
    /// The input table does not have the shape the summary builder needs.
    #[error("schema error in column '{column}': {reason}")]
    Schema { column: String, reason: String },

    /// One of the two arms has too few observations to estimate a variance.
    #[error("insufficient data: {n_treatment} treatment and {n_control} control observations (need at least 2 per arm)")]
    InsufficientData {
        n_treatment: usize,
        n_control: usize,
    },

    /// No valid study summaries were left to analyze.
    #[error("no valid study summaries to analyze")]
    EmptyInput,
}

impl MetaError {
    pub(crate) fn schema(column: &str, reason: impl Into<String>) -> Self {
        Self::Schema {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}
