use bon::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    error::MetaError,
    math::{arithmetic_mean, sample_variance},
    table::{select_indices, Column, Table, Value},
};

/// One completed experiment's contribution to the meta-analysis.
///
/// Immutable once built. `effect_size` must be on the same scale across all
/// summaries in a run; the engine checks structure, not semantics. The
/// sample sizes are informational (provenance/audit) and do not enter the
/// pooling formulas.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct StudySummary {
    #[builder(into)]
    pub study_id: String,
    pub effect_size: f64,
    /// Standard error of `effect_size`; must be positive. An exact zero is
    /// clamped to epsilon at analysis time, with a warning.
    pub std_error: f64,
    pub n_treatment: usize,
    pub n_control: usize,
}

/// Outcome scale of a two-arm dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutcomeKind {
    /// Difference of proportions.
    Binary,
    /// Difference of means.
    Continuous,
    /// Classify from the outcome column: numeric with more than two distinct
    /// values is continuous, everything else binary.
    #[default]
    Auto,
}

impl OutcomeKind {
    fn resolve(self, outcome: &Column) -> OutcomeKind {
        match self {
            OutcomeKind::Auto => {
                if outcome.is_numeric() {
                    let distinct = outcome.values.iter().map(Value::label).unique().count();
                    if distinct <= 2 {
                        OutcomeKind::Binary
                    } else {
                        OutcomeKind::Continuous
                    }
                } else {
                    OutcomeKind::Binary
                }
            }
            other => other,
        }
    }
}

/// Lexical allow-list for guessing which arm is the treatment.
const TREATMENT_TOKENS: [&str; 6] = ["t", "treatment", "test", "b", "1", "true"];

/// How the treatment value of a run was chosen, kept for audit.
///
/// Auto-detection is an inherently ambiguous guess; callers needing
/// determinism must supply the value explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum TreatmentChoice {
    /// Supplied by the caller.
    Explicit(Value),
    /// Case-insensitive match against the lexical allow-list
    /// {"t", "treatment", "test", "b", "1", "true"}.
    Detected(Value),
    /// No candidate matched; the second sorted unique value is assumed.
    Fallback(Value),
}

impl TreatmentChoice {
    pub fn value(&self) -> &Value {
        match self {
            TreatmentChoice::Explicit(v)
            | TreatmentChoice::Detected(v)
            | TreatmentChoice::Fallback(v) => v,
        }
    }
}

/// Decides which of the two unique treatment-column values (in sort order)
/// is "treatment".
pub fn classify_treatment(uniques: &[Value; 2], explicit: Option<&Value>) -> TreatmentChoice {
    if let Some(value) = explicit {
        return TreatmentChoice::Explicit(value.clone());
    }
    let detected = uniques
        .iter()
        .find(|v| TREATMENT_TOKENS.contains(&v.label().to_lowercase().as_str()));
    match detected {
        Some(value) => TreatmentChoice::Detected(value.clone()),
        None => TreatmentChoice::Fallback(uniques[1].clone()),
    }
}

/// Builds a [`StudySummary`] from a raw two-arm dataset.
///
/// `treatment_column` must hold exactly two distinct values; `treatment_value`
/// overrides the auto-detection heuristic; `outcome_kind` defaults to
/// [`OutcomeKind::Auto`]. Pure and deterministic given an explicit
/// `treatment_value`.
pub fn build_summary(
    table: &Table,
    study_id: &str,
    treatment_column: &str,
    outcome_column: &str,
    treatment_value: Option<&Value>,
    outcome_kind: OutcomeKind,
) -> Result<StudySummary, MetaError> {
    let treatment = table
        .column(treatment_column)
        .ok_or_else(|| MetaError::schema(treatment_column, "column not found"))?;
    let outcome = table
        .column(outcome_column)
        .ok_or_else(|| MetaError::schema(outcome_column, "column not found"))?;
    if outcome.len() != treatment.len() {
        return Err(MetaError::schema(
            outcome_column,
            format!(
                "length {} does not match treatment column length {}",
                outcome.len(),
                treatment.len()
            ),
        ));
    }

    let uniques: [Value; 2] = treatment.sorted_unique().try_into().map_err(
        |found: Vec<Value>| {
            MetaError::schema(
                treatment_column,
                format!("must have exactly 2 unique values, found {}", found.len()),
            )
        },
    )?;

    let choice = classify_treatment(&uniques, treatment_value);
    if let TreatmentChoice::Fallback(value) = &choice {
        tracing::debug!(
            column = treatment_column,
            treatment = %value,
            "no treatment token matched, assuming second sorted value"
        );
    }
    let treatment_indices = treatment.indices_of(choice.value());
    let control_indices: Vec<usize> = (0..treatment.len())
        .filter(|i| !treatment_indices.contains(i))
        .collect();

    let n_treatment = treatment_indices.len();
    let n_control = control_indices.len();
    if n_treatment < 2 || n_control < 2 {
        return Err(MetaError::InsufficientData {
            n_treatment,
            n_control,
        });
    }

    let (effect_size, std_error) = if outcome_kind.resolve(outcome) == OutcomeKind::Binary {
        binary_effect(outcome, &treatment_indices, &control_indices)
    } else {
        continuous_effect(outcome, &treatment_indices, &control_indices)?
    };

    Ok(StudySummary::builder()
        .study_id(study_id)
        .effect_size(effect_size)
        .std_error(std_error)
        .n_treatment(n_treatment)
        .n_control(n_control)
        .build())
}

/// Difference of proportions with its standard error.
fn binary_effect(outcome: &Column, treatment: &[usize], control: &[usize]) -> (f64, f64) {
    let values = binary_values(outcome);
    let p_t = arithmetic_mean(&select_indices(treatment, &values));
    let p_c = arithmetic_mean(&select_indices(control, &values));
    let n_t = treatment.len() as f64;
    let n_c = control.len() as f64;
    let se = (p_t * (1.0 - p_t) / n_t + p_c * (1.0 - p_c) / n_c).sqrt();
    (p_t - p_c, se)
}

/// Numeric view of a binary outcome column. Numeric columns are used as-is
/// (assumed 0/1); for categorical columns the sorted-last unique value is
/// the positive class.
fn binary_values(outcome: &Column) -> Vec<f64> {
    if outcome.is_numeric() {
        outcome
            .values
            .iter()
            .map(|v| v.as_number().unwrap_or(0.0))
            .collect()
    } else {
        let positive = outcome.sorted_unique().pop();
        outcome
            .values
            .iter()
            .map(|v| if Some(v) == positive.as_ref() { 1.0 } else { 0.0 })
            .collect()
    }
}

/// Difference of means with its standard error (sample variance, n-1).
fn continuous_effect(
    outcome: &Column,
    treatment: &[usize],
    control: &[usize],
) -> Result<(f64, f64), MetaError> {
    if !outcome.is_numeric() {
        return Err(MetaError::schema(
            &outcome.name,
            "must be numeric for a continuous outcome",
        ));
    }
    let values: Vec<f64> = outcome
        .values
        .iter()
        .map(|v| v.as_number().unwrap_or(0.0))
        .collect();
    let t_values = select_indices(treatment, &values);
    let c_values = select_indices(control, &values);
    let effect = arithmetic_mean(&t_values) - arithmetic_mean(&c_values);
    let se = (sample_variance(&t_values) / t_values.len() as f64
        + sample_variance(&c_values) / c_values.len() as f64)
        .sqrt();
    Ok((effect, se))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_arm_table(groups: Vec<Value>, outcomes: Vec<Value>) -> Table {
        Table::new()
            .with_column("group", groups)
            .with_column("outcome", outcomes)
    }

    #[test]
    fn test_classify_treatment_explicit() {
        let uniques = [Value::from("a"), Value::from("b")];
        let choice = classify_treatment(&uniques, Some(&Value::from("a")));
        assert_eq!(choice, TreatmentChoice::Explicit(Value::from("a")));
    }

    #[test]
    fn test_classify_treatment_allow_list() {
        let uniques = [Value::from("a"), Value::from("b")];
        let choice = classify_treatment(&uniques, None);
        assert_eq!(choice, TreatmentChoice::Detected(Value::from("b")));

        let numeric = [Value::from(0.0), Value::from(1.0)];
        let choice = classify_treatment(&numeric, None);
        assert_eq!(choice, TreatmentChoice::Detected(Value::from(1.0)));

        let cased = [Value::from("Control"), Value::from("Treatment")];
        let choice = classify_treatment(&cased, None);
        assert_eq!(choice, TreatmentChoice::Detected(Value::from("Treatment")));
    }

    #[test]
    fn test_classify_treatment_fallback_second_sorted() {
        let uniques = [Value::from("x"), Value::from("y")];
        let choice = classify_treatment(&uniques, None);
        assert_eq!(choice, TreatmentChoice::Fallback(Value::from("y")));
    }

    #[test]
    fn test_continuous_summary() {
        let table = two_arm_table(
            vec![
                Value::from("t"),
                Value::from("t"),
                Value::from("t"),
                Value::from("c"),
                Value::from("c"),
            ],
            vec![
                Value::from(1.0),
                Value::from(2.0),
                Value::from(3.0),
                Value::from(1.0),
                Value::from(3.0),
            ],
        );
        let summary = build_summary(
            &table,
            "study-1",
            "group",
            "outcome",
            None,
            OutcomeKind::Continuous,
        )
        .unwrap();
        assert_eq!(summary.n_treatment, 3);
        assert_eq!(summary.n_control, 2);
        // means 2.0 vs 2.0, variances 1.0 and 2.0
        assert_relative_eq!(summary.effect_size, 0.0);
        assert_relative_eq!(summary.std_error, (1.0 / 3.0 + 2.0 / 2.0f64).sqrt());
    }

    #[test]
    fn test_binary_summary_numeric() {
        let table = two_arm_table(
            vec![
                Value::from("t"),
                Value::from("t"),
                Value::from("t"),
                Value::from("t"),
                Value::from("c"),
                Value::from("c"),
                Value::from("c"),
                Value::from("c"),
            ],
            vec![
                Value::from(1.0),
                Value::from(1.0),
                Value::from(0.0),
                Value::from(1.0),
                Value::from(0.0),
                Value::from(1.0),
                Value::from(0.0),
                Value::from(0.0),
            ],
        );
        let summary =
            build_summary(&table, "study-1", "group", "outcome", None, OutcomeKind::Auto).unwrap();
        assert_relative_eq!(summary.effect_size, 0.5);
        let expected_se = (0.75 * 0.25 / 4.0 + 0.25 * 0.75 / 4.0f64).sqrt();
        assert_relative_eq!(summary.std_error, expected_se);
    }

    #[test]
    fn test_binary_summary_categorical_positive_class() {
        let table = two_arm_table(
            vec![
                Value::from("t"),
                Value::from("t"),
                Value::from("c"),
                Value::from("c"),
            ],
            vec![
                Value::from("yes"),
                Value::from("yes"),
                Value::from("no"),
                Value::from("yes"),
            ],
        );
        let summary =
            build_summary(&table, "study-1", "group", "outcome", None, OutcomeKind::Auto).unwrap();
        // "yes" sorts last and is the positive class: p_t = 1.0, p_c = 0.5
        assert_relative_eq!(summary.effect_size, 0.5);
    }

    #[test]
    fn test_auto_kind_numeric_many_values_is_continuous() {
        let table = two_arm_table(
            vec![
                Value::from("t"),
                Value::from("t"),
                Value::from("c"),
                Value::from("c"),
            ],
            vec![
                Value::from(1.0),
                Value::from(2.5),
                Value::from(3.0),
                Value::from(4.5),
            ],
        );
        let summary =
            build_summary(&table, "study-1", "group", "outcome", None, OutcomeKind::Auto).unwrap();
        // continuous path: difference of means, not proportions
        assert_relative_eq!(summary.effect_size, 1.75 - 3.75);
    }

    #[test]
    fn test_three_groups_is_schema_error() {
        let table = two_arm_table(
            vec![
                Value::from("a"),
                Value::from("a"),
                Value::from("b"),
                Value::from("b"),
                Value::from("c"),
                Value::from("c"),
            ],
            vec![Value::from(1.0); 6],
        );
        let err = build_summary(&table, "s", "group", "outcome", None, OutcomeKind::Auto)
            .unwrap_err();
        assert!(matches!(err, MetaError::Schema { .. }));
        assert!(err.to_string().contains("exactly 2 unique values"));
    }

    #[test]
    fn test_ragged_columns_is_schema_error() {
        let table = two_arm_table(
            vec![
                Value::from("t"),
                Value::from("t"),
                Value::from("c"),
                Value::from("c"),
            ],
            vec![Value::from(1.0), Value::from(2.0)],
        );
        let err = build_summary(&table, "s", "group", "outcome", None, OutcomeKind::Auto)
            .unwrap_err();
        assert_eq!(
            err,
            MetaError::schema("outcome", "length 2 does not match treatment column length 4")
        );
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let table = two_arm_table(vec![Value::from("a")], vec![Value::from(1.0)]);
        let err = build_summary(&table, "s", "arm", "outcome", None, OutcomeKind::Auto)
            .unwrap_err();
        assert_eq!(err, MetaError::schema("arm", "column not found"));
    }

    #[test]
    fn test_small_arm_is_insufficient_data() {
        let table = two_arm_table(
            vec![Value::from("t"), Value::from("c"), Value::from("c")],
            vec![Value::from(1.0), Value::from(2.0), Value::from(3.0)],
        );
        let err = build_summary(&table, "s", "group", "outcome", None, OutcomeKind::Auto)
            .unwrap_err();
        assert_eq!(
            err,
            MetaError::InsufficientData {
                n_treatment: 1,
                n_control: 2
            }
        );
    }

    #[test]
    fn test_non_numeric_continuous_is_schema_error() {
        let table = two_arm_table(
            vec![
                Value::from("t"),
                Value::from("t"),
                Value::from("c"),
                Value::from("c"),
            ],
            vec![
                Value::from("lo"),
                Value::from("hi"),
                Value::from("lo"),
                Value::from("hi"),
            ],
        );
        let err = build_summary(
            &table,
            "s",
            "group",
            "outcome",
            None,
            OutcomeKind::Continuous,
        )
        .unwrap_err();
        assert!(matches!(err, MetaError::Schema { .. }));
    }
}
