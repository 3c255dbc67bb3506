use derive_new::new;
use serde::Serialize;

use crate::{config::SE_EPSILON, summary::StudySummary};

/// Number of precision steps traced along the pseudo-confidence funnel.
const BOUNDARY_STEPS: usize = 100;

/// One study's position on the funnel plot.
#[derive(Debug, Clone, PartialEq, Serialize, new)]
pub struct FunnelPoint {
    pub study_id: String,
    pub effect: f64,
    /// Precision = 1 / standard error.
    pub precision: f64,
}

/// Funnel-plot coordinates for an external plotting collaborator.
///
/// The crate computes data only; rendering and persistence belong to the
/// caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelData {
    pub points: Vec<FunnelPoint>,
    pub pooled_effect: f64,
    /// (precision, lower, upper) triples tracing pooled ± z / precision
    /// across the observed precision range.
    pub boundary: Vec<(f64, f64, f64)>,
}

/// Lays out one funnel plot: each study at (effect, precision) and the
/// pseudo-confidence funnel around the pooled effect.
pub fn funnel_data(summaries: &[StudySummary], pooled_effect: f64, z_score: f64) -> FunnelData {
    let points: Vec<FunnelPoint> = summaries
        .iter()
        .map(|s| {
            FunnelPoint::new(
                s.study_id.clone(),
                s.effect_size,
                1.0 / s.std_error.max(SE_EPSILON),
            )
        })
        .collect();

    let boundary = match points.iter().map(|p| p.precision).fold(
        None::<(f64, f64)>,
        |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
        },
    ) {
        None => Vec::new(),
        Some((min_precision, max_precision)) => {
            let start = min_precision * 0.9;
            let span = max_precision * 1.1 - start;
            (0..BOUNDARY_STEPS)
                .map(|i| {
                    let precision = start + span * i as f64 / (BOUNDARY_STEPS - 1) as f64;
                    let half_width = z_score / precision;
                    (precision, pooled_effect - half_width, pooled_effect + half_width)
                })
                .collect()
        }
    };

    FunnelData {
        points,
        pooled_effect,
        boundary,
    }
}
