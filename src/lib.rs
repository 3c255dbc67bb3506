//! metapool: fixed-effect and random-effects meta-analysis
//!
//! This library pools independent two-arm experiment results (A/B tests,
//! trials) into one statistically defensible combined estimate, together
//! with its uncertainty, a heterogeneity assessment, and a publication-bias
//! diagnostic.
//!
//! The main components of this library are:
//! - `build_summary`: converts a raw two-arm dataset into a `StudySummary`
//! - `MetaAnalysis` / `run_analysis`: fixed-effect and DerSimonian-Laird
//!   random-effects pooling into an `AnalysisResult`
//! - `heterogeneity`: Cochran's Q, degrees of freedom, and I²
//! - `egger_test`: regression diagnostic for small-study/publication bias
//! - `funnel_data`: funnel-plot coordinates for an external plotter
//!
//! The engine is synchronous, stateless between calls, and never performs
//! I/O; every run is a pure function of its summaries and configuration.

mod analysis;
mod bias;
mod config;
mod error;
mod funnel;
mod heterogeneity;
mod math;
mod pool;
mod results;
mod summary;
mod table;

pub use analysis::{run_analysis, MetaAnalysis};
pub use bias::{egger_test, EggerTest};
pub use config::{
    AnalysisConfig, PoolingMethod, EGGER_ALPHA, SE_EPSILON, TAU_DENOMINATOR_FLOOR, Z_95,
};
pub use error::MetaError;
pub use funnel::{funnel_data, FunnelData, FunnelPoint};
pub use heterogeneity::{heterogeneity, Heterogeneity};
pub use pool::{pool, Pooled};
pub use results::AnalysisResult;
pub use summary::{build_summary, classify_treatment, OutcomeKind, StudySummary, TreatmentChoice};
pub use table::{Column, Table, Value};
