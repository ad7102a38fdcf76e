//! smat-scoring - assessment scoring and report pipeline
//!
//! Turns questionnaire answers into a scored report:
//! - `reference`: typed reference data (questions, recommendations, industry averages)
//! - `dimensions`: the ten assessment dimensions and name reconciliation
//! - `aggregate`: per-dimension averages
//! - `maturity`: score to maturity level classification
//! - `spider`: whole-number scores for the spider-chart table
//! - `report`: markdown report assembly
//! - `chart`: radar chart rendering
//! - `advisor`: LLM-backed collaborators and their fallbacks
//! - `pipeline`: end-to-end submission processing

pub mod advisor;
pub mod aggregate;
pub mod chart;
pub mod dimensions;
pub mod maturity;
pub mod pipeline;
pub mod reference;
pub mod report;
pub mod spider;

pub use advisor::{AdvisorError, Advisors, InsightsProvider, ScoreExtractor, Summarizer, SummaryRequest};
pub use aggregate::{calculate_dimension_averages, Answers, DimensionAverages};
pub use chart::{ChartError, ChartImage, ChartRenderer, RadarChart, RasterChartRenderer};
pub use dimensions::{Dimension, DimensionMapper};
pub use maturity::MaturityLevel;
pub use pipeline::{AssessmentPipeline, PipelineError, ReportResult, ReportSource, Submission};
pub use reference::ReferenceData;
pub use spider::SpiderChartScores;

/// Round to two decimals, ties to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Format a score the way the report prints it: at least one decimal,
/// at most two, trailing zeros trimmed ("3.0", "2.5", "4.67")
pub fn format_score(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Signed gap with two decimals ("+0.50", "-1.20", "+0.00")
pub fn format_gap(gap: f64) -> String {
    // -0.00 would otherwise print with a minus sign
    let gap = if round2(gap) == 0.0 { 0.0 } else { gap };
    format!("{:+.2}", gap)
}
