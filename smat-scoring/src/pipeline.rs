//! End-to-end submission processing
//!
//! Order of work for a local submission:
//! averages → comparison chart → spider scores → summary/insights → markdown.
//! Advisor failures are absorbed; only chart rendering can fail the pipeline.

use crate::advisor::{Advisors, SummaryRequest};
use crate::aggregate::{calculate_dimension_averages, Answers, DimensionAverages};
use crate::chart::{ChartError, ChartRenderer, RadarChart};
use crate::maturity::MaturityLevel;
use crate::reference::ReferenceData;
use crate::report::{assemble_report, ReportContext};
use crate::spider::SpiderChartScores;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// One questionnaire submission
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub company_name: String,
    /// Industry used for the insights prompt
    pub industry: Option<String>,
    pub answers: Answers,
}

/// Where the report markdown came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSource {
    Local,
    ExternalFlow,
}

/// Fully processed submission, held per session for display and download
#[derive(Debug, Clone, Serialize)]
pub struct ReportResult {
    pub success: bool,
    pub markdown: String,
    pub dimension_scores: DimensionAverages,
    pub spider_chart_base64: String,
    pub spider_scores: SpiderChartScores,
    pub overall_score: Option<f64>,
    pub maturity_level: Option<MaturityLevel>,
    pub source: ReportSource,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("chart rendering failed: {0}")]
    Chart(#[from] ChartError),
}

pub struct AssessmentPipeline {
    reference: Arc<ReferenceData>,
    advisors: Advisors,
    chart: Arc<dyn ChartRenderer>,
}

impl AssessmentPipeline {
    pub fn new(
        reference: Arc<ReferenceData>,
        advisors: Advisors,
        chart: Arc<dyn ChartRenderer>,
    ) -> Self {
        Self {
            reference,
            advisors,
            chart,
        }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn advisors(&self) -> &Advisors {
        &self.advisors
    }

    /// Score a submission and build the report locally
    pub async fn process(
        &self,
        submission: &Submission,
        assessment_date: NaiveDate,
    ) -> Result<ReportResult, PipelineError> {
        let company = submission.company_name.as_str();
        let averages = calculate_dimension_averages(self.reference.questions(), &submission.answers);
        let industry = self.reference.industry_averages();

        let chart = RadarChart::comparison(&averages, industry, company);
        let image = self.chart.render(&chart)?;

        let spider_scores = SpiderChartScores::from_averages(&averages);
        let overall_score = averages.overall();

        let summary_request = SummaryRequest {
            company_name: company.to_string(),
            averages: averages.clone(),
            industry: industry.clone(),
            overall_score,
        };
        let executive_summary = self.advisors.summary_or_fallback(&summary_request).await;
        let insights = self
            .advisors
            .insights_or_fallback(company, submission.industry.as_deref())
            .await;

        let markdown = assemble_report(&ReportContext {
            company_name: company,
            assessment_date,
            averages: &averages,
            reference: &self.reference,
            executive_summary: &executive_summary,
            insights: &insights,
        });

        info!(
            company = %company,
            answered = submission.answers.len(),
            dimensions = averages.len(),
            overall = ?overall_score,
            "Assessment processed"
        );

        Ok(ReportResult {
            success: true,
            markdown,
            dimension_scores: averages,
            spider_chart_base64: image.to_base64(),
            spider_scores,
            overall_score,
            maturity_level: overall_score.map(MaturityLevel::from_score),
            source: ReportSource::Local,
        })
    }

    /// Wrap markdown produced by an external analysis flow
    ///
    /// Spider scores are read back out of the markdown by the score
    /// extractor and drawn as a single-series chart. Dimension averages and
    /// the overall score still come from the submitted answers.
    pub async fn process_external(
        &self,
        submission: &Submission,
        markdown: String,
    ) -> Result<ReportResult, PipelineError> {
        let company = submission.company_name.as_str();
        let averages = calculate_dimension_averages(self.reference.questions(), &submission.answers);

        let spider_scores = self.advisors.scores_or_fallback(&markdown).await;
        let chart = RadarChart::single(&spider_scores, company);
        let image = self.chart.render(&chart)?;
        let overall_score = averages.overall();

        info!(company = %company, overall = ?overall_score, "External flow report processed");

        Ok(ReportResult {
            success: true,
            markdown,
            dimension_scores: averages,
            spider_chart_base64: image.to_base64(),
            spider_scores,
            overall_score,
            maturity_level: overall_score.map(MaturityLevel::from_score),
            source: ReportSource::ExternalFlow,
        })
    }
}
