//! LLM-backed collaborators and their fallbacks
//!
//! The pipeline depends only on these traits. Any error from an advisor is
//! absorbed by [`Advisors`], which logs it and substitutes a fixed fallback,
//! so a dead or misconfigured LLM never fails a submission.

use crate::aggregate::DimensionAverages;
use crate::dimensions::Dimension;
use crate::spider::SpiderChartScores;
use crate::{format_gap, format_score};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor unavailable: {0}")]
    Unavailable(String),

    #[error("advisor request failed: {0}")]
    Request(String),

    #[error("malformed advisor response: {0}")]
    MalformedResponse(String),
}

/// Input for the executive summary
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub company_name: String,
    pub averages: DimensionAverages,
    pub industry: HashMap<Dimension, f64>,
    pub overall_score: Option<f64>,
}

impl SummaryRequest {
    /// One line per scored dimension that has an industry average, e.g.
    /// "- Organization: User 2.5/5.0 vs Industry 2.8/5.0 (Gap: -0.30)"
    pub fn comparison_lines(&self) -> Vec<String> {
        self.averages
            .iter()
            .filter_map(|(dimension, score)| {
                let industry = *self.industry.get(&dimension)?;
                Some(format!(
                    "- {}: User {}/5.0 vs Industry {}/5.0 (Gap: {})",
                    dimension.name(),
                    format_score(score),
                    format_score(industry),
                    format_gap(score - industry)
                ))
            })
            .collect()
    }

    pub fn overall_display(&self) -> String {
        self.overall_score
            .map(format_score)
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// Writes the executive summary paragraph
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn executive_summary(&self, request: &SummaryRequest) -> Result<String, AdvisorError>;
}

/// Writes company-specific barriers and predictions
#[async_trait]
pub trait InsightsProvider: Send + Sync {
    async fn company_insights(
        &self,
        company_name: &str,
        industry: Option<&str>,
    ) -> Result<String, AdvisorError>;
}

/// Reads per-dimension scores back out of a free-text report
#[async_trait]
pub trait ScoreExtractor: Send + Sync {
    async fn extract_scores(&self, markdown: &str) -> Result<SpiderChartScores, AdvisorError>;
}

pub fn fallback_summary(company_name: &str, overall_score: Option<f64>) -> String {
    let overall = overall_score
        .map(format_score)
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "{company} achieved an overall sustainability maturity score of {overall}/5.0. \
         The assessment reveals opportunities for improvement across key dimensions while \
         highlighting areas of strength relative to industry benchmarks. Immediate focus should \
         be placed on the lowest-scoring dimensions to accelerate sustainability maturity. \
         Strategic investments in foundational capabilities will drive long-term competitive \
         advantage. The company is positioned to advance its sustainability journey through \
         targeted action plans.",
        company = company_name,
        overall = overall
    )
}

pub fn fallback_insights(company_name: &str) -> String {
    format!(
        "**Barriers to Sustainability (4 lines):**\n\
         • Limited capital allocation for long-term sustainability investments versus short-term profitability pressures\n\
         • Complex supply chain management and lack of visibility into vendor sustainability practices\n\
         • Regulatory compliance costs and uncertainty around evolving environmental standards\n\
         • Skills gap and need for specialized sustainability expertise across the organization\n\
         \n\
         **Sustainability Journey Predictions:**\n\
         Based on industry trends, {company} will likely increase ESG reporting transparency and set \
         science-based targets within the next 2-3 years. The company will face pressure to accelerate \
         decarbonization efforts and invest in renewable energy solutions. Digital transformation and AI \
         adoption will play a key role in optimizing resource efficiency and reducing environmental impact. \
         Strategic partnerships with sustainability-focused vendors and technology providers will become \
         essential for achieving long-term environmental goals.",
        company = company_name
    )
}

/// Score used for every dimension when extraction fails
pub const FALLBACK_SPIDER_SCORE: u8 = 3;

/// Advisor that is never reachable; every call takes the fallback path
#[derive(Debug, Clone, Default)]
pub struct OfflineAdvisor;

#[async_trait]
impl Summarizer for OfflineAdvisor {
    async fn executive_summary(&self, _request: &SummaryRequest) -> Result<String, AdvisorError> {
        Err(AdvisorError::Unavailable("no LLM configured".to_string()))
    }
}

#[async_trait]
impl InsightsProvider for OfflineAdvisor {
    async fn company_insights(
        &self,
        _company_name: &str,
        _industry: Option<&str>,
    ) -> Result<String, AdvisorError> {
        Err(AdvisorError::Unavailable("no LLM configured".to_string()))
    }
}

#[async_trait]
impl ScoreExtractor for OfflineAdvisor {
    async fn extract_scores(&self, _markdown: &str) -> Result<SpiderChartScores, AdvisorError> {
        Err(AdvisorError::Unavailable("no LLM configured".to_string()))
    }
}

/// The three advisors the pipeline consults
#[derive(Clone)]
pub struct Advisors {
    pub summarizer: Arc<dyn Summarizer>,
    pub insights: Arc<dyn InsightsProvider>,
    pub scorer: Arc<dyn ScoreExtractor>,
}

impl Advisors {
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        insights: Arc<dyn InsightsProvider>,
        scorer: Arc<dyn ScoreExtractor>,
    ) -> Self {
        Self {
            summarizer,
            insights,
            scorer,
        }
    }

    /// All three roles served by one implementation
    pub fn shared<A>(advisor: Arc<A>) -> Self
    where
        A: Summarizer + InsightsProvider + ScoreExtractor + 'static,
    {
        Self {
            summarizer: advisor.clone(),
            insights: advisor.clone(),
            scorer: advisor,
        }
    }

    pub fn offline() -> Self {
        Self::shared(Arc::new(OfflineAdvisor))
    }

    pub async fn summary_or_fallback(&self, request: &SummaryRequest) -> String {
        match self.summarizer.executive_summary(request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(company = %request.company_name, "Executive summary was empty, using fallback");
                fallback_summary(&request.company_name, request.overall_score)
            }
            Err(e) => {
                warn!(company = %request.company_name, "Executive summary failed, using fallback: {}", e);
                fallback_summary(&request.company_name, request.overall_score)
            }
        }
    }

    pub async fn insights_or_fallback(&self, company_name: &str, industry: Option<&str>) -> String {
        match self.insights.company_insights(company_name, industry).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(company = %company_name, "Company insights were empty, using fallback");
                fallback_insights(company_name)
            }
            Err(e) => {
                warn!(company = %company_name, "Company insights failed, using fallback: {}", e);
                fallback_insights(company_name)
            }
        }
    }

    pub async fn scores_or_fallback(&self, markdown: &str) -> SpiderChartScores {
        match self.scorer.extract_scores(markdown).await {
            Ok(scores) => scores,
            Err(e) => {
                warn!("Score extraction failed, using uniform fallback: {}", e);
                SpiderChartScores::uniform(FALLBACK_SPIDER_SCORE)
            }
        }
    }
}
