//! LLM-backed implementations of the scoring advisors

use super::llm::{ChatRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use smat_common::config::LlmConfig;
use smat_scoring::advisor::{
    AdvisorError, InsightsProvider, ScoreExtractor, Summarizer, SummaryRequest,
};
use smat_scoring::SpiderChartScores;
use std::sync::Arc;
use tracing::debug;

const SUMMARY_SYSTEM: &str = "You are an expert sustainability consultant creating executive \
summaries for corporate sustainability assessments. Be concise, insightful, and actionable.";

const INSIGHTS_SYSTEM: &str = "You are an expert sustainability analyst. Provide comprehensive, \
current analysis of companies' sustainability practices, challenges, and industry context.";

const EXTRACTION_SYSTEM: &str = "You are an expert sustainability analyst. Extract precise \
numerical scores from sustainability assessment reports.";

impl From<LlmError> for AdvisorError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey => AdvisorError::Unavailable("no API key configured".to_string()),
            LlmError::Response(msg) => AdvisorError::MalformedResponse(msg),
            other => AdvisorError::Request(other.to_string()),
        }
    }
}

/// Answers all three advisor roles through one [`LlmProvider`]
pub struct LlmAdvisor {
    provider: Arc<dyn LlmProvider>,
    summary_model: String,
    insights_model: String,
    extraction_model: String,
}

impl LlmAdvisor {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            summary_model: config.summary_model.clone(),
            insights_model: config.insights_model.clone(),
            extraction_model: config.extraction_model.clone(),
        }
    }
}

pub fn summary_prompt(request: &SummaryRequest) -> String {
    format!(
        "Generate a concise executive summary for {company}'s sustainability maturity assessment.\n\
         \n\
         Key Data:\n\
         - Overall Score: {overall}/5.0\n\
         - Company: {company}\n\
         \n\
         Dimension Comparison (User vs Industry Average):\n\
         {comparison}\n\
         \n\
         Requirements:\n\
         - Maximum 5 lines\n\
         - Professional, actionable tone\n\
         - Focus on key insights, strengths, and priority areas\n\
         - Mention overall maturity level and key recommendations\n\
         - Be specific about the company's position relative to industry\n\
         \n\
         Return only the executive summary text, no additional formatting or headers.",
        company = request.company_name,
        overall = request.overall_display(),
        comparison = request.comparison_lines().join("\n"),
    )
}

pub fn insights_prompt(company_name: &str, industry: Option<&str>) -> String {
    let industry_context = industry
        .filter(|i| !i.trim().is_empty())
        .map(|i| format!(" in the {} industry", i))
        .unwrap_or_default();
    format!(
        "Provide comprehensive sustainability insights for {company}{context}, considering:\n\
         1. Current sustainability initiatives and ESG practices\n\
         2. Environmental challenges and barriers they face\n\
         3. Industry-specific sustainability requirements and trends\n\
         4. Regulatory pressures and compliance requirements\n\
         \n\
         Respond with exactly these two sections:\n\
         \n\
         **Barriers to Sustainability (exactly 4 lines):**\n\
         [Provide 4 specific, realistic barriers this company faces in their sustainability journey]\n\
         \n\
         **Sustainability Journey Predictions:**\n\
         [Provide 3-4 predictions about where this company's sustainability efforts will be in the \
         next 3-5 years, considering industry trends, regulatory pressures, and their current position]",
        company = company_name,
        context = industry_context,
    )
}

pub fn extraction_prompt(markdown: &str) -> String {
    format!(
        "Please analyze the following sustainability assessment report and extract the numerical \
         scores for each dimension.\n\
         The scores should be on a scale of 1-5, where:\n\
         - 1 = Resist - Minimal or no sustainability practices\n\
         - 2 = Comply - Basic regulatory compliance\n\
         - 3 = Optimize - Proactive sustainability improvements\n\
         - 4 = Reinvent - Sustainability as core business driver\n\
         - 5 = Lead - Industry leadership in sustainability\n\
         \n\
         Extract scores for these exact dimensions:\n\
         - sustainability_leadership\n\
         - organization\n\
         - sustainability_risk_management\n\
         - data_systems\n\
         - people_competency\n\
         - direct_asset_management\n\
         - product_management\n\
         - vendor_management\n\
         - metrics_reporting\n\
         - managing_change\n\
         \n\
         If a specific dimension is not mentioned, estimate based on related content and context.\n\
         \n\
         Return your response as a JSON object with exactly those keys and integer values.\n\
         \n\
         Assessment Report:\n\
         {markdown}"
    )
}

/// Parse and range-check the extractor's JSON reply
pub fn parse_scores(reply: &str) -> Result<SpiderChartScores, AdvisorError> {
    let trimmed = reply.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed);

    let scores: SpiderChartScores = serde_json::from_str(body.trim())
        .map_err(|e| AdvisorError::MalformedResponse(e.to_string()))?;

    if let Some((dimension, score)) = scores.iter().find(|(_, s)| !(1..=5).contains(s)) {
        return Err(AdvisorError::MalformedResponse(format!(
            "score {} for {} outside 1-5",
            score,
            dimension.chart_key()
        )));
    }
    Ok(scores)
}

#[async_trait]
impl Summarizer for LlmAdvisor {
    async fn executive_summary(&self, request: &SummaryRequest) -> Result<String, AdvisorError> {
        let chat = ChatRequest::new(&self.summary_model, summary_prompt(request))
            .system(SUMMARY_SYSTEM)
            .max_tokens(300)
            .temperature(0.7);
        let text = self.provider.complete(chat).await?;
        debug!(company = %request.company_name, chars = text.len(), "Executive summary generated");
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl InsightsProvider for LlmAdvisor {
    async fn company_insights(
        &self,
        company_name: &str,
        industry: Option<&str>,
    ) -> Result<String, AdvisorError> {
        let chat = ChatRequest::new(&self.insights_model, insights_prompt(company_name, industry))
            .system(INSIGHTS_SYSTEM)
            .max_tokens(500)
            .temperature(0.7);
        let text = self.provider.complete(chat).await?;
        debug!(company = %company_name, chars = text.len(), "Company insights generated");
        Ok(text)
    }
}

#[async_trait]
impl ScoreExtractor for LlmAdvisor {
    async fn extract_scores(&self, markdown: &str) -> Result<SpiderChartScores, AdvisorError> {
        let chat = ChatRequest::new(&self.extraction_model, extraction_prompt(markdown))
            .system(EXTRACTION_SYSTEM)
            .json_response();
        let reply = self.provider.complete(chat).await?;
        parse_scores(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smat_scoring::{Dimension, DimensionAverages};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct CannedProvider {
        reply: Result<String, ()>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl CannedProvider {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push(request);
            self.reply
                .clone()
                .map_err(|_| LlmError::Response("boom".to_string()))
        }
    }

    fn summary_request() -> SummaryRequest {
        let averages: DimensionAverages = vec![(Dimension::Organization, 2.5)].into_iter().collect();
        SummaryRequest {
            company_name: "Apex".to_string(),
            averages,
            industry: HashMap::from([(Dimension::Organization, 2.8)]),
            overall_score: Some(2.5),
        }
    }

    #[test]
    fn test_summary_prompt_contents() {
        let prompt = summary_prompt(&summary_request());
        assert!(prompt.contains("- Overall Score: 2.5/5.0"));
        assert!(prompt.contains("- Organization: User 2.5/5.0 vs Industry 2.8/5.0 (Gap: -0.30)"));
        assert!(prompt.contains("Maximum 5 lines"));
    }

    #[test]
    fn test_insights_prompt_industry_context() {
        assert!(insights_prompt("Apex", Some("Chemical Manufacturing"))
            .contains("Apex in the Chemical Manufacturing industry"));
        assert!(insights_prompt("Apex", None).starts_with(
            "Provide comprehensive sustainability insights for Apex, considering"
        ));
    }

    #[test]
    fn test_parse_scores_accepts_fenced_json() {
        let reply = "```json\n{\"sustainability_leadership\": 5, \"organization\": 4, \
            \"sustainability_risk_management\": 3, \"data_systems\": 2, \"people_competency\": 4, \
            \"direct_asset_management\": 3, \"product_management\": 2, \"vendor_management\": 3, \
            \"metrics_reporting\": 4, \"managing_change\": 3}\n```";
        let scores = parse_scores(reply).unwrap();
        assert_eq!(scores.sustainability_leadership, 5);
        assert_eq!(scores.data_systems, 2);
    }

    #[test]
    fn test_parse_scores_rejects_bad_replies() {
        assert!(matches!(
            parse_scores("not json"),
            Err(AdvisorError::MalformedResponse(_))
        ));
        assert!(parse_scores(r#"{"organization": 3}"#).is_err());

        let out_of_range = r#"{"sustainability_leadership": 9, "organization": 4,
            "sustainability_risk_management": 3, "data_systems": 2, "people_competency": 4,
            "direct_asset_management": 3, "product_management": 2, "vendor_management": 3,
            "metrics_reporting": 4, "managing_change": 3}"#;
        assert!(parse_scores(out_of_range).is_err());
    }

    #[tokio::test]
    async fn test_summary_uses_configured_model() {
        let provider = CannedProvider::ok("  A short summary.  ");
        let advisor = LlmAdvisor::new(provider.clone(), &LlmConfig::default());
        let text = advisor.executive_summary(&summary_request()).await.unwrap();
        assert_eq!(text, "A short summary.");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].model, LlmConfig::default().summary_model);
        assert_eq!(requests[0].max_tokens, Some(300));
    }

    #[tokio::test]
    async fn test_provider_error_maps_to_advisor_error() {
        let advisor = LlmAdvisor::new(CannedProvider::failing(), &LlmConfig::default());
        let err = advisor.company_insights("Apex", None).await.unwrap_err();
        assert!(matches!(err, AdvisorError::MalformedResponse(_)));
    }
}
