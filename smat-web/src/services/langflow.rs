//! External flow analysis client
//!
//! The questionnaire is sent to a Langflow flow as one plain-text chat
//! message. The flow answers with a markdown report nested deep inside its
//! run response.

use chrono::NaiveDateTime;
use reqwest::Client;
use serde_json::{json, Value};
use smat_scoring::{Answers, ReferenceData};
use std::fmt::Write as _;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LangflowError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("flow request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected flow response: {0}")]
    Response(String),
}

/// Company details printed at the top of the transcript
#[derive(Debug, Clone, Default)]
pub struct TranscriptHeader {
    pub company: String,
    pub industry: String,
    pub revenue: String,
    pub location: String,
}

/// Render the questionnaire and answers as the flow's input text
///
/// Every question is listed, answered or not, in question-file order.
pub fn format_questionnaire(
    header: &TranscriptHeader,
    reference: &ReferenceData,
    answers: &Answers,
    timestamp: NaiveDateTime,
) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "{} - SUSTAINABILITY QUESTIONNAIRE",
        header.company.to_uppercase()
    );
    let _ = writeln!(text, "Company: {}", header.company);
    let _ = writeln!(text, "Industry: {}", header.industry);
    let _ = writeln!(text, "Revenue: {}", header.revenue);
    let _ = writeln!(text, "Location: {}", header.location);
    let _ = writeln!(text, "Date: {}", timestamp.format("%Y-%m-%d %H:%M:%S"));
    text.push_str("\nQUESTIONNAIRE RESPONSES\n========================\n\n");

    for question in reference.questions() {
        // "Q07" → "07"
        let number = question.id.get(1..).unwrap_or_default();
        let _ = writeln!(text, "Q{}: {}", number, question.text);
        let _ = writeln!(
            text,
            "Dimension: {} | Element: {}",
            question.dimension_name, question.element
        );
        match answers.get(&question.id) {
            Some(&level) => {
                let label = reference.responses().label(level).unwrap_or_default();
                let _ = writeln!(text, "A{}: Level {} - {}\n", number, level, label);
            }
            None => {
                let _ = writeln!(text, "A{}: Not answered\n", number);
            }
        }
    }
    text
}

/// Pull the report text out of a flow run response
pub fn extract_text(response: &Value) -> Result<String, LangflowError> {
    response["outputs"][0]["outputs"][0]["results"]["message"]["data"]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            LangflowError::Response(
                "missing outputs[0].outputs[0].results.message.data.text".to_string(),
            )
        })
}

pub struct LangflowClient {
    client: Client,
    url: String,
}

impl LangflowClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, LangflowError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LangflowError::Client(e.to_string()))?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run the flow on `input` and return its markdown report
    pub async fn run(&self, input: &str) -> Result<String, LangflowError> {
        debug!(url = %self.url, chars = input.len(), "Calling flow");
        let payload = json!({
            "input_value": input,
            "output_type": "chat",
            "input_type": "chat",
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| LangflowError::Response(format!("invalid JSON: {}", e)))?;
        let text = extract_text(&body)?;
        info!(chars = text.len(), "Flow analysis received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const QUESTIONS: &str = r#"{
        "questionnaireReference": [
            {"questionId": "Q01", "dimension": "Organization", "element": "Structure", "question": "Roles are defined"},
            {"questionId": "Q02", "dimension": "Metrics & Reporting", "element": "KPIs", "question": "KPIs are tracked"}
        ],
        "responses": {"1": "Resist - a", "2": "Comply - b", "3": "Optimize - c", "4": "Reinvent - d", "5": "Lead - e"}
    }"#;

    fn header() -> TranscriptHeader {
        TranscriptHeader {
            company: "Apex Manufacturing".to_string(),
            industry: "Chemical Manufacturing".to_string(),
            revenue: "$75M-$100M".to_string(),
            location: "Kuala Lumpur, Malaysia".to_string(),
        }
    }

    #[test]
    fn test_transcript_format() {
        let reference = ReferenceData::from_documents(Some(QUESTIONS), None, None);
        let answers: Answers = [("Q01".to_string(), 4)].into_iter().collect();
        let timestamp = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();

        let text = format_questionnaire(&header(), &reference, &answers, timestamp);

        assert!(text.starts_with("APEX MANUFACTURING - SUSTAINABILITY QUESTIONNAIRE\nCompany: Apex Manufacturing\n"));
        assert!(text.contains("Revenue: $75M-$100M\nLocation: Kuala Lumpur, Malaysia\nDate: 2025-03-05 14:30:00\n"));
        assert!(text.contains("QUESTIONNAIRE RESPONSES\n========================\n\n"));
        assert!(text.contains(
            "Q01: Roles are defined\nDimension: Organization | Element: Structure\nA01: Level 4 - Reinvent - d\n\n"
        ));
        assert!(text.contains("Q02: KPIs are tracked\nDimension: Metrics & Reporting | Element: KPIs\nA02: Not answered\n\n"));
    }

    #[test]
    fn test_extract_text() {
        let response = json!({
            "outputs": [{"outputs": [{"results": {"message": {"data": {"text": "# Report"}}}}]}]
        });
        assert_eq!(extract_text(&response).unwrap(), "# Report");
    }

    #[test]
    fn test_extract_text_missing_path() {
        let response = json!({"outputs": []});
        assert!(matches!(
            extract_text(&response),
            Err(LangflowError::Response(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_flow_is_request_error() {
        let client =
            LangflowClient::new("http://127.0.0.1:9/api/v1/run/x".to_string(), Duration::from_secs(2))
                .unwrap();
        let err = client.run("hello").await.unwrap_err();
        assert!(matches!(err, LangflowError::Request(_)));
    }
}
