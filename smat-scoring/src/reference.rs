//! Reference data: questions, response labels, recommendations, industry averages
//!
//! Decoded once at startup from three JSON documents in the data directory:
//! - `questions.json`: `{"questionnaireReference": [...], "responses": {"1": "..."}}`
//! - `recommendations.json`: `{"mini_reports": [{"name", "recommendations": {"resist": ...}}]}`
//! - `survey.json`: `{"industry_averages": [{"name", "industry_average"}]}`
//!
//! A missing or malformed document never stops the service. Each one falls
//! back independently to a minimal built-in default and the reason is kept in
//! [`ReferenceData::warnings`].

use crate::dimensions::{Dimension, DimensionMapper};
use crate::maturity::MaturityLevel;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

pub const QUESTIONS_FILE: &str = "questions.json";
pub const RECOMMENDATIONS_FILE: &str = "recommendations.json";
pub const SURVEY_FILE: &str = "survey.json";

/// Text used when no recommendation exists for a dimension/level pair
pub const NO_RECOMMENDATION: &str = "No recommendation available";

const DEFAULT_RESPONSES: [&str; 5] = [
    "Resist - Minimal or no sustainability practices, reactive approach",
    "Comply - Basic regulatory compliance, limited proactive measures",
    "Optimize - Proactive sustainability improvements, some integration into business",
    "Reinvent - Sustainability as core business driver, comprehensive approach",
    "Lead - Industry leadership in sustainability, market shaping activities",
];

/// Question as stored in the question file
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RawQuestion {
    #[serde(rename = "questionId")]
    question_id: String,
    dimension: String,
    element: String,
    question: String,
}

#[derive(Debug, Deserialize)]
struct QuestionsDocument {
    #[serde(rename = "questionnaireReference")]
    questionnaire_reference: Vec<RawQuestion>,
    #[serde(default)]
    responses: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RecommendationsDocument {
    mini_reports: Vec<MiniReport>,
}

#[derive(Debug, Deserialize)]
struct MiniReport {
    name: String,
    recommendations: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SurveyDocument {
    industry_averages: Vec<SurveyEntry>,
}

#[derive(Debug, Deserialize)]
struct SurveyEntry {
    name: String,
    industry_average: f64,
}

/// A validated questionnaire question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub id: String,
    pub dimension: Dimension,
    /// Dimension spelling as written in the question file
    pub dimension_name: String,
    pub element: String,
    pub text: String,
}

/// Descriptive labels for response levels 1 through 5
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseLevels {
    labels: [String; 5],
}

impl ResponseLevels {
    /// Full label for a level, e.g. "Comply - Basic regulatory compliance, ..."
    pub fn label(&self, level: u8) -> Option<&str> {
        match level {
            1..=5 => Some(self.labels[usize::from(level - 1)].as_str()),
            _ => None,
        }
    }

    /// Leading word of a label, e.g. "Comply"
    pub fn short_label(&self, level: u8) -> Option<&str> {
        self.label(level)
            .map(|l| l.split(" - ").next().unwrap_or(l).trim())
    }

    /// (level, label) pairs in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, l)| (i as u8 + 1, l.as_str()))
    }
}

impl Default for ResponseLevels {
    fn default() -> Self {
        Self {
            labels: DEFAULT_RESPONSES.map(str::to_string),
        }
    }
}

/// All static reference data, immutable after load
#[derive(Debug, Clone)]
pub struct ReferenceData {
    questions: Vec<Question>,
    responses: ResponseLevels,
    recommendations: HashMap<(Dimension, MaturityLevel), String>,
    industry_averages: HashMap<Dimension, f64>,
    mapper: DimensionMapper,
    warnings: Vec<String>,
}

impl ReferenceData {
    /// Load the three reference documents from `dir`
    pub fn load(dir: &Path) -> Self {
        let read = |name: &str| -> Result<String, String> {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|e| format!("{}: {}", path.display(), e))
        };

        let data = Self::from_sources(
            read(QUESTIONS_FILE),
            read(RECOMMENDATIONS_FILE),
            read(SURVEY_FILE),
        );

        info!(
            questions = data.questions.len(),
            recommendations = data.recommendations.len(),
            industry_averages = data.industry_averages.len(),
            "Reference data loaded from {}",
            dir.display()
        );
        for warning in &data.warnings {
            warn!("Reference data degraded: {}", warning);
        }
        data
    }

    /// Build reference data from document text
    pub fn from_documents(
        questions: Option<&str>,
        recommendations: Option<&str>,
        survey: Option<&str>,
    ) -> Self {
        let missing = |name: &str| format!("{} not provided", name);
        Self::from_sources(
            questions.map(str::to_string).ok_or_else(|| missing(QUESTIONS_FILE)),
            recommendations
                .map(str::to_string)
                .ok_or_else(|| missing(RECOMMENDATIONS_FILE)),
            survey.map(str::to_string).ok_or_else(|| missing(SURVEY_FILE)),
        )
    }

    /// Minimal built-in data set
    pub fn builtin() -> Self {
        Self::from_documents(None, None, None)
    }

    fn from_sources(
        questions: Result<String, String>,
        recommendations: Result<String, String>,
        survey: Result<String, String>,
    ) -> Self {
        let mut warnings = Vec::new();

        // Survey first: the mapper it produces is needed for everything else
        let survey_entries = match survey.and_then(|text| {
            serde_json::from_str::<SurveyDocument>(&text)
                .map_err(|e| format!("{}: {}", SURVEY_FILE, e))
        }) {
            Ok(doc) => doc.industry_averages,
            Err(reason) => {
                warnings.push(format!("{}; industry comparison disabled", reason));
                Vec::new()
            }
        };
        let mapper = DimensionMapper::from_survey_names(survey_entries.iter().map(|e| e.name.as_str()));
        let industry_averages = Self::validate_industry(&survey_entries, &mapper, &mut warnings);

        let (questions, responses) = match questions.and_then(|text| {
            serde_json::from_str::<QuestionsDocument>(&text)
                .map_err(|e| format!("{}: {}", QUESTIONS_FILE, e))
        }) {
            Ok(doc) => {
                let responses = Self::validate_responses(&doc.responses, &mut warnings);
                let questions =
                    Self::validate_questions(doc.questionnaire_reference, &mapper, &mut warnings);
                (questions, responses)
            }
            Err(reason) => {
                warnings.push(format!("{}; using built-in questions", reason));
                (Vec::new(), ResponseLevels::default())
            }
        };
        let questions = if questions.is_empty() {
            Self::default_questions()
        } else {
            questions
        };

        let recommendations = match recommendations.and_then(|text| {
            serde_json::from_str::<RecommendationsDocument>(&text)
                .map_err(|e| format!("{}: {}", RECOMMENDATIONS_FILE, e))
        }) {
            Ok(doc) => Self::validate_recommendations(doc.mini_reports, &mapper, &mut warnings),
            Err(reason) => {
                warnings.push(format!("{}; recommendations unavailable", reason));
                HashMap::new()
            }
        };

        Self {
            questions,
            responses,
            recommendations,
            industry_averages,
            mapper,
            warnings,
        }
    }

    fn default_questions() -> Vec<Question> {
        vec![Question {
            id: "Q01".to_string(),
            dimension: Dimension::SustainabilityLeadership,
            dimension_name: Dimension::SustainabilityLeadership.name().to_string(),
            element: "Leadership".to_string(),
            text: "Sustainability is a priority for my Leadership committee".to_string(),
        }]
    }

    fn validate_responses(
        raw: &BTreeMap<String, String>,
        warnings: &mut Vec<String>,
    ) -> ResponseLevels {
        let labels: Option<Vec<String>> = (1..=5)
            .map(|level| {
                raw.get(&level.to_string())
                    .filter(|l| !l.trim().is_empty())
                    .cloned()
            })
            .collect();

        match labels.and_then(|l| <[String; 5]>::try_from(l).ok()) {
            Some(labels) => ResponseLevels { labels },
            None => {
                warnings.push(format!(
                    "{}: responses must define levels 1-5; using built-in labels",
                    QUESTIONS_FILE
                ));
                ResponseLevels::default()
            }
        }
    }

    fn validate_questions(
        raw: Vec<RawQuestion>,
        mapper: &DimensionMapper,
        warnings: &mut Vec<String>,
    ) -> Vec<Question> {
        let mut seen = HashSet::new();
        let mut questions = Vec::with_capacity(raw.len());

        for q in raw {
            if !seen.insert(q.question_id.clone()) {
                warnings.push(format!("duplicate question id {} dropped", q.question_id));
                continue;
            }
            let Some(dimension) = mapper.resolve(&q.dimension) else {
                warnings.push(format!(
                    "question {} has unknown dimension '{}' and was dropped",
                    q.question_id, q.dimension
                ));
                continue;
            };
            questions.push(Question {
                id: q.question_id,
                dimension,
                dimension_name: q.dimension,
                element: q.element,
                text: q.question,
            });
        }
        questions
    }

    fn validate_recommendations(
        reports: Vec<MiniReport>,
        mapper: &DimensionMapper,
        warnings: &mut Vec<String>,
    ) -> HashMap<(Dimension, MaturityLevel), String> {
        let mut recommendations = HashMap::new();
        for report in reports {
            let Some(dimension) = mapper.resolve(&report.name) else {
                warnings.push(format!("recommendations for unknown dimension '{}' ignored", report.name));
                continue;
            };
            for (level, text) in report.recommendations {
                match level.parse::<MaturityLevel>() {
                    Ok(level) => {
                        recommendations.entry((dimension, level)).or_insert(text);
                    }
                    Err(e) => warnings.push(format!("{} ({})", e, report.name)),
                }
            }
        }
        recommendations
    }

    fn validate_industry(
        entries: &[SurveyEntry],
        mapper: &DimensionMapper,
        warnings: &mut Vec<String>,
    ) -> HashMap<Dimension, f64> {
        let mut averages = HashMap::new();
        for entry in entries {
            // Unmapped names are already recorded by the mapper
            let Some(dimension) = mapper.from_survey_spelling(&entry.name) else {
                continue;
            };
            if !entry.industry_average.is_finite() || !(0.0..=5.0).contains(&entry.industry_average) {
                warnings.push(format!(
                    "industry average {} for '{}' outside 0-5 ignored",
                    entry.industry_average, entry.name
                ));
                continue;
            }
            averages.insert(dimension, entry.industry_average);
        }
        averages
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn responses(&self) -> &ResponseLevels {
        &self.responses
    }

    /// Recommendation text for a dimension at a maturity level
    pub fn recommendation(&self, dimension: Dimension, level: MaturityLevel) -> &str {
        self.recommendations
            .get(&(dimension, level))
            .map(String::as_str)
            .unwrap_or(NO_RECOMMENDATION)
    }

    /// Industry averages keyed by canonical dimension (unmapped names excluded)
    pub fn industry_averages(&self) -> &HashMap<Dimension, f64> {
        &self.industry_averages
    }

    pub fn mapper(&self) -> &DimensionMapper {
        &self.mapper
    }

    /// Reasons any document fell back to defaults or had entries dropped
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Questions grouped by dimension, in question-file order
    pub fn questions_by_dimension(&self) -> Vec<(Dimension, Vec<&Question>)> {
        let mut groups: Vec<(Dimension, Vec<&Question>)> = Vec::new();
        for q in &self.questions {
            match groups.iter_mut().find(|(d, _)| *d == q.dimension) {
                Some((_, list)) => list.push(q),
                None => groups.push((q.dimension, vec![q])),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::Level;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    const QUESTIONS: &str = r#"{
        "questionnaireReference": [
            {"questionId": "Q01", "dimension": "Organization", "element": "Structure", "question": "A?"},
            {"questionId": "Q02", "dimension": "Organisation", "element": "Structure", "question": "B?"},
            {"questionId": "Q01", "dimension": "Organization", "element": "Structure", "question": "dup"},
            {"questionId": "Q03", "dimension": "Metrics & Reporting", "element": "KPIs", "question": "C?"}
        ],
        "responses": {"1": "Resist - a", "2": "Comply - b", "3": "Optimize - c", "4": "Reinvent - d", "5": "Lead - e"}
    }"#;

    const SURVEY: &str = r#"{
        "industry_averages": [
            {"name": "Organization", "industry_average": 2.8},
            {"name": "Metrics & Reporting", "industry_average": 7.5},
            {"name": "Biodiversity", "industry_average": 3.0}
        ]
    }"#;

    const RECOMMENDATIONS: &str = r#"{
        "mini_reports": [
            {"name": "Organization", "recommendations": {"comply": "Appoint a lead", "bogus": "x"}}
        ]
    }"#;

    #[test]
    fn test_questions_validated() {
        let data = ReferenceData::from_documents(Some(QUESTIONS), Some(RECOMMENDATIONS), Some(SURVEY));
        let ids: Vec<&str> = data.questions().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["Q01", "Q03"]);
        assert_eq!(data.question("Q03").unwrap().dimension, Dimension::MetricsReporting);
        assert_eq!(data.question("Q01").unwrap().text, "A?");
    }

    #[test]
    fn test_industry_averages_exclude_unmapped_and_out_of_range() {
        let data = ReferenceData::from_documents(Some(QUESTIONS), Some(RECOMMENDATIONS), Some(SURVEY));
        let industry = data.industry_averages();
        assert_eq!(industry.len(), 1);
        assert_eq!(industry.get(&Dimension::Organization), Some(&2.8));
        assert_eq!(data.mapper().unmapped(), &["Biodiversity".to_string()]);
    }

    #[test]
    fn test_recommendation_lookup_with_fallback() {
        let data = ReferenceData::from_documents(Some(QUESTIONS), Some(RECOMMENDATIONS), Some(SURVEY));
        assert_eq!(
            data.recommendation(Dimension::Organization, MaturityLevel::Comply),
            "Appoint a lead"
        );
        assert_eq!(
            data.recommendation(Dimension::Organization, MaturityLevel::Lead),
            NO_RECOMMENDATION
        );
        assert!(!data.warnings().is_empty());
    }

    #[test]
    fn test_malformed_documents_fall_back() {
        let data = ReferenceData::from_documents(Some("{not json"), Some("[]"), None);
        assert_eq!(data.questions().len(), 1);
        assert_eq!(data.questions()[0].id, "Q01");
        assert_eq!(data.responses(), &ResponseLevels::default());
        assert!(data.industry_averages().is_empty());
        assert_eq!(data.warnings().len(), 3);
    }

    #[test]
    fn test_incomplete_responses_use_defaults() {
        let questions = r#"{"questionnaireReference": [
            {"questionId": "Q01", "dimension": "Organization", "element": "E", "question": "Q"}
        ], "responses": {"1": "only one"}}"#;
        let data = ReferenceData::from_documents(Some(questions), None, None);
        assert_eq!(data.responses(), &ResponseLevels::default());
        assert_eq!(data.questions()[0].dimension, Dimension::Organization);
    }

    #[test]
    fn test_response_labels() {
        let levels = ResponseLevels::default();
        assert_eq!(levels.short_label(1), Some("Resist"));
        assert_eq!(levels.short_label(5), Some("Lead"));
        assert!(levels.label(0).is_none());
        assert!(levels.label(6).is_none());
        assert_eq!(levels.iter().count(), 5);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(QUESTIONS_FILE), QUESTIONS).unwrap();
        std::fs::write(dir.path().join(SURVEY_FILE), SURVEY).unwrap();

        let data = ReferenceData::load(dir.path());
        assert_eq!(data.questions().len(), 2);
        assert_eq!(data.industry_averages().len(), 1);
        // recommendations.json absent
        assert!(data
            .warnings()
            .iter()
            .any(|w| w.contains(RECOMMENDATIONS_FILE)));
    }

    /// Counts INFO and WARN events seen while installed
    #[derive(Clone, Default)]
    struct EventCounter {
        info: Arc<AtomicUsize>,
        warn: Arc<AtomicUsize>,
    }

    impl<S: tracing::Subscriber> Layer<S> for EventCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            match *event.metadata().level() {
                Level::INFO => self.info.fetch_add(1, Ordering::SeqCst),
                Level::WARN => self.warn.fetch_add(1, Ordering::SeqCst),
                _ => 0,
            };
        }
    }

    #[test]
    fn test_load_logs_summary_and_each_warning_once() {
        // Every reference file missing
        let dir = tempfile::tempdir().unwrap();

        let counter = EventCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        let data = tracing::subscriber::with_default(subscriber, || ReferenceData::load(dir.path()));

        assert!(!data.warnings().is_empty());
        assert_eq!(counter.warn.load(Ordering::SeqCst), data.warnings().len());
        assert_eq!(counter.info.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_questions_grouped_in_file_order() {
        let data = ReferenceData::from_documents(Some(QUESTIONS), None, None);
        let groups = data.questions_by_dimension();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Dimension::Organization);
        assert_eq!(groups[1].0, Dimension::MetricsReporting);
    }
}
