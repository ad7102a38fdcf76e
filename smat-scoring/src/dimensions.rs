//! The ten assessment dimensions and name reconciliation
//!
//! Three reference sources spell the same dimensions differently:
//! - the question file ("Data & Systems")
//! - the industry survey file ("Sustainability Risk Mgmt", "People & Costs")
//! - the chart axis labels ("Organization Structure", "Data Systems")
//!
//! Raw names are resolved to a [`Dimension`] through an ordered substitution
//! table. The first rule whose output equals a known question-file or chart
//! spelling wins; a name no rule resolves is unmapped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Canonical dimension key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    SustainabilityLeadership,
    Organization,
    SustainabilityRiskManagement,
    DataSystems,
    PeopleCompetency,
    DirectAssetManagement,
    ProductManagement,
    VendorManagement,
    MetricsReporting,
    ManagingChange,
}

impl Dimension {
    /// All dimensions in chart axis order
    pub const ALL: [Dimension; 10] = [
        Dimension::SustainabilityLeadership,
        Dimension::Organization,
        Dimension::SustainabilityRiskManagement,
        Dimension::DataSystems,
        Dimension::PeopleCompetency,
        Dimension::DirectAssetManagement,
        Dimension::ProductManagement,
        Dimension::VendorManagement,
        Dimension::MetricsReporting,
        Dimension::ManagingChange,
    ];

    /// Question-file spelling, also used as the display name in reports
    pub fn name(self) -> &'static str {
        match self {
            Dimension::SustainabilityLeadership => "Sustainability Leadership",
            Dimension::Organization => "Organization",
            Dimension::SustainabilityRiskManagement => "Sustainability Risk Management",
            Dimension::DataSystems => "Data & Systems",
            Dimension::PeopleCompetency => "People & Competency",
            Dimension::DirectAssetManagement => "Asset Management",
            Dimension::ProductManagement => "Product Management",
            Dimension::VendorManagement => "Vendor Management",
            Dimension::MetricsReporting => "Metrics & Reporting",
            Dimension::ManagingChange => "Managing Change",
        }
    }

    /// Chart-file axis label
    pub fn chart_label(self) -> &'static str {
        match self {
            Dimension::SustainabilityLeadership => "Sustainability Leadership",
            Dimension::Organization => "Organization Structure",
            Dimension::SustainabilityRiskManagement => "Risk Management",
            Dimension::DataSystems => "Data Systems",
            Dimension::PeopleCompetency => "People & Competency",
            Dimension::DirectAssetManagement => "Asset Management",
            Dimension::ProductManagement => "Product Management",
            Dimension::VendorManagement => "Vendor Management",
            Dimension::MetricsReporting => "Metrics & Reporting",
            Dimension::ManagingChange => "Managing Change",
        }
    }

    /// Field name used by the spider-chart score model
    pub fn chart_key(self) -> &'static str {
        match self {
            Dimension::SustainabilityLeadership => "sustainability_leadership",
            Dimension::Organization => "organization",
            Dimension::SustainabilityRiskManagement => "sustainability_risk_management",
            Dimension::DataSystems => "data_systems",
            Dimension::PeopleCompetency => "people_competency",
            Dimension::DirectAssetManagement => "direct_asset_management",
            Dimension::ProductManagement => "product_management",
            Dimension::VendorManagement => "vendor_management",
            Dimension::MetricsReporting => "metrics_reporting",
            Dimension::ManagingChange => "managing_change",
        }
    }

    pub fn from_chart_key(key: &str) -> Option<Dimension> {
        Self::ALL.into_iter().find(|d| d.chart_key() == key)
    }

    pub fn from_chart_label(label: &str) -> Option<Dimension> {
        Self::ALL.into_iter().find(|d| d.chart_label() == label)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type Substitution = (&'static str, &'static str);

/// Ordered name-reconciliation rules; each rule applies its substitutions in sequence
pub const NAME_RULES: &[&[Substitution]] = &[
    &[],
    &[("Mgmt", "Management")],
    &[(" & ", " "), ("Mgmt", "Management")],
    &[("Costs", "Competency"), ("Design & Customers", "Product Management")],
    &[("Direct ", ""), ("Mgmt", "Management")],
];

fn apply_rule(rule: &[Substitution], raw: &str) -> String {
    rule.iter()
        .fold(raw.to_string(), |name, (from, to)| name.replace(from, to))
}

fn match_spelling(candidate: &str) -> Option<Dimension> {
    Dimension::ALL
        .into_iter()
        .find(|d| d.name() == candidate || d.chart_label() == candidate)
}

/// Resolve a raw dimension name from any reference source
pub fn canonicalize(raw: &str) -> Option<Dimension> {
    let raw = raw.trim();
    NAME_RULES
        .iter()
        .find_map(|rule| match_spelling(&apply_rule(rule, raw)))
}

/// Two-way lookup between canonical dimensions and their source spellings
///
/// Built from the survey file's dimension names; chart spellings are fixed.
#[derive(Debug, Clone, Default)]
pub struct DimensionMapper {
    survey: HashMap<Dimension, String>,
    unmapped: Vec<String>,
}

impl DimensionMapper {
    /// Build the mapper from the industry survey's dimension names
    ///
    /// When two survey names resolve to the same dimension the first wins and
    /// the later one is recorded as unmapped.
    pub fn from_survey_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut mapper = Self::default();
        for raw in names {
            match canonicalize(raw) {
                Some(dimension) if !mapper.survey.contains_key(&dimension) => {
                    mapper.survey.insert(dimension, raw.to_string());
                }
                Some(dimension) => {
                    warn!(
                        survey_name = raw,
                        dimension = dimension.name(),
                        "Duplicate survey dimension ignored"
                    );
                    mapper.unmapped.push(raw.to_string());
                }
                None => {
                    warn!(survey_name = raw, "Survey dimension does not match any known dimension");
                    mapper.unmapped.push(raw.to_string());
                }
            }
        }
        mapper
    }

    /// Resolve a raw name from any source
    pub fn resolve(&self, raw: &str) -> Option<Dimension> {
        canonicalize(raw)
    }

    /// Canonical → survey-file spelling
    pub fn survey_spelling(&self, dimension: Dimension) -> Option<&str> {
        self.survey.get(&dimension).map(String::as_str)
    }

    /// Canonical → chart-file spelling
    pub fn chart_spelling(&self, dimension: Dimension) -> &'static str {
        dimension.chart_label()
    }

    /// Survey-file spelling → canonical (exact)
    pub fn from_survey_spelling(&self, spelling: &str) -> Option<Dimension> {
        self.survey
            .iter()
            .find(|(_, s)| s.as_str() == spelling)
            .map(|(d, _)| *d)
    }

    /// Chart-file spelling → canonical (exact)
    pub fn from_chart_spelling(&self, spelling: &str) -> Option<Dimension> {
        Dimension::from_chart_label(spelling)
    }

    /// Survey names no rule could resolve
    pub fn unmapped(&self) -> &[String] {
        &self.unmapped
    }

    /// Number of dimensions with a survey spelling
    pub fn mapped_count(&self) -> usize {
        self.survey.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURVEY_NAMES: [&str; 10] = [
        "Sustainability Leadership",
        "Organization",
        "Sustainability Risk Mgmt",
        "Data & Systems",
        "People & Costs",
        "Direct Asset Mgmt",
        "Design & Customers",
        "Vendor Mgmt",
        "Metrics & Reporting",
        "Managing Change",
    ];

    #[test]
    fn test_exact_question_names_resolve() {
        for dimension in Dimension::ALL {
            assert_eq!(canonicalize(dimension.name()), Some(dimension));
        }
    }

    #[test]
    fn test_chart_labels_resolve() {
        for dimension in Dimension::ALL {
            assert_eq!(canonicalize(dimension.chart_label()), Some(dimension));
        }
    }

    #[test]
    fn test_substitution_rules() {
        assert_eq!(
            canonicalize("Sustainability Risk Mgmt"),
            Some(Dimension::SustainabilityRiskManagement)
        );
        assert_eq!(canonicalize("People & Costs"), Some(Dimension::PeopleCompetency));
        assert_eq!(canonicalize("Design & Customers"), Some(Dimension::ProductManagement));
        assert_eq!(canonicalize("Direct Asset Mgmt"), Some(Dimension::DirectAssetManagement));
        assert_eq!(canonicalize("Vendor Mgmt"), Some(Dimension::VendorManagement));
        assert_eq!(canonicalize("Data Systems"), Some(Dimension::DataSystems));
    }

    #[test]
    fn test_unknown_name_is_unmapped() {
        assert_eq!(canonicalize("Biodiversity"), None);
        assert_eq!(canonicalize(""), None);
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert_eq!(canonicalize("  Organization "), Some(Dimension::Organization));
    }

    #[test]
    fn test_mapper_round_trip() {
        let mapper = DimensionMapper::from_survey_names(SURVEY_NAMES);
        assert_eq!(mapper.mapped_count(), 10);
        assert!(mapper.unmapped().is_empty());

        for dimension in Dimension::ALL {
            let survey = mapper.survey_spelling(dimension).expect("survey spelling");
            assert_eq!(mapper.from_survey_spelling(survey), Some(dimension));

            let chart = mapper.chart_spelling(dimension);
            assert_eq!(mapper.from_chart_spelling(chart), Some(dimension));
        }
    }

    #[test]
    fn test_mapper_records_unmapped_and_duplicates() {
        let mapper =
            DimensionMapper::from_survey_names(["Organization", "Organisation Design", "Organization"]);
        assert_eq!(mapper.mapped_count(), 1);
        assert_eq!(mapper.unmapped(), &["Organisation Design".to_string(), "Organization".to_string()]);
    }

    #[test]
    fn test_chart_key_round_trip() {
        for dimension in Dimension::ALL {
            assert_eq!(Dimension::from_chart_key(dimension.chart_key()), Some(dimension));
        }
    }

    #[test]
    fn test_serde_uses_chart_keys() {
        let json = serde_json::to_string(&Dimension::DirectAssetManagement).unwrap();
        assert_eq!(json, "\"direct_asset_management\"");
    }
}
