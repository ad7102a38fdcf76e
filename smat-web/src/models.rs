//! Form and stored-report types shared by the route handlers

use chrono::{DateTime, Local};
use serde::Serialize;
use smat_common::config::UserProfile;
use smat_scoring::ReportResult;
use std::collections::HashMap;

/// General-information fields that must be non-blank
pub const REQUIRED_FIELDS: [&str; 6] = [
    "company",
    "name",
    "email",
    "industry",
    "employees",
    "headquarters",
];

/// General-information section of the questionnaire form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneralInformation {
    pub company: String,
    pub name: String,
    pub email: String,
    pub industry: String,
    pub employees: String,
    pub headquarters: String,
    pub products: String,
    pub manufacturing_location: String,
    pub profile: String,
}

impl GeneralInformation {
    /// Read the fields out of a submitted form, trimming whitespace
    pub fn from_form(form: &HashMap<String, String>) -> Self {
        let field = |name: &str| {
            form.get(name)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };
        Self {
            company: field("company"),
            name: field("name"),
            email: field("email"),
            industry: field("industry"),
            employees: field("employees"),
            headquarters: field("headquarters"),
            products: field("products"),
            manufacturing_location: field("manufacturing_location"),
            profile: field("profile"),
        }
    }

    fn value(&self, field: &str) -> &str {
        match field {
            "company" => &self.company,
            "name" => &self.name,
            "email" => &self.email,
            "industry" => &self.industry,
            "employees" => &self.employees,
            "headquarters" => &self.headquarters,
            "products" => &self.products,
            "manufacturing_location" => &self.manufacturing_location,
            "profile" => &self.profile,
            _ => "",
        }
    }

    /// Required fields left blank, in form order
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|f| self.value(f).is_empty())
            .collect()
    }

    /// Industry for the insights prompt: the form's, else the profile's
    pub fn industry_or<'a>(&'a self, user: &'a UserProfile) -> Option<&'a str> {
        [self.industry.as_str(), user.industry.as_str()]
            .into_iter()
            .find(|s| !s.is_empty())
    }
}

/// Everything the report pages need, held per session
#[derive(Debug, Clone)]
pub struct StoredReport {
    pub result: ReportResult,
    pub general_info: GeneralInformation,
    pub generated_at: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_required_in_form_order() {
        let info = GeneralInformation::from_form(&form(&[
            ("company", "Apex"),
            ("name", "  "),
            ("industry", "Chemicals"),
            ("employees", "500"),
        ]));
        assert_eq!(info.missing_required(), vec!["name", "email", "headquarters"]);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let info = GeneralInformation::from_form(&form(&[("company", "  Apex Manufacturing ")]));
        assert_eq!(info.company, "Apex Manufacturing");
        assert!(info.products.is_empty());
    }

    #[test]
    fn test_industry_falls_back_to_profile() {
        let user = UserProfile {
            industry: "Chemical Manufacturing".to_string(),
            ..UserProfile::default()
        };
        let blank = GeneralInformation::default();
        assert_eq!(blank.industry_or(&user), Some("Chemical Manufacturing"));

        let filled = GeneralInformation {
            industry: "Textiles".to_string(),
            ..GeneralInformation::default()
        };
        assert_eq!(filled.industry_or(&user), Some("Textiles"));
        assert_eq!(blank.industry_or(&UserProfile::default()), None);
    }
}
