//! Markdown report assembly

use crate::aggregate::DimensionAverages;
use crate::dimensions::Dimension;
use crate::maturity::MaturityLevel;
use crate::reference::ReferenceData;
use crate::{format_gap, format_score};
use chrono::NaiveDate;
use smat_common::time::long_date;

/// Scores at or above this are listed as strengths
pub const STRENGTH_THRESHOLD: f64 = 3.5;

/// Scores below this are listed as areas for improvement
pub const IMPROVEMENT_THRESHOLD: f64 = 2.5;

/// Number of priority actions in the report
pub const PRIORITY_COUNT: usize = 3;

/// Everything the report needs; the two prose blocks are already resolved
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub company_name: &'a str,
    pub assessment_date: NaiveDate,
    pub averages: &'a DimensionAverages,
    pub reference: &'a ReferenceData,
    pub executive_summary: &'a str,
    pub insights: &'a str,
}

/// Strong and weak dimensions, each in average order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyInsights {
    pub strengths: Vec<(Dimension, f64)>,
    pub improvements: Vec<(Dimension, f64)>,
}

pub fn key_insights(averages: &DimensionAverages) -> KeyInsights {
    KeyInsights {
        strengths: averages
            .iter()
            .filter(|(_, score)| *score >= STRENGTH_THRESHOLD)
            .collect(),
        improvements: averages
            .iter()
            .filter(|(_, score)| *score < IMPROVEMENT_THRESHOLD)
            .collect(),
    }
}

/// The lowest-scoring dimensions, ascending; equal scores keep average order
pub fn priority_dimensions(averages: &DimensionAverages) -> Vec<(Dimension, f64)> {
    let mut ranked: Vec<(Dimension, f64)> = averages.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.truncate(PRIORITY_COUNT);
    ranked
}

fn trend_indicator(gap: f64) -> &'static str {
    let gap = crate::round2(gap);
    if gap > 0.0 {
        "📈"
    } else if gap < 0.0 {
        "📉"
    } else {
        "➡️"
    }
}

fn overall_lines(averages: &DimensionAverages) -> [String; 2] {
    match averages.overall() {
        Some(overall) => [
            format!(
                "**Overall Sustainability Maturity Score:** {}/5.0",
                format_score(overall)
            ),
            format!(
                "**Overall Maturity Level:** {}",
                MaturityLevel::from_score(overall).title()
            ),
        ],
        None => [
            "**Overall Sustainability Maturity Score:** N/A".to_string(),
            "**Overall Maturity Level:** N/A".to_string(),
        ],
    }
}

/// Assemble the full markdown report
pub fn assemble_report(ctx: &ReportContext<'_>) -> String {
    let averages = ctx.averages;
    let reference = ctx.reference;
    let mut lines: Vec<String> = Vec::new();

    lines.push("# 🌱 Sustainability Maturity Assessment Report".to_string());
    lines.push(format!("**Company:** {}", ctx.company_name));
    lines.push(format!("**Assessment Date:** {}", long_date(ctx.assessment_date)));
    lines.push(String::new());

    lines.push("## 📊 Executive Summary".to_string());
    lines.push(ctx.executive_summary.to_string());
    lines.push(String::new());

    lines.extend(overall_lines(averages));
    lines.push(String::new());

    lines.push("## 🔍 Company-Specific Sustainability Insights".to_string());
    lines.push(ctx.insights.to_string());
    lines.push(String::new());

    lines.push("## 📈 Dimension Analysis & Recommendations".to_string());
    lines.push(String::new());
    for (dimension, score) in averages.iter() {
        let level = MaturityLevel::from_score(score);
        lines.push(format!("### {}", dimension.name()));
        lines.push(format!("- **Score** - {}/5.0", format_score(score)));
        lines.push(format!("- **Maturity Level** - {}", level.title()));
        lines.push(format!(
            "- **Next Steps** - {}",
            reference.recommendation(dimension, level)
        ));
        lines.push(String::new());
    }

    lines.push("## 🏭 Industry Comparison".to_string());
    lines.push("| Dimension | Your Score | Industry Average | Gap |".to_string());
    lines.push("|-----------|------------|------------------|-----|".to_string());
    let industry = reference.industry_averages();
    for (dimension, score) in averages.iter() {
        let Some(&industry_avg) = industry.get(&dimension) else {
            continue;
        };
        let gap = score - industry_avg;
        lines.push(format!(
            "| {} | {} | {} | {} {} |",
            dimension.name(),
            format_score(score),
            format_score(industry_avg),
            trend_indicator(gap),
            format_gap(gap)
        ));
    }
    lines.push(String::new());

    let insights = key_insights(averages);
    lines.push("## 💡 Key Insights".to_string());
    if !insights.strengths.is_empty() {
        lines.push("### 🚀 Strengths".to_string());
        for (dimension, score) in &insights.strengths {
            lines.push(format!(
                "- **{}:** Performing well with score of {}",
                dimension.name(),
                format_score(*score)
            ));
        }
        lines.push(String::new());
    }
    if !insights.improvements.is_empty() {
        lines.push("### ⚠️ Areas for Improvement".to_string());
        for (dimension, score) in &insights.improvements {
            lines.push(format!(
                "- **{}:** Needs attention with score of {}",
                dimension.name(),
                format_score(*score)
            ));
        }
        lines.push(String::new());
    }

    lines.push("## 🎯 Priority Actions".to_string());
    for (rank, (dimension, score)) in priority_dimensions(averages).into_iter().enumerate() {
        let level = MaturityLevel::from_score(score);
        lines.push(format!("**{}. {}**", rank + 1, dimension.name()));
        lines.push(format!("   {}", reference.recommendation(dimension, level)));
        lines.push(String::new());
    }

    lines.join("\n")
}
