//! HTML pages
//!
//! Pages are built with `format!` over raw string literals. Every value that
//! came from a user, a config file or an LLM goes through [`escape_html`].
//! Report markdown goes through [`render_markdown`], which escapes any raw
//! HTML it contains.

use crate::models::StoredReport;
use crate::services::markdown::{escape_html, render_markdown};
use smat_common::config::UserProfile;
use smat_common::time::long_timestamp;
use smat_scoring::{format_score, Dimension, ReferenceData, SpiderChartScores};
use std::fmt::Write as _;

/// Where a report page will be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// Browser page with navigation
    Screen,
    /// Self-contained A4 document for PDF printing
    Print,
}

/// Spider table rows: two dimensions per row
const SPIDER_TABLE_LABELS: [(Dimension, &str); 10] = [
    (Dimension::SustainabilityLeadership, "📈 Sustainability Leadership"),
    (Dimension::Organization, "🏢 Organization Structure"),
    (Dimension::SustainabilityRiskManagement, "⚠️ Risk Management"),
    (Dimension::DataSystems, "💾 Data Systems"),
    (Dimension::PeopleCompetency, "👥 People & Competency"),
    (Dimension::DirectAssetManagement, "🏭 Asset Management"),
    (Dimension::ProductManagement, "📦 Product Management"),
    (Dimension::VendorManagement, "🤝 Vendor Management"),
    (Dimension::MetricsReporting, "📊 Metrics & Reporting"),
    (Dimension::ManagingChange, "🔄 Managing Change"),
];

const PRINT_CSS: &str = r#"
@page { size: A4; margin: 2cm; }
body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; }
.header { text-align: center; margin-bottom: 30px; padding-bottom: 20px; border-bottom: 2px solid #4CAF50; }
.header h1 { color: #4CAF50; font-size: 24pt; margin: 0; border: none; }
.header .company-info { margin-top: 10px; font-size: 12pt; color: #666; }
h1 { color: #4CAF50; font-size: 18pt; margin: 20px 0 10px 0; border-bottom: 2px solid #4CAF50; padding-bottom: 5px; }
h2 { color: #4CAF50; font-size: 16pt; margin: 15px 0 8px 0; border-bottom: 1px solid #4CAF50; padding-bottom: 3px; }
h3 { color: #4CAF50; font-size: 14pt; margin: 12px 0 6px 0; }
p { margin: 8px 0; text-align: justify; }
ul, ol { margin: 8px 0; padding-left: 20px; }
li { margin: 4px 0; }
table { width: 100%; border-collapse: collapse; margin: 10px 0; font-size: 10pt; }
th, td { padding: 8px; border: 1px solid #ddd; text-align: left; }
th { background-color: #4CAF50; color: white; font-weight: bold; }
blockquote { border-left: 4px solid #4CAF50; margin: 10px 0; padding: 10px 15px; background-color: #f9f9f9; font-style: italic; }
code, pre { background-color: #f5f5f5; font-family: 'Courier New', monospace; font-size: 9pt; }
pre { padding: 10px; border-radius: 5px; line-height: 1.4; }
.spider-chart-section { text-align: center; margin-bottom: 30px; page-break-inside: avoid; }
.spider-chart-section img { max-width: 100%; height: auto; margin-bottom: 15px; }
.page-break { page-break-before: always; }
"#;

fn screen_page(title: &str, user_name: Option<&str>, body: &str) -> String {
    let nav = match user_name {
        Some(name) => format!(
            r#"<nav class="topbar"><span>Welcome, {}</span> <a href="/questionnaire">Questionnaire</a> <a href="/logout">Logout</a></nav>"#,
            escape_html(name)
        ),
        None => String::new(),
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/smat.css">
</head>
<body>
{nav}
<main class="container">
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// GET /login
pub fn login_page(error: Option<&str>) -> String {
    let error_html = error
        .filter(|e| !e.is_empty())
        .map(|e| format!(r#"<div class="error">{}</div>"#, escape_html(e)))
        .unwrap_or_default();
    let body = format!(
        r#"<section class="card login">
    <h1>🌱 Sustainability Maturity Assessment</h1>
    <p class="subtitle">Sign in to start your assessment</p>
    {error_html}
    <form method="post" action="/login">
        <label for="username">Username</label>
        <input type="text" id="username" name="username" required autofocus>
        <label for="password">Password</label>
        <input type="password" id="password" name="password" required>
        <button type="submit">Login</button>
    </form>
</section>"#
    );
    screen_page("Login - Sustainability Assessment", None, &body)
}

fn text_input(name: &str, label: &str, value: &str, required: bool, kind: &str) -> String {
    format!(
        r#"<label for="{name}">{label}{star}</label>
<input type="{kind}" id="{name}" name="{name}" value="{value}"{req}>
"#,
        star = if required { " *" } else { "" },
        value = escape_html(value),
        req = if required { " required" } else { "" },
    )
}

/// GET /questionnaire
///
/// `preselect` checks that level on every question (debug mode).
pub fn questionnaire_page(
    user: &UserProfile,
    reference: &ReferenceData,
    preselect: Option<u8>,
) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        r#"<h1>🌱 Sustainability Maturity Questionnaire</h1>
<p class="subtitle">{} questions across {} dimensions</p>
<form method="post" action="/submit-questionnaire">
<section class="card">
<h2>General Information</h2>
"#,
        reference.questions().len(),
        reference.questions_by_dimension().len(),
    );
    body.push_str(&text_input("company", "Company", &user.company, true, "text"));
    body.push_str(&text_input("name", "Your Name", &user.name, true, "text"));
    body.push_str(&text_input("email", "Email", "", true, "email"));
    body.push_str(&text_input("industry", "Industry", &user.industry, true, "text"));
    body.push_str(&text_input("employees", "Number of Employees", "", true, "text"));
    body.push_str(&text_input("headquarters", "Headquarters", &user.location, true, "text"));
    body.push_str(&text_input("products", "Main Products", "", false, "text"));
    body.push_str(&text_input(
        "manufacturing_location",
        "Manufacturing Locations",
        "",
        false,
        "text",
    ));
    body.push_str(
        r#"<label for="profile">Company Profile</label>
<textarea id="profile" name="profile" rows="3"></textarea>
</section>
"#,
    );

    for (dimension, questions) in reference.questions_by_dimension() {
        let _ = writeln!(
            body,
            r#"<section class="card"><h2>{}</h2>"#,
            escape_html(dimension.name())
        );
        for question in questions {
            let id = escape_html(&question.id);
            let _ = write!(
                body,
                r#"<fieldset class="question"><legend><strong>{id}</strong> <span class="element">{}</span><br>{}</legend>"#,
                escape_html(&question.element),
                escape_html(&question.text),
            );
            for (level, label) in reference.responses().iter() {
                let checked = if preselect == Some(level) { " checked" } else { "" };
                let _ = write!(
                    body,
                    r#"<label class="option"><input type="radio" name="{id}" value="{level}"{checked}> {level}. {}</label>"#,
                    escape_html(label),
                );
            }
            body.push_str("</fieldset>\n");
        }
        body.push_str("</section>\n");
    }

    body.push_str(r#"<button type="submit">Submit Assessment</button></form>"#);
    screen_page("Sustainability Questionnaire", Some(&user.name), &body)
}

/// GET /success
pub fn success_page(user_name: &str, report: Option<&StoredReport>) -> String {
    let body = match report {
        Some(stored) => {
            let overall = stored
                .result
                .overall_score
                .map(format_score)
                .unwrap_or_else(|| "N/A".to_string());
            format!(
                r#"<section class="card">
    <h1>✅ Assessment Submitted</h1>
    <p>Thank you. The report for <strong>{}</strong> is ready.</p>
    <p>Overall score: <strong>{}/5.0</strong></p>
    <p><a class="button" href="/report">View Report</a> <a class="button" href="/download-pdf">Download PDF</a></p>
</section>"#,
                escape_html(&stored.general_info.company),
                overall,
            )
        }
        None => r#"<section class="card">
    <h1>Assessment Submitted</h1>
    <p>No report is available for this session yet.</p>
    <p><a class="button" href="/questionnaire">Back to Questionnaire</a></p>
</section>"#
            .to_string(),
    };
    screen_page("Assessment Submitted", Some(user_name), &body)
}

/// GET /report without a stored report
pub fn no_report_page(user_name: &str) -> String {
    let body = r#"<section class="card">
    <h1>No Report Available</h1>
    <p>No report is available for this session. Complete the questionnaire to generate one.</p>
    <p><a class="button" href="/questionnaire">Go to Questionnaire</a></p>
</section>"#;
    screen_page("Sustainability Report", Some(user_name), body)
}

fn spider_table(scores: &SpiderChartScores) -> String {
    let mut rows = String::new();
    for pair in SPIDER_TABLE_LABELS.chunks(2) {
        rows.push_str("<tr>");
        for (dimension, label) in pair {
            let _ = write!(
                rows,
                "<td>{}</td><td><strong>{}</strong></td>",
                escape_html(label),
                scores.get(*dimension)
            );
        }
        rows.push_str("</tr>\n");
    }
    format!(
        r#"<div class="spider-chart-scores">
<h3>Dimension Scores (1-5 Scale)</h3>
<table>
{rows}</table>
</div>"#
    )
}

fn general_info_block(stored: &StoredReport) -> String {
    let info = &stored.general_info;
    let fields = [
        ("Company", &info.company),
        ("Contact", &info.name),
        ("Email", &info.email),
        ("Industry", &info.industry),
        ("Employees", &info.employees),
        ("Headquarters", &info.headquarters),
        ("Products", &info.products),
        ("Manufacturing Locations", &info.manufacturing_location),
        ("Profile", &info.profile),
    ];
    let mut rows = String::new();
    for (label, value) in fields.iter().filter(|(_, v)| !v.is_empty()) {
        let _ = writeln!(
            rows,
            "<tr><th>{}</th><td>{}</td></tr>",
            label,
            escape_html(value)
        );
    }
    format!(
        r#"<section class="card general-info"><h2>General Information</h2><table>
{rows}</table></section>"#
    )
}

/// Report page, for the browser or for PDF printing
pub fn report_page(stored: &StoredReport, user: &UserProfile, target: RenderTarget) -> String {
    let result = &stored.result;
    let company = if stored.general_info.company.is_empty() {
        user.company.as_str()
    } else {
        stored.general_info.company.as_str()
    };
    let industry = if stored.general_info.industry.is_empty() {
        user.industry.as_str()
    } else {
        stored.general_info.industry.as_str()
    };

    let chart = if result.spider_chart_base64.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="spider-chart-section">
<h2>📊 Sustainability Maturity Assessment Radar</h2>
<img src="data:image/png;base64,{}" alt="Sustainability Spider Chart">
{}
</div>"#,
            result.spider_chart_base64,
            spider_table(&result.spider_scores)
        )
    };
    let report_html = render_markdown(&result.markdown);
    let generated = long_timestamp(stored.generated_at);

    match target {
        RenderTarget::Screen => {
            let body = format!(
                r#"<header class="report-header">
    <h1>🌱 Sustainability Maturity Assessment Report</h1>
    <p class="company-info"><strong>{company}</strong> | {industry} | Generated on {generated}</p>
    <p><a class="button" href="/download-pdf">📄 Download PDF</a></p>
</header>
{general}
<section class="card">
{chart}
</section>
<article class="card report-content">
{report_html}
</article>"#,
                company = escape_html(company),
                industry = escape_html(industry),
                general = general_info_block(stored),
            );
            screen_page("Sustainability Report", Some(&user.name), &body)
        }
        RenderTarget::Print => {
            let chart = if chart.is_empty() {
                chart
            } else {
                format!(r#"{chart}<div class="page-break"></div>"#)
            };
            format!(
                r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>Sustainability Report - {company}</title>
<style>{PRINT_CSS}</style>
</head>
<body>
<div class="header">
    <h1>🌱 Sustainability Maturity Assessment Report</h1>
    <div class="company-info">
        <strong>{company}</strong><br>
        {industry} | {location}<br>
        Revenue: {revenue}<br>
        Generated on: {generated}
    </div>
</div>
<div class="content">
{chart}
{report_html}
</div>
</body>
</html>
"#,
                company = escape_html(company),
                industry = escape_html(industry),
                location = escape_html(&user.location),
                revenue = escape_html(&user.revenue),
            )
        }
    }
}
