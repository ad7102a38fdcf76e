//! Questionnaire page and submission

use axum::{
    extract::State,
    response::{Html, Response},
    routing::{get, post},
    Form, Router,
};
use chrono::Local;
use smat_common::time::today;
use smat_scoring::{Answers, ReferenceData, ReportResult, Submission};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::api::auth::{redirect, CurrentUser};
use crate::models::{GeneralInformation, StoredReport};
use crate::services::langflow::{format_questionnaire, TranscriptHeader};
use crate::templates::questionnaire_page;
use crate::{ApiError, ApiResult, AppState};

/// GET /questionnaire
pub async fn show_questionnaire(State(state): State<AppState>, user: CurrentUser) -> Html<String> {
    let debug = &state.config.debug;
    let preselect = debug.enabled.then_some(debug.default_score);
    Html(questionnaire_page(
        &user.profile,
        state.pipeline.reference(),
        preselect,
    ))
}

/// Collect answered questions from the form
///
/// Only known question ids are read; each value must be a level from 1 to 5.
pub fn parse_answers(
    reference: &ReferenceData,
    form: &HashMap<String, String>,
) -> Result<Answers, ApiError> {
    let mut answers = Answers::new();
    for question in reference.questions() {
        let Some(raw) = form.get(&question.id) else {
            continue;
        };
        let level = raw
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|l| (1..=5).contains(l))
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "Invalid response for {}: expected a level from 1 to 5, got '{}'",
                    question.id, raw
                ))
            })?;
        answers.insert(question.id.clone(), level);
    }
    Ok(answers)
}

/// POST /submit-questionnaire
pub async fn submit_questionnaire(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<HashMap<String, String>>,
) -> ApiResult<Response> {
    let general_info = GeneralInformation::from_form(&form);
    let missing = general_info.missing_required();
    if !missing.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let reference = state.pipeline.reference();
    let answers = parse_answers(reference, &form)?;
    if answers.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one question must be answered".to_string(),
        ));
    }

    let submission = Submission {
        company_name: general_info.company.clone(),
        industry: general_info.industry_or(&user.profile).map(str::to_string),
        answers,
    };
    info!(
        user = %user.profile.username,
        company = %submission.company_name,
        answered = submission.answers.len(),
        total = reference.questions().len(),
        "Questionnaire submitted"
    );

    let result = generate_report(&state, &user, &general_info, &submission).await?;

    state
        .results
        .set(
            &user.session_id,
            StoredReport {
                result,
                general_info,
                generated_at: Local::now(),
            },
        )
        .await;

    Ok(redirect("/report"))
}

/// Run the external flow when configured, falling back to the local pipeline
async fn generate_report(
    state: &AppState,
    user: &CurrentUser,
    general_info: &GeneralInformation,
    submission: &Submission,
) -> ApiResult<ReportResult> {
    if let Some(flow) = &state.langflow {
        let header = TranscriptHeader {
            company: submission.company_name.clone(),
            industry: submission.industry.clone().unwrap_or_default(),
            revenue: user.profile.revenue.clone(),
            location: if general_info.headquarters.is_empty() {
                user.profile.location.clone()
            } else {
                general_info.headquarters.clone()
            },
        };
        let transcript = format_questionnaire(
            &header,
            state.pipeline.reference(),
            &submission.answers,
            Local::now().naive_local(),
        );

        match flow.run(&transcript).await {
            Ok(markdown) if !markdown.trim().is_empty() => {
                return Ok(state.pipeline.process_external(submission, markdown).await?);
            }
            Ok(_) => warn!("Flow returned an empty report, using local analysis"),
            Err(e) => warn!("Flow analysis failed, using local analysis: {}", e),
        }
    }

    Ok(state.pipeline.process(submission, today()).await?)
}

/// Build questionnaire routes
pub fn questionnaire_routes() -> Router<AppState> {
    Router::new()
        .route("/questionnaire", get(show_questionnaire))
        .route("/submit-questionnaire", post(submit_questionnaire))
}
