//! Report display, success page and PDF download

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use smat_common::time::today;
use tracing::{error, info};

use crate::api::auth::CurrentUser;
use crate::services::pdf::pdf_filename;
use crate::templates::{no_report_page, report_page, success_page, RenderTarget};
use crate::{ApiError, ApiResult, AppState};

/// GET /report
pub async fn show_report(State(state): State<AppState>, user: CurrentUser) -> Html<String> {
    match state.results.get(&user.session_id).await {
        Some(stored) => Html(report_page(&stored, &user.profile, RenderTarget::Screen)),
        None => Html(no_report_page(&user.profile.name)),
    }
}

/// GET /success
pub async fn show_success(State(state): State<AppState>, user: CurrentUser) -> Html<String> {
    let stored = state.results.get(&user.session_id).await;
    Html(success_page(&user.profile.name, stored.as_ref()))
}

/// GET /download-pdf
pub async fn download_pdf(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Response> {
    let stored = state
        .results
        .get(&user.session_id)
        .await
        .ok_or_else(|| ApiError::NotFound("No report data available".to_string()))?;

    let html = report_page(&stored, &user.profile, RenderTarget::Print);
    let pdf = state.pdf.render_pdf(&html).await.map_err(|e| {
        error!("PDF rendering failed: {}", e);
        ApiError::Internal("Failed to generate PDF".to_string())
    })?;

    let company = if stored.general_info.company.is_empty() {
        &user.profile.company
    } else {
        &stored.general_info.company
    };
    let filename = pdf_filename(company, today());
    info!(bytes = pdf.len(), file = %filename, "PDF generated");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        pdf,
    )
        .into_response())
}

/// Build report routes
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/report", get(show_report))
        .route("/success", get(show_success))
        .route("/download-pdf", get(download_pdf))
}
