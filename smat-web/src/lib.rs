//! smat-web library interface
//!
//! Exposes the router and application state so integration tests can drive
//! the service without binding a socket.

pub mod api;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod templates;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use smat_common::config::AppConfig;
use smat_common::time;
use smat_scoring::AssessmentPipeline;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::models::StoredReport;
use crate::services::{LangflowClient, PdfRenderer};
use crate::session::{InMemoryTokenStore, TokenStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<AssessmentPipeline>,
    /// Session token → username
    pub sessions: Arc<dyn TokenStore<String>>,
    /// Session token → most recent report
    pub results: Arc<dyn TokenStore<StoredReport>>,
    /// External flow client, present when `[langflow] enabled`
    pub langflow: Option<Arc<LangflowClient>>,
    pub pdf: Arc<dyn PdfRenderer>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// State with in-memory session and result stores
    pub fn new(
        config: AppConfig,
        pipeline: AssessmentPipeline,
        langflow: Option<LangflowClient>,
        pdf: Arc<dyn PdfRenderer>,
    ) -> Self {
        let ttl = config.session.ttl_secs.map(Duration::from_secs);
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            sessions: Arc::new(InMemoryTokenStore::<String>::new(ttl)),
            results: Arc::new(InMemoryTokenStore::<StoredReport>::new(ttl)),
            langflow: langflow.map(Arc::new),
            pdf,
            startup_time: time::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .merge(api::auth_routes())
        .merge(api::questionnaire_routes())
        .merge(api::report_routes())
        .merge(api::health_routes())
        .nest_service("/static", static_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
