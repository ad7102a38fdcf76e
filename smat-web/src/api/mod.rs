//! HTTP handlers for smat-web

pub mod auth;
pub mod health;
pub mod questionnaire;
pub mod report;

pub use auth::{auth_routes, CurrentUser};
pub use health::health_routes;
pub use questionnaire::questionnaire_routes;
pub use report::report_routes;
