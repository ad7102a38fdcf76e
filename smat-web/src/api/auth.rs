//! Login, logout and the session guard
//!
//! A successful login stores `token → username` in the session store and
//! hands the token to the browser in the `session_id` cookie. Protected
//! handlers take a [`CurrentUser`], which redirects to `/login` when the
//! cookie is missing, unknown or names a user that no longer exists.

use axum::{
    extract::{FromRequestParts, Query, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use smat_common::config::UserProfile;
use tracing::{debug, info, warn};

use crate::session::new_token;
use crate::templates::login_page;
use crate::AppState;

pub const SESSION_COOKIE: &str = "session_id";

const LOGIN_FAILED_LOCATION: &str = "/login?error=Invalid%20username%20or%20password";

/// 302 Found to `location`
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Find the session token in the request's Cookie headers
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; HttpOnly; Max-Age={}; Path=/; SameSite=Lax",
        SESSION_COOKIE, token, max_age_secs
    )
}

fn expired_session_cookie() -> String {
    format!("{}=; HttpOnly; Max-Age=0; Path=/; SameSite=Lax", SESSION_COOKIE)
}

/// Logged-in user resolved from the session cookie
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session_id: String,
    pub profile: UserProfile,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Err(redirect("/login"));
        };
        let Some(username) = state.sessions.get(&token).await else {
            debug!("Unknown or expired session");
            return Err(redirect("/login"));
        };
        match state.config.find_user(&username) {
            Some(profile) => Ok(CurrentUser {
                session_id: token,
                profile: profile.clone(),
            }),
            None => {
                warn!(user = %username, "Session refers to an unconfigured user");
                Err(redirect("/login"))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// GET /
pub async fn root() -> Response {
    redirect("/login")
}

/// GET /login
pub async fn login_form(Query(query): Query<LoginQuery>) -> Html<String> {
    Html(login_page(query.error.as_deref()))
}

/// POST /login
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let authenticated = state
        .config
        .find_user(&form.username)
        .is_some_and(|user| user.password == form.password);

    if !authenticated {
        info!(user = %form.username, "Login failed");
        return redirect(LOGIN_FAILED_LOCATION);
    }

    let token = new_token();
    state.sessions.set(&token, form.username.clone()).await;
    info!(user = %form.username, "Login succeeded");

    let mut response = redirect("/questionnaire");
    match HeaderValue::from_str(&session_cookie(&token, state.config.session.cookie_max_age_secs)) {
        Ok(cookie) => {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
        Err(e) => warn!("Session cookie rejected: {}", e),
    }
    response
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if let Some(username) = state.sessions.delete(&token).await {
            info!(user = %username, "Logged out");
        }
        state.results.delete(&token).await;
    }

    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/login".to_string()),
            (header::SET_COOKIE, expired_session_cookie()),
        ],
    )
        .into_response()
}

/// Build login/logout routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
}
