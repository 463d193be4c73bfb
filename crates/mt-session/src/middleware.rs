//! axum middleware that runs the session check on every guarded request

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};

use crate::guard::{check_session, now_epoch_secs, SessionVerdict};
use crate::store::InMemoryCredentialStore;

/// Session guard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cookie_name: default_cookie_name(),
            login_path: default_login_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cookie_name() -> String {
    "jwtToken".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

/// Find a cookie by name across all `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Guard a route: redirect to the login view unless the session cookie holds a usable token.
///
/// Install with `axum::middleware::from_fn_with_state(config, require_session)`.
pub async fn require_session(
    State(config): State<SessionConfig>,
    request: Request,
    next: Next,
) -> Response {
    if !config.enabled {
        return next.run(request).await;
    }

    let mut store = InMemoryCredentialStore::new(cookie_value(request.headers(), &config.cookie_name));
    match check_session(&mut store, now_epoch_secs()) {
        SessionVerdict::Continue => next.run(request).await,
        SessionVerdict::Redirect(reason) => {
            tracing::info!(
                "Redirecting {} to {}: {}",
                request.uri().path(),
                config.login_path,
                reason
            );
            let mut response = Redirect::to(&config.login_path).into_response();
            if store.was_removed() {
                let expire = format!("{}=; Path=/; Max-Age=0", config.cookie_name);
                match HeaderValue::from_str(&expire) {
                    Ok(value) => {
                        response.headers_mut().insert(SET_COOKIE, value);
                    }
                    Err(e) => tracing::warn!("Cannot expire session cookie: {}", e),
                }
            }
            response
        }
    }
}
