//! BDD step definitions for the session guard

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::LOCATION;
use axum::http::Request;
use cucumber::{given, then, when};
use microtrack_dashboard::config::{ApiConfig, DisplayConfig};
use microtrack_dashboard::dashboard::build_router;
use microtrack_dashboard::io::{HttpClient, HttpResponse};
use microtrack_dashboard::loader::DataLoader;
use microtrack_dashboard::state::new_state_handle;
use mt_session::{
    check_session, CredentialStore, InMemoryCredentialStore, RedirectReason, SessionConfig,
    SessionVerdict,
};
use tower::ServiceExt;

use crate::world::DashboardWorld;

/// Payload `{"exp":4102444800}`
const FAR_FUTURE_TOKEN: &str = "h.eyJleHAiOjQxMDI0NDQ4MDB9.s";
const FAR_FUTURE_EXP: f64 = 4_102_444_800.0;

/// Serves an empty observation list
struct EmptyApi;

#[async_trait::async_trait]
impl HttpClient for EmptyApi {
    async fn get(&self, _url: &str) -> microtrack_dashboard::Result<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            body: "[]".to_string(),
        })
    }
}

fn parse_reason(reason: &str) -> RedirectReason {
    match reason {
        "missing" => RedirectReason::Missing,
        "malformed" => RedirectReason::Malformed,
        "expired" => RedirectReason::Expired,
        other => panic!("Unknown redirect reason: {}", other),
    }
}

#[given(expr = "a stored token {string}")]
fn stored_token(world: &mut DashboardWorld, token: String) {
    world.store = Some(InMemoryCredentialStore::with_token(token));
}

#[given("a stored token that expires in the far future")]
fn far_future_token(world: &mut DashboardWorld) {
    world.store = Some(InMemoryCredentialStore::with_token(FAR_FUTURE_TOKEN));
}

#[given("no stored token")]
fn no_stored_token(world: &mut DashboardWorld) {
    world.store = Some(InMemoryCredentialStore::default());
}

#[when("the session is checked now")]
fn session_checked_now(world: &mut DashboardWorld) {
    let store = world.store.as_mut().expect("store not set");
    world.verdict = Some(check_session(store, mt_session::now_epoch_secs()));
}

#[when("the session is checked one hour before expiry")]
fn session_checked_before_expiry(world: &mut DashboardWorld) {
    let store = world.store.as_mut().expect("store not set");
    world.verdict = Some(check_session(store, FAR_FUTURE_EXP - 3600.0));
}

#[when("the session is checked one second after expiry")]
fn session_checked_after_expiry(world: &mut DashboardWorld) {
    let store = world.store.as_mut().expect("store not set");
    world.verdict = Some(check_session(store, FAR_FUTURE_EXP + 1.0));
}

#[then("the session continues")]
fn session_continues(world: &mut DashboardWorld) {
    assert_eq!(world.verdict, Some(SessionVerdict::Continue));
}

#[then(expr = "the visitor is redirected because the token is {string}")]
fn visitor_redirected(world: &mut DashboardWorld, reason: String) {
    assert_eq!(
        world.verdict,
        Some(SessionVerdict::Redirect(parse_reason(&reason)))
    );
}

#[then("the stored token was removed")]
fn token_removed(world: &mut DashboardWorld) {
    let store = world.store.as_ref().expect("store not set");
    assert!(store.was_removed());
    assert_eq!(store.token(), None);
}

#[then("the stored token is kept")]
fn token_kept(world: &mut DashboardWorld) {
    let store = world.store.as_ref().expect("store not set");
    assert!(!store.was_removed());
}

async fn request_dashboard(world: &mut DashboardWorld, cookie: Option<String>) {
    let loader = Arc::new(DataLoader::new(
        &ApiConfig::default(),
        &DisplayConfig::default(),
        Arc::new(EmptyApi),
    ));
    let rows = loader.load().await;
    let app = build_router(new_state_handle(rows), loader, SessionConfig::default());

    let mut request = Request::builder().uri("/");
    if let Some(cookie) = cookie {
        request = request.header("cookie", cookie);
    }
    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    world.response_status = Some(response.status().as_u16());
    world.response_location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
}

#[when("the dashboard page is requested without a cookie")]
async fn dashboard_requested_without_cookie(world: &mut DashboardWorld) {
    request_dashboard(world, None).await;
}

#[when(expr = "the dashboard page is requested with cookie {string}")]
async fn dashboard_requested_with_cookie(world: &mut DashboardWorld, cookie: String) {
    request_dashboard(world, Some(cookie)).await;
}

#[when("the dashboard page is requested with a far-future session cookie")]
async fn dashboard_requested_with_valid_cookie(world: &mut DashboardWorld) {
    request_dashboard(world, Some(format!("jwtToken={}", FAR_FUTURE_TOKEN))).await;
}

#[then(expr = "the response redirects to {string}")]
fn response_redirects(world: &mut DashboardWorld, location: String) {
    assert_eq!(world.response_status, Some(303));
    assert_eq!(world.response_location.as_deref(), Some(location.as_str()));
}

#[then(expr = "the response status is {int}")]
fn response_status(world: &mut DashboardWorld, status: u16) {
    assert_eq!(world.response_status, Some(status));
}
