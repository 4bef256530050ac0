use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{CallbackQuery, Session},
        extractors::read_cookie,
        services::{bootstrap_session, BootstrapOutcome},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/callback", get(callback))
}

/// `SITE_URL` if configured, otherwise rebuilt from the request headers.
/// Forwarded headers are only read when `trust_forwarded` is set.
pub(crate) fn request_origin(
    headers: &HeaderMap,
    site_url: Option<&str>,
    trust_forwarded: bool,
) -> String {
    if let Some(site) = site_url {
        return site.to_string();
    }
    let first = |name: &str| {
        headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    let forwarded = |name: &str| if trust_forwarded { first(name) } else { None };
    let proto = forwarded("x-forwarded-proto").unwrap_or("http");
    let host = forwarded("x-forwarded-host")
        .or_else(|| first(header::HOST.as_str()))
        .unwrap_or("localhost");
    format!("{}://{}", proto, host)
}

fn session_cookie(name: &str, session: &Session, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        name, session.access_token
    );
    if let Some(max_age) = session.expires_in.filter(|s| *s > 0) {
        cookie.push_str(&format!("; Max-Age={}", max_age));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn expired_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

fn append_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(v) => {
            response.headers_mut().append(header::SET_COOKIE, v);
        }
        Err(e) => warn!(error = %e, "cookie rejected"),
    }
}

/// GET /auth/callback?code=...
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Option<Query<Vec<(String, String)>>>,
) -> Response {
    let query = query
        .map(|Query(pairs)| CallbackQuery::from_pairs(pairs))
        .unwrap_or_default();
    let verifier = read_cookie(&headers, &state.config.auth.verifier_cookie);
    let result = bootstrap_session(
        state.identity.as_ref(),
        state.profiles.as_ref(),
        query.code.as_deref(),
        verifier.as_deref(),
    )
    .await;

    let origin = request_origin(
        &headers,
        state.config.site_url.as_deref(),
        state.config.trust_forwarded_headers,
    );
    let target = result.outcome.redirect();
    let location = format!("{}{}", origin, target.path());
    info!(outcome = ?result.outcome, %location, "auth callback");

    let mut response = Redirect::temporary(&location).into_response();
    if let Some(session) = &result.session {
        let cookie = session_cookie(
            &state.config.session_cookie,
            session,
            origin.starts_with("https://"),
        );
        append_cookie(&mut response, &cookie);
    }
    // the verifier is single-use once a code has been presented
    if result.outcome != BootstrapOutcome::NoCode && verifier.is_some() {
        append_cookie(
            &mut response,
            &expired_cookie(&state.config.auth.verifier_cookie),
        );
    }
    response
}
