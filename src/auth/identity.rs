use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dto::{Session, SessionUser};
use crate::config::AuthConfig;

/// Hosted identity backend that turns an authorization code into a session.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means the provider accepted the call but returned no session.
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> anyhow::Result<Option<Session>>;
}

/// GoTrue-compatible HTTP client (`POST {url}/token?grant_type=pkce`).
#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
    pub fn new(cfg: &AuthConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build identity http client")?;
        Ok(Self {
            http,
            base_url: cfg.url.clone(),
            anon_key: cfg.anon_key.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct PkceGrant<'a> {
    auth_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code_verifier: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<SessionUser>,
}

impl TokenResponse {
    fn into_session(self) -> Option<Session> {
        match (self.access_token, self.user) {
            (Some(access_token), Some(user)) if !access_token.is_empty() => Some(Session {
                access_token,
                refresh_token: self.refresh_token,
                expires_in: self.expires_in,
                user,
            }),
            _ => None,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> anyhow::Result<Option<Session>> {
        let url = format!("{}/token?grant_type=pkce", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&PkceGrant {
                auth_code: code,
                code_verifier,
            })
            .send()
            .await
            .context("identity token request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("identity token exchange failed: {} {}", status, body);
        }

        let body: TokenResponse = resp
            .json()
            .await
            .context("decode identity token response")?;
        let session = body.into_session();
        debug!(has_session = session.is_some(), "code exchanged");
        Ok(session)
    }
}
