use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the identity provider, e.g. `https://xyz.supabase.co/auth/v1`.
    pub url: String,
    pub anon_key: String,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub timeout_secs: u64,
    pub verifier_cookie: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
    pub session_cookie: String,
    pub site_url: Option<String>,
    /// Honour `X-Forwarded-Proto`/`X-Forwarded-Host` when `site_url` is unset.
    pub trust_forwarded_headers: bool,
    pub metrics_path: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let auth = AuthConfig {
            url: std::env::var("AUTH_URL")?.trim_end_matches('/').to_string(),
            anon_key: std::env::var("AUTH_ANON_KEY")?,
            jwt_secret: std::env::var("AUTH_JWT_SECRET")?,
            jwt_audience: std::env::var("AUTH_JWT_AUDIENCE")
                .unwrap_or_else(|_| "authenticated".into()),
            timeout_secs: std::env::var("AUTH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
            verifier_cookie: std::env::var("AUTH_VERIFIER_COOKIE")
                .unwrap_or_else(|_| "code_verifier".into()),
        };
        Ok(Self {
            database_url,
            auth,
            session_cookie: std::env::var("SESSION_COOKIE")
                .unwrap_or_else(|_| "access_token".into()),
            site_url: std::env::var("SITE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim_end_matches('/').to_string()),
            trust_forwarded_headers: std::env::var("TRUST_FORWARDED_HEADERS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            metrics_path: std::env::var("METRICS_PATH")
                .unwrap_or_else(|_| "/api/metrics".into()),
        })
    }
}
