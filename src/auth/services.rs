use time::OffsetDateTime;
use tracing::{debug, error, info, instrument, warn};

use super::{dto::Session, identity::IdentityProvider};
use crate::profiles::{NewProfile, ProfileRepo};

/// Default username: the email's local part.
pub fn derive_username(email: Option<&str>) -> Option<String> {
    email.map(|e| e.split_once('@').map_or(e, |(local, _)| local).to_string())
}

/// Where the callback sends the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Dashboard,
    AuthError,
}

impl RedirectTarget {
    pub fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::AuthError => "/auth/error",
        }
    }
}

/// How a callback request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// No code in the query; nothing was called.
    NoCode,
    /// Exchange returned without a session; no profile work done.
    NoSession,
    ExchangeFailed,
    ProfileExists,
    ProfileCreated,
    /// Session established but the profile lookup failed.
    LookupFailed,
    /// Session established but the default profile could not be written.
    ProfileInsertFailed,
}

impl BootstrapOutcome {
    pub fn redirect(self) -> RedirectTarget {
        match self {
            Self::NoCode | Self::NoSession | Self::ProfileExists | Self::ProfileCreated => {
                RedirectTarget::Dashboard
            }
            Self::ExchangeFailed | Self::LookupFailed | Self::ProfileInsertFailed => {
                RedirectTarget::AuthError
            }
        }
    }

    /// The user holds a session but may have no profile row.
    pub fn is_partial(self) -> bool {
        matches!(self, Self::LookupFailed | Self::ProfileInsertFailed)
    }
}

#[derive(Debug)]
pub struct Bootstrap {
    pub outcome: BootstrapOutcome,
    pub session: Option<Session>,
}

/// Exchanges `code` for a session and makes sure the user has a profile.
///
/// Single pass, no retries. A session obtained here is returned even when
/// the profile step fails; it is never rolled back.
#[instrument(skip_all, fields(has_code = code.is_some()))]
pub async fn bootstrap_session(
    identity: &dyn IdentityProvider,
    profiles: &dyn ProfileRepo,
    code: Option<&str>,
    code_verifier: Option<&str>,
) -> Bootstrap {
    let Some(code) = code.filter(|c| !c.is_empty()) else {
        debug!("callback without code");
        return Bootstrap {
            outcome: BootstrapOutcome::NoCode,
            session: None,
        };
    };

    let session = match identity.exchange_code_for_session(code, code_verifier).await {
        Ok(Some(s)) => s,
        Ok(None) => {
            info!("code exchange returned no session");
            return Bootstrap {
                outcome: BootstrapOutcome::NoSession,
                session: None,
            };
        }
        Err(e) => {
            error!(error = %e, "code exchange failed");
            return Bootstrap {
                outcome: BootstrapOutcome::ExchangeFailed,
                session: None,
            };
        }
    };

    let user_id = session.user.id;
    let outcome = match profiles.find_by_id(user_id).await {
        Ok(Some(_)) => {
            debug!(%user_id, "profile exists");
            BootstrapOutcome::ProfileExists
        }
        Ok(None) => {
            let now = OffsetDateTime::now_utc();
            let email = session.user.email.clone();
            let new = NewProfile {
                id: user_id,
                username: derive_username(email.as_deref()),
                email,
                created_at: now,
                updated_at: now,
            };
            match profiles.insert(&new).await {
                Ok(Some(p)) => {
                    info!(%user_id, username = ?p.username, "profile created");
                    BootstrapOutcome::ProfileCreated
                }
                Ok(None) => {
                    // a concurrent login created it first
                    debug!(%user_id, "profile created concurrently");
                    BootstrapOutcome::ProfileExists
                }
                Err(e) => {
                    error!(error = %e, %user_id, "profile insert failed");
                    BootstrapOutcome::ProfileInsertFailed
                }
            }
        }
        Err(e) => {
            error!(error = %e, %user_id, "profile lookup failed");
            BootstrapOutcome::LookupFailed
        }
    };

    if outcome.is_partial() {
        warn!(%user_id, ?outcome, "session kept without a confirmed profile");
    }

    Bootstrap {
        outcome,
        session: Some(session),
    }
}
