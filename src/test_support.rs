//! In-memory collaborators for unit and router tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::{
        claims::Claims,
        dto::{Session, SessionUser},
        identity::IdentityProvider,
    },
    profiles::{NewProfile, Profile, ProfileRepo},
};

pub fn session_for(id: Uuid, email: Option<&str>) -> Session {
    Session {
        access_token: format!("token-{}", id),
        refresh_token: Some("refresh".into()),
        expires_in: Some(3600),
        user: SessionUser {
            id,
            email: email.map(str::to_string),
        },
    }
}

pub const TEST_JWT_SECRET: &str = "test-secret";

/// Access token that `AppState::fake` accepts for `user_id`.
pub fn access_token(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id,
        exp: (OffsetDateTime::now_utc().unix_timestamp() + 600) as usize,
        aud: "authenticated".into(),
        email: None,
        role: Some("authenticated".into()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub enum Exchange {
    Session(Session),
    NoSession,
    Fail,
}

pub struct FakeIdentity {
    exchange: Exchange,
    calls: AtomicUsize,
    last_code: Mutex<Option<String>>,
    last_verifier: Mutex<Option<String>>,
}

impl FakeIdentity {
    pub fn new(exchange: Exchange) -> Self {
        Self {
            exchange,
            calls: AtomicUsize::new(0),
            last_code: Mutex::new(None),
            last_verifier: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_code(&self) -> Option<String> {
        self.last_code.lock().unwrap().clone()
    }

    pub fn last_verifier(&self) -> Option<String> {
        self.last_verifier.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> anyhow::Result<Option<Session>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_code.lock().unwrap() = Some(code.to_string());
        *self.last_verifier.lock().unwrap() = code_verifier.map(str::to_string);
        match &self.exchange {
            Exchange::Session(s) => Ok(Some(s.clone())),
            Exchange::NoSession => Ok(None),
            Exchange::Fail => anyhow::bail!("invalid grant"),
        }
    }
}

#[derive(Default)]
pub struct InMemoryProfiles {
    rows: Mutex<HashMap<Uuid, Profile>>,
    fail_inserts: bool,
    fail_lookups: bool,
    stale_lookups: bool,
    lookups: AtomicUsize,
    inserts: Mutex<Vec<NewProfile>>,
}

impl InMemoryProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_inserts() -> Self {
        Self {
            fail_inserts: true,
            ..Self::default()
        }
    }

    pub fn failing_lookups() -> Self {
        Self {
            fail_lookups: true,
            ..Self::default()
        }
    }

    /// Lookups miss while `profile` is already stored, as when another
    /// request inserts between our lookup and insert.
    pub fn racing(profile: Profile) -> Self {
        Self {
            stale_lookups: true,
            ..Self::default()
        }
        .with_profile(profile)
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        self.rows.lock().unwrap().insert(profile.id, profile);
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> Vec<NewProfile> {
        self.inserts.lock().unwrap().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Profile> {
        self.rows.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ProfileRepo for InMemoryProfiles {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups {
            anyhow::bail!("connection reset");
        }
        if self.stale_lookups {
            return Ok(None);
        }
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, profile: &NewProfile) -> anyhow::Result<Option<Profile>> {
        self.inserts.lock().unwrap().push(profile.clone());
        if self.fail_inserts {
            anyhow::bail!("permission denied for table profiles");
        }
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&profile.id) {
            return Ok(None);
        }
        let row = profile.clone().into_profile();
        rows.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn update_username(
        &self,
        id: Uuid,
        username: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<Profile>> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.get_mut(&id).map(|p| {
            p.username = Some(username.to_string());
            p.updated_at = now;
            p.clone()
        }))
    }
}
