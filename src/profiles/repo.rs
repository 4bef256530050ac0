use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewProfile, Profile};

#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Profile>>;
    /// `None` when a row with this id already exists.
    async fn insert(&self, profile: &NewProfile) -> anyhow::Result<Option<Profile>>;
    async fn update_username(
        &self,
        id: Uuid,
        username: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<Profile>>;
}

#[derive(Clone)]
pub struct PgProfileRepo {
    db: PgPool,
}

impl PgProfileRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepo for PgProfileRepo {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, username, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("select profile")?;
        Ok(profile)
    }

    async fn insert(&self, profile: &NewProfile) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, email, username, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, email, username, created_at, updated_at
            "#,
        )
        .bind(profile.id)
        .bind(profile.email.as_deref())
        .bind(profile.username.as_deref())
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_optional(&self.db)
        .await
        .context("insert profile")?;
        Ok(row)
    }

    async fn update_username(
        &self,
        id: Uuid,
        username: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
               SET username = $2, updated_at = $3
             WHERE id = $1
            RETURNING id, email, username, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .context("update profile username")?;
        Ok(row)
    }
}
