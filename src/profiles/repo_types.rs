use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Row of the `profiles` table, one per authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,                   // same id as the identity provider's user
    pub email: Option<String>,
    pub username: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Default profile written on first sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: Option<String>,
    pub username: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
impl NewProfile {
    pub fn into_profile(self) -> Profile {
        Profile {
            id: self.id,
            email: self.email,
            username: self.username,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
