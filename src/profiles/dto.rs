use serde::Deserialize;

/// Body of `PATCH /api/profile`.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
}
