mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
mod services;

use crate::state::AppState;
use axum::Router;

pub use repo::{PgProfileRepo, ProfileRepo};
pub use repo_types::{NewProfile, Profile};

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
